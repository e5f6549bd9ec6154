//! Statement parse driver.
//!
//! Reads the whole input, tokenizes it with the first row as headers,
//! detects columns once, then normalizes every data row in file order.
//! Nothing here returns `Err`: read failures, tokenizer failures and bad
//! rows all end up in [`CsvParseResult::errors`].

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::columns::{ColumnDetector, KeywordDetector};
use crate::decode::decode_statement;
use crate::error::IngestError;
use crate::rows::{ParseOptions, normalize_row};
use crate::types::{ColumnMap, CsvParseResult, RawRow};

/// How many leading lines `Delimiter::Auto` samples.
const SNIFF_LINES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
    /// Pick the most frequent and consistent candidate from the first lines.
    Auto,
}

impl Delimiter {
    pub fn resolve(self, sample: &str) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
            Delimiter::Auto => detect_delimiter(sample),
        }
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comma" | "," => Ok(Delimiter::Comma),
            "semicolon" | ";" => Ok(Delimiter::Semicolon),
            "tab" | "\\t" => Ok(Delimiter::Tab),
            "pipe" | "|" => Ok(Delimiter::Pipe),
            "auto" => Ok(Delimiter::Auto),
            other => Err(format!(
                "unknown delimiter `{other}` (expected comma, semicolon, tab, pipe or auto)"
            )),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Tab => "tab",
            Delimiter::Pipe => "pipe",
            Delimiter::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Score each candidate by average count per line over its spread; comma
/// wins ties and empty samples.
pub fn detect_delimiter(sample: &str) -> u8 {
    let lines: Vec<&str> = sample
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best = (b',', 0.0f32);
    for candidate in [b',', b';', b'\t', b'|'] {
        let counts: Vec<f32> = lines
            .iter()
            .map(|l| l.bytes().filter(|&b| b == candidate).count() as f32)
            .collect();
        let avg = counts.iter().sum::<f32>() / counts.len() as f32;
        let variance = counts.iter().map(|c| (c - avg).powi(2)).sum::<f32>() / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());
        if score > best.1 {
            best = (candidate, score);
        }
    }
    best.0
}

/// Header row and column map of a statement, without normalizing rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementLayout {
    pub delimiter: char,
    pub headers: Vec<String>,
    pub columns: ColumnMap,
}

#[derive(Debug, Clone, Default)]
pub struct CsvParser<D = KeywordDetector> {
    delimiter: Delimiter,
    detector: D,
    options: ParseOptions,
    /// A non-blank row whose width differs from the header is a tokenizer
    /// error instead of being padded/kept.
    strict: bool,
}

impl CsvParser<KeywordDetector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: ColumnDetector> CsvParser<D> {
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Swap the column detection strategy.
    pub fn with_detector<E: ColumnDetector>(self, detector: E) -> CsvParser<E> {
        CsvParser {
            delimiter: self.delimiter,
            detector,
            options: self.options,
            strict: self.strict,
        }
    }

    pub fn parse_path(&self, path: &Path) -> CsvParseResult {
        match File::open(path) {
            Ok(file) => self.parse_reader(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open statement");
                CsvParseResult::failed(IngestError::from(e).to_string())
            }
        }
    }

    pub fn parse_reader<R: Read>(&self, mut reader: R) -> CsvParseResult {
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            warn!(error = %e, "could not read statement");
            return CsvParseResult::failed(IngestError::from(e).to_string());
        }
        self.parse_bytes(&bytes)
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> CsvParseResult {
        let decoded = decode_statement(bytes);
        debug!(encoding = decoded.encoding.name(), bytes = bytes.len(), "decoded statement");
        self.parse_str(&decoded.text)
    }

    pub fn parse_str(&self, content: &str) -> CsvParseResult {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = self.delimiter.resolve(content);
        let mut rdr = reader_for(content, delimiter);

        let headers = match rdr.headers() {
            Ok(h) => h.iter().map(str::to_string).collect::<Vec<_>>(),
            Err(e) => {
                let err = IngestError::from(e);
                warn!(error = %err, "header row unreadable");
                return CsvParseResult::failed(err.to_string());
            }
        };
        let cols = self.detector.detect(&headers);
        debug!(?cols, headers = headers.len(), "columns detected");
        if cols.date.is_none() {
            warn!("no date column detected; every row will be rejected");
        }

        let mut result = CsvParseResult::default();
        let mut ordinal = 0usize;
        for record in rdr.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    let err = IngestError::from(e);
                    warn!(error = %err, parsed = result.transactions.len(), "tokenizer stopped");
                    result.errors.push(err.to_string());
                    break;
                }
            };

            let row = RawRow::new(ordinal, pair_cells(&headers, &record));
            if row.is_blank() {
                continue;
            }
            if self.strict && record.len() != headers.len() {
                let err = IngestError::Tokenize(format!(
                    "line {}: found record with {} fields, but the header has {}",
                    record.position().map_or(0, |p| p.line()),
                    record.len(),
                    headers.len()
                ));
                warn!(error = %err, parsed = result.transactions.len(), "tokenizer stopped");
                result.errors.push(err.to_string());
                break;
            }
            ordinal += 1;
            result.rows_read += 1;

            match normalize_row(&row, &cols, &self.options) {
                Ok(txn) => result.transactions.push(txn),
                Err(err) => {
                    debug!(line = row.line_number(), "row rejected: {err}");
                    result.errors.push(err.to_string());
                }
            }
        }

        result.row_count = result.transactions.len();
        info!(
            rows = result.rows_read,
            transactions = result.row_count,
            errors = result.errors.len(),
            "statement parsed"
        );
        result
    }

    /// Tokenize only the header row and run column detection.
    pub fn layout(&self, content: &str) -> Result<StatementLayout, IngestError> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = self.delimiter.resolve(content);
        let mut rdr = reader_for(content, delimiter);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        Ok(StatementLayout {
            delimiter: delimiter as char,
            columns: self.detector.detect(&headers),
            headers,
        })
    }
}

/// Parse statement text with the default detector and options.
pub fn parse_csv(content: &str) -> CsvParseResult {
    CsvParser::new().parse_str(content)
}

/// Always flexible: blank lines of any width must reach the blank-row skip
/// before row width is checked.
fn reader_for(content: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes())
}

/// Zip a record with the header row. Cells past the last header are kept
/// under positional names so the audit copy loses nothing.
fn pair_cells(headers: &[String], record: &csv::StringRecord) -> Vec<(String, String)> {
    record
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let header = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{}", i + 1));
            (header, value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::HeaderOverrides;
    use crate::types::Field;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
Date,Description,Paid In,Paid Out
01/02/2024,Tesco,,15.00
bad-date,Unknown,,5.00
03/02/2024,Salary,1000.00,
";

    #[test]
    fn test_end_to_end_sample() {
        let result = parse_csv(SAMPLE);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows_read, 3);
        assert_eq!(result.rows_rejected(), 1);
        assert_eq!(result.errors, vec!["Row 3: Invalid or missing date".to_string()]);

        let t = &result.transactions;
        assert_eq!(t[0].amount, -15.0);
        assert_eq!(t[0].description, "Tesco");
        assert_eq!(t[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(t[1].amount, 1000.0);
        assert_eq!(t[1].description, "Salary");
    }

    #[test]
    fn test_reparse_is_identical() {
        assert_eq!(parse_csv(SAMPLE).transactions, parse_csv(SAMPLE).transactions);
    }

    #[test]
    fn test_blank_lines_do_not_shift_row_numbers() {
        let text = "Date,Description,Amount\n\n01/01/2024,A,1\n,,\n\nnope,B,2\n";
        let result = parse_csv(text);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows_read, 2);
        assert_eq!(result.errors, vec!["Row 3: Invalid or missing date".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let result = parse_csv("");
        assert!(result.transactions.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.rows_read, 0);
    }

    #[test]
    fn test_header_only() {
        let result = parse_csv("Date,Description,Amount\n");
        assert_eq!(result.row_count, 0);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_quoted_cells_and_short_rows() {
        let text = "Date,Description,Amount,Balance\n\"01/03/2024\",\"Smith, J\",\"-1,250.00\"\n";
        let result = parse_csv(text);
        assert_eq!(result.row_count, 1);
        let t = &result.transactions[0];
        assert_eq!(t.description, "Smith, J");
        assert_eq!(t.amount, -1250.0);
        assert_eq!(t.metadata.len(), 3);
        assert_eq!(t.metadata.get("Balance"), None);
    }

    #[test]
    fn test_extra_cells_kept_in_metadata() {
        let result = parse_csv("Date,Amount\n01/03/2024,5.00,trailing\n");
        let t = &result.transactions[0];
        assert_eq!(t.metadata.get("column_3"), Some("trailing"));
    }

    #[test]
    fn test_windows_1252_bytes_are_decoded() {
        let mut bytes = b"Date,Description,Amount\n01/01/2024,Good,1.00\n".to_vec();
        bytes.extend_from_slice(b"02/01/2024,Caf\xE9,\xA32.00\n");
        let result = CsvParser::new().parse_bytes(&bytes);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.transactions[1].description, "Caf\u{e9}");
        assert_eq!(result.transactions[1].amount, 2.0);
    }

    #[test]
    fn test_stray_legacy_byte_does_not_corrupt_utf8_rows() {
        let mut bytes = "Date,Description,Paid Out\n01/01/2024,Shop,\u{a3}5.00\n"
            .as_bytes()
            .to_vec();
        bytes.extend_from_slice(b"02/01/2024,Caf\xE9,1.00\n");
        let result = CsvParser::new().parse_bytes(&bytes);
        let amounts: Vec<f64> = result.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-5.0, -1.0]);
        assert_eq!(result.transactions[0].paid_out, Some(5.0));
        assert_eq!(result.transactions[1].description, "Caf\u{e9}");
    }

    #[test]
    fn test_tokenizer_error_keeps_rows_before_it() {
        let text = "Date,Amount\n01/01/2024,1.00\n02/01/2024,2.00,extra\n03/01/2024,3.00\n";
        let result = CsvParser::new().strict(true).parse_str(text);
        assert_eq!(result.row_count, 1);
        assert_eq!(result.transactions[0].amount, 1.0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("CSV parse error: "));
        assert!(result.errors[0].ends_with("found record with 3 fields, but the header has 2"));

        let lenient = CsvParser::new().parse_str(text);
        assert_eq!(lenient.row_count, 3);
        assert!(lenient.errors.is_empty());
    }

    #[test]
    fn test_strict_mode_skips_whitespace_only_lines() {
        let text = "Date,Amount\n01/01/2024,1\n   \n,\n02/01/2024,2\n";
        let result = CsvParser::new().strict(true).parse_str(text);
        assert!(result.errors.is_empty());
        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows_read, 2);
    }

    #[test]
    fn test_read_failure_reports_single_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }
        let result = CsvParser::new().parse_reader(Broken);
        assert!(result.transactions.is_empty());
        assert_eq!(result.errors, vec!["Failed to read file: disk on fire".to_string()]);
    }

    #[test]
    fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvParser::new().parse_path(&dir.path().join("nope.csv"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Failed to read file: "));
    }

    #[test]
    fn test_semicolon_auto_detected() {
        let text = "Date;Description;Amount\n01/01/2024;Coffee;-2.50\n02/01/2024;Tea;-1.80\n";
        let parser = CsvParser::new().with_delimiter(Delimiter::Auto);
        let result = parser.parse_str(text);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.transactions[1].amount, -1.8);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(detect_delimiter("a|b\n1|2\n"), b'|');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_delimiter_from_str() {
        assert_eq!("Semicolon".parse::<Delimiter>(), Ok(Delimiter::Semicolon));
        assert_eq!("auto".parse::<Delimiter>(), Ok(Delimiter::Auto));
        assert!("space".parse::<Delimiter>().is_err());
        assert_eq!(Delimiter::Tab.to_string(), "tab");
    }

    #[test]
    fn test_custom_detector_is_used() {
        let parser =
            CsvParser::new().with_detector(HeaderOverrides::new().pin(Field::Date, "Value Date"));
        let text = "Posted Date,Value Date,Amount\nsoon,04/01/2024,3.00\n";
        let result = parser.parse_str(text);
        assert_eq!(result.row_count, 1);
        assert_eq!(
            result.transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_layout() {
        let layout = CsvParser::new().layout("\u{feff}Date,Details,Paid In,Paid Out\n").unwrap();
        assert_eq!(layout.delimiter, ',');
        assert_eq!(layout.headers.len(), 4);
        assert_eq!(layout.columns.description, Some(1));
        assert_eq!(layout.columns.paid_out, Some(3));
    }
}
