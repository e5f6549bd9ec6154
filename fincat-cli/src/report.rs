//! Terminal rendering for `fincat parse` and `fincat columns`.

use fincat_ingest::{CsvParseResult, ParseOutcome, StatementLayout, StatementSummary};
use serde::Serialize;
use std::fmt;

/// JSON shape of `fincat parse --json`.
#[derive(Debug, Serialize)]
pub struct ParseReport<'a> {
    pub outcome: ParseOutcome,
    pub summary: StatementSummary,
    #[serde(flatten)]
    pub result: &'a CsvParseResult,
}

impl<'a> ParseReport<'a> {
    pub fn new(result: &'a CsvParseResult) -> Self {
        Self {
            outcome: result.outcome(),
            summary: result.summary(),
            result,
        }
    }
}

/// Human-readable `fincat parse` output.
pub struct ParseView<'a>(pub &'a CsvParseResult);

impl fmt::Display for ParseView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let s = result.summary();

        write!(f, "{} transactions, {} rejected rows", s.transactions, s.rejected_rows)?;
        if let (Some(first), Some(last)) = (s.first_date, s.last_date) {
            write!(f, " ({first} to {last})")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "in {:.2} | out {:.2} | net {:.2}\n",
            s.total_in, s.total_out, s.net
        )?;

        for t in &result.transactions {
            write!(f, "{}  {:>12.2}  {}", t.date, t.amount, t.description)?;
            if let Some(category) = &t.original_category {
                write!(f, "  [{category}]")?;
            }
            writeln!(f)?;
        }

        if !result.errors.is_empty() {
            writeln!(f, "\nErrors:")?;
            for e in &result.errors {
                writeln!(f, "- {e}")?;
            }
        }
        Ok(())
    }
}

/// `fincat columns` output: resolved delimiter, then one line per field.
pub struct LayoutView<'a>(pub &'a StatementLayout);

impl fmt::Display for LayoutView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.0;
        match layout.delimiter {
            '\t' => writeln!(f, "delimiter: tab")?,
            c => writeln!(f, "delimiter: '{c}'")?,
        }
        for (field, idx) in layout.columns.iter() {
            write!(f, "{:<17} ", field.key())?;
            match idx {
                Some(i) => {
                    let header = layout.headers.get(i).map(|h| h.trim()).unwrap_or_default();
                    writeln!(f, "column {} \"{header}\"", i + 1)?;
                }
                None => writeln!(f, "(not found)")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fincat_ingest::{CsvParser, parse_csv};

    #[test]
    fn test_render_parse_lists_rows_and_errors() {
        let result = parse_csv(
            "Date,Description,Amount,Category\n01/01/2024,Tea,-1.5,Meals\nbad,x,1,\n",
        );
        let text = ParseView(&result).to_string();
        assert!(text.starts_with("1 transactions, 1 rejected rows (2024-01-01 to 2024-01-01)"));
        assert!(text.contains("2024-01-01         -1.50  Tea  [Meals]"));
        assert!(text.contains("- Row 3: Invalid or missing date"));
    }

    #[test]
    fn test_report_json_is_flat() {
        let result = parse_csv("Date,Amount\n01/01/2024,2\n");
        let json = serde_json::to_value(ParseReport::new(&result)).unwrap();
        assert_eq!(json["outcome"], "clean");
        assert_eq!(json["row_count"], 1);
        assert_eq!(json["summary"]["total_in"], 2.0);
        assert_eq!(json["transactions"][0]["date"], "2024-01-01");
    }

    #[test]
    fn test_render_layout() {
        let layout = CsvParser::new().layout("Date,Details,Amount\n").unwrap();
        let text = LayoutView(&layout).to_string();
        assert!(text.contains("delimiter: ','"));
        assert!(text.contains("date              column 1 \"Date\""));
        assert!(text.contains("paid_in           (not found)"));
    }
}
