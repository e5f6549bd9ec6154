use thiserror::Error;

/// Failures the ingest pipeline records in `CsvParseResult::errors`.
///
/// None of these escape the parser as `Err`; their `Display` text is the
/// message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The statement bytes could not be obtained. Nothing was parsed.
    #[error("Failed to read file: {0}")]
    Read(String),

    /// The tokenizer gave up part-way. Rows before this point are kept.
    #[error("CSV parse error: {0}")]
    Tokenize(String),

    /// Row-level and recoverable: the row is skipped.
    #[error("Row {line}: Invalid or missing date")]
    InvalidDate { line: usize },
}

impl IngestError {
    pub fn is_row_level(&self) -> bool {
        matches!(self, IngestError::InvalidDate { .. })
    }
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        IngestError::Read(e.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::Tokenize(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            IngestError::InvalidDate { line: 3 }.to_string(),
            "Row 3: Invalid or missing date"
        );
        assert_eq!(
            IngestError::Read("permission denied".into()).to_string(),
            "Failed to read file: permission denied"
        );
        assert!(IngestError::InvalidDate { line: 2 }.is_row_level());
        assert!(!IngestError::Tokenize("bad".into()).is_row_level());
    }
}
