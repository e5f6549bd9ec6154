//! fincat-ingest: bank-statement CSV ingestion for UK business accounts.
//!
//! Column detection, date/amount normalization and the parse driver that
//! turns an uploaded export into [`ParsedTransaction`]s plus row errors.

pub mod amounts;
pub mod columns;
pub mod dates;
pub mod decode;
pub mod error;
pub mod outcome;
pub mod parser;
pub mod rows;
pub mod types;

pub use amounts::{AmountInput, parse_amount};
pub use columns::{ColumnDetector, HeaderOverrides, KeywordDetector, detect_columns};
pub use dates::parse_date;
pub use error::IngestError;
pub use outcome::{ParseOutcome, StatementSummary};
pub use parser::{CsvParser, Delimiter, StatementLayout, parse_csv};
pub use rows::{DEFAULT_DESCRIPTION, ParseOptions, normalize_row};
pub use types::{ColumnMap, CsvParseResult, Field, ParsedTransaction, RawRow, RowMetadata};
