//! fincat-export: spreadsheet export of parsed statement transactions

pub mod spreadsheet;

pub use spreadsheet::{SpreadsheetExporter, DEFAULT_CURRENCY_SYMBOL, UNCATEGORIZED};
