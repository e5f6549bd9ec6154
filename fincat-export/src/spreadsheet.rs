//! Write parsed transactions as the spreadsheet CSV used for bookkeeping.
//!
//! Columns: Date, Description, Payee/Payer, Reference, Paid In, Paid Out,
//! Amount, Category, Sub Category, Type. Money columns carry the currency
//! symbol in their header.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fincat_ingest::ParsedTransaction;
use tracing::info;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "£";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone)]
pub struct SpreadsheetExporter {
    currency_symbol: String,
}

impl Default for SpreadsheetExporter {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl SpreadsheetExporter {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let money = |label: &str| format!("{label} ({})", self.currency_symbol);
        vec![
            "Date".to_string(),
            "Description".to_string(),
            "Payee/Payer".to_string(),
            "Reference".to_string(),
            money("Paid In"),
            money("Paid Out"),
            money("Amount"),
            "Category".to_string(),
            "Sub Category".to_string(),
            "Type".to_string(),
        ]
    }

    /// Rows in date order; transactions sharing a date keep file order.
    pub fn rows(&self, txns: &[ParsedTransaction]) -> Vec<[String; 10]> {
        let mut sorted: Vec<&ParsedTransaction> = txns.iter().collect();
        sorted.sort_by_key(|t| t.date);
        sorted.into_iter().map(row).collect()
    }

    /// Write header plus rows; returns the number of rows written.
    pub fn write_to<W: Write>(&self, out: W, txns: &[ParsedTransaction]) -> Result<usize> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(self.headers())
            .context("writing export header")?;
        let rows = self.rows(txns);
        for r in &rows {
            wtr.write_record(r).context("writing export row")?;
        }
        wtr.flush().context("flushing export")?;
        Ok(rows.len())
    }

    pub fn write_path(&self, path: &Path, txns: &[ParsedTransaction]) -> Result<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let written = self
            .write_to(file, txns)
            .with_context(|| format!("exporting to {}", path.display()))?;
        info!(path = %path.display(), rows = written, "export written");
        Ok(written)
    }
}

fn row(t: &ParsedTransaction) -> [String; 10] {
    [
        t.date.format("%Y-%m-%d").to_string(),
        t.description.clone(),
        t.payer_payee.clone().unwrap_or_default(),
        t.reference.clone().unwrap_or_default(),
        side_money(t.paid_in),
        side_money(t.paid_out),
        money(t.amount),
        t.original_category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        t.original_sub_category.clone().unwrap_or_default(),
        t.transaction_type.clone().unwrap_or_default(),
    ]
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

// A zero paid-in/paid-out cell reads as "nothing on this side"
fn side_money(v: Option<f64>) -> String {
    v.filter(|x| *x != 0.0).map(money).unwrap_or_default()
}
