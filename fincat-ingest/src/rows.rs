//! Row normalizer: one tokenized row + column map → transaction.
//!
//! A missing or unparseable date is the only reason a row is rejected;
//! every other field degrades to absent (or a placeholder).

use crate::amounts::parse_amount;
use crate::dates::parse_date;
use crate::error::IngestError;
use crate::types::{ColumnMap, Field, ParsedTransaction, RawRow, RowMetadata};

pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Per-file knobs for the row normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Used when the description column is unmapped or blank.
    pub description_placeholder: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            description_placeholder: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

pub fn normalize_row(
    row: &RawRow,
    cols: &ColumnMap,
    opts: &ParseOptions,
) -> Result<ParsedTransaction, IngestError> {
    let text = |field: Field| cols.get(field).and_then(|i| row.cell(i));

    let date = text(Field::Date)
        .and_then(parse_date)
        .ok_or(IngestError::InvalidDate {
            line: row.line_number(),
        })?;

    let description = text(Field::Description)
        .unwrap_or(opts.description_placeholder.as_str())
        .to_string();

    let paid_in = parse_amount(text(Field::PaidIn));
    let paid_out = parse_amount(text(Field::PaidOut));
    let amount = signed_amount(paid_in, paid_out, parse_amount(text(Field::Amount)));

    let owned = |field: Field| text(field).map(str::to_string);

    Ok(ParsedTransaction {
        date,
        description,
        payer_payee: owned(Field::PayerPayee),
        reference: owned(Field::Reference),
        paid_in,
        paid_out,
        amount,
        original_category: owned(Field::Category),
        original_sub_category: owned(Field::SubCategory),
        transaction_type: owned(Field::TransactionType),
        metadata: RowMetadata::from(row),
    })
}

/// Paid-in wins over paid-out; the signed amount column is the last resort.
/// An unmapped, blank or unparseable amount column counts as zero.
fn signed_amount(paid_in: Option<f64>, paid_out: Option<f64>, signed: Option<f64>) -> f64 {
    match (paid_in, paid_out) {
        (Some(inflow), _) if inflow > 0.0 => inflow,
        (_, Some(outflow)) if outflow > 0.0 => -outflow,
        _ => signed.unwrap_or(0.0),
    }
}
