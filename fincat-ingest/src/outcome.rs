//! What a caller does with a parse result: accept, accept with warnings,
//! or reject the upload. Plus the figures shown next to an upload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::CsvParseResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseOutcome {
    /// Transactions and no errors (an empty file with no errors is clean too).
    Clean,
    /// Some rows parsed, some did not.
    Partial,
    /// Errors and nothing usable: the upload should be refused.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub transactions: usize,
    pub rejected_rows: usize,
    /// Sum of positive amounts.
    pub total_in: f64,
    /// Sum of negative amounts, as a positive figure.
    pub total_out: f64,
    pub net: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl CsvParseResult {
    pub fn outcome(&self) -> ParseOutcome {
        match (self.errors.is_empty(), self.transactions.is_empty()) {
            (true, _) => ParseOutcome::Clean,
            (false, false) => ParseOutcome::Partial,
            (false, true) => ParseOutcome::Rejected,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.outcome() != ParseOutcome::Rejected
    }

    pub fn summary(&self) -> StatementSummary {
        let (total_in, total_out) = self.transactions.iter().fold((0.0, 0.0), |(i, o), t| {
            if t.amount >= 0.0 {
                (i + t.amount, o)
            } else {
                (i, o - t.amount)
            }
        });
        StatementSummary {
            transactions: self.transactions.len(),
            rejected_rows: self.rows_rejected(),
            total_in,
            total_out,
            net: total_in - total_out,
            first_date: self.transactions.iter().map(|t| t.date).min(),
            last_date: self.transactions.iter().map(|t| t.date).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;

    #[test]
    fn test_outcomes() {
        let clean = parse_csv("Date,Amount\n01/01/2024,1.00\n");
        assert_eq!(clean.outcome(), ParseOutcome::Clean);

        let partial = parse_csv("Date,Amount\n01/01/2024,1.00\nnope,2.00\n");
        assert_eq!(partial.outcome(), ParseOutcome::Partial);
        assert!(partial.is_usable());

        let rejected = parse_csv("Date,Amount\nnope,2.00\n");
        assert_eq!(rejected.outcome(), ParseOutcome::Rejected);
        assert!(!rejected.is_usable());

        assert_eq!(parse_csv("").outcome(), ParseOutcome::Clean);
    }

    #[test]
    fn test_summary() {
        let result = parse_csv(
            "Date,Description,Paid In,Paid Out\n\
             03/02/2024,Salary,1000.00,\n\
             01/02/2024,Tesco,,15.50\n\
             ,Nothing,,1.00\n\
             10/02/2024,Rent,,500.00\n",
        );
        let s = result.summary();
        assert_eq!(s.transactions, 3);
        assert_eq!(s.rejected_rows, 1);
        assert_eq!(s.total_in, 1000.0);
        assert_eq!(s.total_out, 515.5);
        assert_eq!(s.net, 484.5);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(s.last_date, NaiveDate::from_ymd_opt(2024, 2, 10));
    }

    #[test]
    fn test_summary_of_nothing() {
        let s = CsvParseResult::default().summary();
        assert_eq!(s.transactions, 0);
        assert_eq!(s.net, 0.0);
        assert_eq!(s.first_date, None);
    }
}
