//! Header → semantic column detection.
//!
//! Detection is a strategy behind [`ColumnDetector`] so row normalization
//! never depends on how the map was produced. [`KeywordDetector`] is the
//! default heuristic; [`HeaderOverrides`] pins known headers for a bank
//! and defers the rest.

use std::collections::BTreeMap;

use crate::types::{ColumnMap, Field};

pub trait ColumnDetector {
    fn detect(&self, headers: &[String]) -> ColumnMap;
}

impl<F> ColumnDetector for F
where
    F: Fn(&[String]) -> ColumnMap,
{
    fn detect(&self, headers: &[String]) -> ColumnMap {
        self(headers)
    }
}

/// Substring heuristic over lower-cased, trimmed headers. First matching
/// header (left to right) wins for each field independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDetector;

impl ColumnDetector for KeywordDetector {
    fn detect(&self, headers: &[String]) -> ColumnMap {
        detect_columns(headers)
    }
}

pub fn detect_columns(headers: &[String]) -> ColumnMap {
    let lower: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let mut map = ColumnMap::default();
    for field in Field::ALL {
        map.set(field, lower.iter().position(|h| header_matches(field, h)));
    }
    map
}

fn header_matches(field: Field, h: &str) -> bool {
    let any = |keys: &[&str]| keys.iter().any(|k| h.contains(k));
    match field {
        Field::Date => any(&["date", "transaction date"]),
        Field::Description => any(&["description", "details", "narrative"]),
        Field::PayerPayee => any(&["payee", "payer", "name"]),
        Field::Reference => any(&["reference", "ref"]),
        Field::PaidIn => any(&["paid in", "credit", "deposit", "paid in amount"]),
        Field::PaidOut => any(&["paid out", "debit", "withdrawal", "paid out amount"]),
        Field::Amount => h == "amount" || h.contains("transaction amount"),
        Field::Category => h.contains("category") && !h.contains("sub"),
        Field::SubCategory => any(&["sub category", "subcategory"]),
        Field::TransactionType => any(&["type", "transaction type"]),
    }
}

fn normalize_header(h: &str) -> String {
    // Excel exports often carry a BOM on the first header
    h.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Exact header names for some fields (a per-bank template); every other
/// field comes from the fallback detector.
#[derive(Debug, Clone, Default)]
pub struct HeaderOverrides<D = KeywordDetector> {
    pinned: BTreeMap<Field, String>,
    fallback: D,
}

impl HeaderOverrides<KeywordDetector> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: ColumnDetector> HeaderOverrides<D> {
    pub fn with_fallback(fallback: D) -> Self {
        Self {
            pinned: BTreeMap::new(),
            fallback,
        }
    }

    pub fn pin(mut self, field: Field, header: impl Into<String>) -> Self {
        self.pinned.insert(field, normalize_header(&header.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }
}

impl<D: ColumnDetector> ColumnDetector for HeaderOverrides<D> {
    fn detect(&self, headers: &[String]) -> ColumnMap {
        let mut map = self.fallback.detect(headers);
        let lower: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        for (field, wanted) in &self.pinned {
            // A pinned header missing from this file leaves the field absent
            map.set(*field, lower.iter().position(|h| h == wanted));
        }
        map
    }
}
