use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Semantic transaction fields a statement column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Description,
    PayerPayee,
    Reference,
    PaidIn,
    PaidOut,
    Amount,
    Category,
    SubCategory,
    TransactionType,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Date,
        Field::Description,
        Field::PayerPayee,
        Field::Reference,
        Field::PaidIn,
        Field::PaidOut,
        Field::Amount,
        Field::Category,
        Field::SubCategory,
        Field::TransactionType,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Description => "description",
            Field::PayerPayee => "payer_payee",
            Field::Reference => "reference",
            Field::PaidIn => "paid_in",
            Field::PaidOut => "paid_out",
            Field::Amount => "amount",
            Field::Category => "category",
            Field::SubCategory => "sub_category",
            Field::TransactionType => "transaction_type",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Column index per semantic field, computed once per file from the header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub payer_payee: Option<usize>,
    pub reference: Option<usize>,
    pub paid_in: Option<usize>,
    pub paid_out: Option<usize>,
    pub amount: Option<usize>,
    pub category: Option<usize>,
    pub sub_category: Option<usize>,
    pub transaction_type: Option<usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Date => self.date,
            Field::Description => self.description,
            Field::PayerPayee => self.payer_payee,
            Field::Reference => self.reference,
            Field::PaidIn => self.paid_in,
            Field::PaidOut => self.paid_out,
            Field::Amount => self.amount,
            Field::Category => self.category,
            Field::SubCategory => self.sub_category,
            Field::TransactionType => self.transaction_type,
        }
    }

    pub fn set(&mut self, field: Field, index: Option<usize>) {
        let slot = match field {
            Field::Date => &mut self.date,
            Field::Description => &mut self.description,
            Field::PayerPayee => &mut self.payer_payee,
            Field::Reference => &mut self.reference,
            Field::PaidIn => &mut self.paid_in,
            Field::PaidOut => &mut self.paid_out,
            Field::Amount => &mut self.amount,
            Field::Category => &mut self.category,
            Field::SubCategory => &mut self.sub_category,
            Field::TransactionType => &mut self.transaction_type,
        };
        *slot = index;
    }

    /// Fields in table order, paired with their resolved column.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<usize>)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, idx)| idx.is_none())
    }
}

/// One tokenized data row: ordered (header, cell) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 0-based position among the data rows (header excluded, blank lines skipped)
    pub ordinal: usize,
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(ordinal: usize, cells: Vec<(String, String)>) -> Self {
        Self { ordinal, cells }
    }

    /// Trimmed cell at `index`, `None` if the row is short or the cell is blank.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Spreadsheet-style line number: the header is line 1.
    pub fn line_number(&self) -> usize {
        self.ordinal + 2
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Original header → original cell text, kept for audit.
///
/// Serialized as a JSON object in header order. Cells are stored untrimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMetadata(Vec<(String, String)>);

impl RowMetadata {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&RawRow> for RowMetadata {
    fn from(row: &RawRow) -> Self {
        Self(row.cells.clone())
    }
}

impl From<Vec<(String, String)>> for RowMetadata {
    fn from(entries: Vec<(String, String)>) -> Self {
        Self(entries)
    }
}

impl Serialize for RowMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (header, value) in &self.0 {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RowMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = RowMetadata;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of header to cell text")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<RowMetadata, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    entries.push((k, v));
                }
                Ok(RowMetadata(entries))
            }
        }

        deserializer.deserialize_map(Visitor)
    }
}

/// Normalized output of the statement parser (bank-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub payer_payee: Option<String>,
    pub reference: Option<String>,
    pub paid_in: Option<f64>,
    pub paid_out: Option<f64>,
    /// Positive = money in (credit), negative = money out (debit).
    pub amount: f64,
    pub original_category: Option<String>,
    pub original_sub_category: Option<String>,
    pub transaction_type: Option<String>,
    pub metadata: RowMetadata,
}

impl ParsedTransaction {
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }
}

/// Everything one statement file produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvParseResult {
    pub transactions: Vec<ParsedTransaction>,
    /// Always `transactions.len()`.
    pub row_count: usize,
    /// Data rows handed to the row normalizer.
    pub rows_read: usize,
    pub errors: Vec<String>,
}

impl CsvParseResult {
    pub(crate) fn failed(error: String) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }

    /// Rows that were read but produced no transaction.
    pub fn rows_rejected(&self) -> usize {
        self.rows_read.saturating_sub(self.transactions.len())
    }
}
