//! Amount normalizer: currency text → signed number.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Anything a statement cell can hand the amount normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountInput<'a> {
    Text(&'a str),
    Number(f64),
    Absent,
}

impl<'a> From<&'a str> for AmountInput<'a> {
    fn from(s: &'a str) -> Self {
        AmountInput::Text(s)
    }
}

impl<'a> From<&'a String> for AmountInput<'a> {
    fn from(s: &'a String) -> Self {
        AmountInput::Text(s.as_str())
    }
}

impl From<f64> for AmountInput<'_> {
    fn from(n: f64) -> Self {
        AmountInput::Number(n)
    }
}

impl<'a, T: Into<AmountInput<'a>>> From<Option<T>> for AmountInput<'a> {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AmountInput::Absent)
    }
}

/// Parse a currency-formatted amount.
///
/// Strips `£ $ €` and thousands commas, reads `(x)` as `-x`, then takes the
/// longest leading number. `None` when nothing numeric is left; callers
/// treat that as "column not usable for this row", not as an error.
pub fn parse_amount<'a>(raw: impl Into<AmountInput<'a>>) -> Option<f64> {
    let text = match raw.into() {
        AmountInput::Absent => return None,
        AmountInput::Text(s) => s.to_string(),
        AmountInput::Number(n) => n.to_string(),
    };

    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | '€' | ','))
        .collect();
    let mut s = stripped.trim().to_string();
    if s.is_empty() {
        return None;
    }

    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        s = format!("-{}", inner.trim());
    }

    let prefix = NUMERIC_PREFIX.find(&s)?;
    let value: f64 = prefix.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("15.00"), Some(15.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("0"), Some(0.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
    }

    #[test]
    fn test_parse_amount_currency_and_separators() {
        assert_eq!(parse_amount("£1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$50"), Some(50.0));
        assert_eq!(parse_amount("€ 9.99"), Some(9.99));
        assert_eq!(parse_amount("-£50.00"), Some(-50.0));
        assert_eq!(parse_amount("£-50.00"), Some(-50.0));
    }

    #[test]
    fn test_parse_amount_parenthesized_negatives() {
        assert_eq!(parse_amount("(100.00)"), Some(-100.0));
        assert_eq!(parse_amount("(£1,234.56)"), Some(-1234.56));
        assert_eq!(parse_amount("( 7.25 )"), Some(-7.25));
    }

    #[test]
    fn test_parse_amount_takes_leading_number() {
        assert_eq!(parse_amount("15.00 GBP"), Some(15.0));
        assert_eq!(parse_amount("12.50CR"), Some(12.5));
        assert_eq!(parse_amount("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_amount_absent_inputs() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("£"), None);
        assert_eq!(parse_amount("CR"), None);
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount(None::<&str>), None);
        assert_eq!(parse_amount(AmountInput::Absent), None);
    }

    #[test]
    fn test_parse_amount_numeric_input() {
        assert_eq!(parse_amount(12.5), Some(12.5));
        assert_eq!(parse_amount(-3.0), Some(-3.0));
        assert_eq!(parse_amount(Some(0.25)), Some(0.25));
        assert_eq!(parse_amount(f64::NAN), None);
        assert_eq!(parse_amount(f64::INFINITY), None);
    }
}
