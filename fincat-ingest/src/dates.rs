//! Date normalizer for UK bank exports.
//!
//! Numeric dates are read day-first (`03/04/2024` is 3 April). A cell that
//! looks day-first but names an impossible date is rejected rather than
//! re-read month-first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_FIRST_SLASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:$|\D)").unwrap());
static DAY_FIRST_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})(?:$|\D)").unwrap());
static ISO_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:$|\D)").unwrap());
static DAY_MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:\s+|-)([A-Za-z]{3,9})\.?(?:\s+|-)(\d{4}|\d{2})(?:$|\D)").unwrap()
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Tried in order once none of the recognised shapes match. Two-digit
/// years come before `%Y`, which would otherwise read `24` as year 24.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%Y%m%d",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    DayFirstSlash,
    DayFirstDash,
    IsoLike,
    DayMonthName,
}

/// Parse a statement date cell. `None` means unparseable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    match classify(s) {
        Some((Shape::DayFirstSlash | Shape::DayFirstDash, caps)) => {
            let (d, m, y) = (caps[0], caps[1], caps[2]);
            NaiveDate::from_ymd_opt(y as i32, m, d)
        }
        Some((Shape::IsoLike, caps)) => {
            let (y, m, d) = (caps[0], caps[1], caps[2]);
            NaiveDate::from_ymd_opt(y as i32, m, d)
        }
        Some((Shape::DayMonthName, _)) => parse_day_month_name(s).or_else(|| parse_fallback(s)),
        None => parse_fallback(s),
    }
}

fn classify(s: &str) -> Option<(Shape, [u32; 3])> {
    let numeric = [
        (Shape::DayFirstSlash, &*DAY_FIRST_SLASH),
        (Shape::DayFirstDash, &*DAY_FIRST_DASH),
        (Shape::IsoLike, &*ISO_LIKE),
    ];
    for (shape, re) in numeric {
        if let Some(caps) = re.captures(s) {
            let mut out = [0u32; 3];
            for (slot, i) in out.iter_mut().zip(1..=3) {
                *slot = caps[i].parse().ok()?;
            }
            return Some((shape, out));
        }
    }
    if DAY_MONTH_NAME.is_match(s) {
        return Some((Shape::DayMonthName, [0; 3]));
    }
    None
}

fn parse_day_month_name(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_NAME.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year: i32 = match &caps[3] {
        yy if yy.len() == 2 => expand_two_digit_year(yy.parse().ok()?),
        yyyy => yyyy.parse().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Same pivot as chrono's `%y`: 00-69 → 2000s, 70-99 → 1900s.
fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 70 { 2000 + yy } else { 1900 + yy }
}

/// 1-based month for any prefix of an English month name of at least three
/// letters (`Sep`, `Sept`, `September`).
fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| i as u32 + 1)
}

fn parse_fallback(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
