//! Date and amount normalization shared by all issuer extractors.
//!
//! Statement rows only print `Mon D`; the year comes from the statement's own
//! date anchor. A January statement can list late-December rows, which belong
//! to the previous year.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid transaction date '{token}'")]
    InvalidDate { token: String },

    #[error("invalid amount '{raw}'")]
    InvalidAmount { raw: String },
}

/// Reference point recovered from a statement's date or period label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementAnchor {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl StatementAnchor {
    /// Build from a month token ("Jan", "January", "Jan.") and a year.
    pub fn from_tokens(month: &str, year: i32) -> Option<Self> {
        Some(Self {
            year,
            month: month_from_abbrev(month)?,
        })
    }
}

/// Map the first three letters of an English month name to its number.
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    let abbrev: String = s.trim().chars().take(3).collect::<String>().to_ascii_lowercase();

    let month = match abbrev.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };

    Some(month)
}

/// Resolve a `Mon D` token (e.g. "Dec 31", "Jan. 5") against the statement anchor.
pub fn resolve_date(anchor: StatementAnchor, token: &str) -> Result<NaiveDate, NormalizeError> {
    let invalid = || NormalizeError::InvalidDate {
        token: token.to_string(),
    };

    let mut parts = token.split_whitespace();
    let (Some(month_str), Some(day_str), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let month = month_from_abbrev(month_str.trim_end_matches('.')).ok_or_else(invalid)?;
    let day: u32 = day_str.parse().map_err(|_| invalid())?;

    let year = if anchor.month == 1 && month == 12 {
        anchor.year - 1
    } else {
        anchor.year
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse a printed magnitude like "1,234.56" into a two-decimal amount.
pub fn parse_amount(digits: &str, negative: bool) -> Result<Decimal, NormalizeError> {
    let cleaned = digits.trim().replace(',', "");
    let mut value = Decimal::from_str(&cleaned).map_err(|_| NormalizeError::InvalidAmount {
        raw: digits.to_string(),
    })?;
    value.rescale(2);

    Ok(if negative { -value } else { value })
}
