//! Issuer-specific statement text parsers.

pub mod cibc;
pub mod pc_financial;
pub mod scotiabank;

use regex::Regex;
use rust_decimal::Decimal;
use stmt_core::parse_amount;

use crate::error::StatementError;

/// First match of a summary label whose pattern captures `(sign)?(amount)`.
///
/// Patterns with a single group are read as unsigned.
pub(crate) fn find_summary_amount(re: &Regex, text: &str) -> Result<Option<Decimal>, StatementError> {
    match re.captures(text) {
        Some(caps) => Ok(Some(amount_from_captures(&caps)?)),
        None => Ok(None),
    }
}

/// Sum of every match of a summary label; `None` when the label never appears.
pub(crate) fn sum_summary_amounts(re: &Regex, text: &str) -> Result<Option<Decimal>, StatementError> {
    let mut total: Option<Decimal> = None;
    for caps in re.captures_iter(text) {
        let amount = amount_from_captures(&caps)?;
        total = Some(total.unwrap_or_default() + amount);
    }
    Ok(total)
}

fn amount_from_captures(caps: &regex::Captures<'_>) -> Result<Decimal, StatementError> {
    let (negative, digits) = if caps.len() > 2 {
        (caps.get(1).is_some_and(|m| m.as_str() == "-"), &caps[2])
    } else {
        (false, &caps[1])
    };
    Ok(parse_amount(digits, negative)?)
}
