//! PC Financial Mastercard statement parser (text)
//!
//! Expected extracted-text rows:
//!   TRANSACTION  POSTING
//!   DATE         DATE      DESCRIPTION                                   AMOUNT
//!   Jan 13       Jan 15    PAYMENT - THANK YOU                          1,250.00
//!   Jan 14       Jan 16    12345678901234  LOBLAWS 1012 TORONTO ON        212.34
//!   Jan 28       Jan 29    RETURN - SPORT CHEK                            -25.24
//!
//! Some rows carry a long reference number ahead of the description; it is
//! dropped. Payment confirmations are left out of the transaction list because
//! the statement's payments total already accounts for them.

use log::debug;
use regex::Regex;
use rust_decimal::Decimal;
use stmt_core::{StatementAnchor, Transaction, parse_amount, resolve_date};

use crate::error::StatementError;
use crate::parsers::find_summary_amount;
use crate::types::{AggregateFigures, Extraction, IssuerVariant};

const ISSUER: IssuerVariant = IssuerVariant::PcFinancial;

const PAYMENT_LINE: &str = r"(?i)PAYMENT\s*-?\s*THANK\s+YOU";

/// Payments-total labels, tried in order.
const PAYMENT_TOTAL_LABELS: [&str; 2] = [
    r"(?i)Total payments[ \t]+-?\$?([\d,]+\.\d{2})",
    r"(?i)\bPayments[ \t]+-?\$?([\d,]+\.\d{2})",
];

/// Parse extracted statement text into PC Financial transactions and balances.
pub fn parse_pc_financial_text(text: &str) -> Result<Extraction, StatementError> {
    let anchor_re = Regex::new(
        r"(?i)Statement date:?[ \t]+(?P<month>[a-z]{3})[a-z]*\.?[ \t]+\d{1,2},?[ \t]+(?P<year>\d{4})",
    )?;
    // TRANS-DATE  [POST-DATE]  [REFERENCE]  DESCRIPTION  [-][$]AMOUNT
    let txn_re = Regex::new(concat!(
        r"^[ \t]*(?P<date>[A-Z][a-z]{2}\.?[ \t]+\d{1,2})[ \t]+",
        r"(?:[A-Z][a-z]{2}\.?[ \t]+\d{1,2}[ \t]+)?",
        r"(?:\d{6,}[ \t]+)?",
        r"(?P<desc>.+?)[ \t]+",
        r"(?P<polarity>-)?\$?(?P<amt>\d{1,3}(?:,\d{3})*\.\d{2})[ \t]*$"
    ))?;
    let payment_re = Regex::new(PAYMENT_LINE)?;
    let previous_re = Regex::new(r"(?i)Previous balance[ \t]+(-?)\$?([\d,]+\.\d{2})")?;
    let new_balance_re = Regex::new(r"(?i)New balance[ \t]+(-?)\$?([\d,]+\.\d{2})")?;
    let payment_total_res = PAYMENT_TOTAL_LABELS
        .iter()
        .map(|label| Regex::new(label))
        .collect::<Result<Vec<_>, _>>()?;

    let caps = anchor_re
        .captures(text)
        .ok_or_else(|| missing("statement date"))?;
    let year: i32 = caps["year"].parse().map_err(|_| missing("statement date"))?;
    let anchor =
        StatementAnchor::from_tokens(&caps["month"], year).ok_or_else(|| missing("statement date"))?;

    let mut transactions = Vec::new();
    let mut skipped_payments = 0usize;

    for line in text.lines() {
        let Some(caps) = txn_re.captures(line) else {
            continue;
        };

        let desc = caps["desc"].trim();
        if payment_re.is_match(desc) {
            skipped_payments += 1;
            continue;
        }

        let date = resolve_date(anchor, &caps["date"])?;
        let amount = parse_amount(&caps["amt"], caps.name("polarity").is_some())?;
        transactions.push(Transaction::new(date, desc, amount));
    }

    let previous_balance =
        find_summary_amount(&previous_re, text)?.ok_or_else(|| missing("previous balance"))?;
    let new_balance =
        find_summary_amount(&new_balance_re, text)?.ok_or_else(|| missing("new balance"))?;
    let payments = find_payments_total(&payment_total_res, text)?.ok_or_else(|| missing("payments total"))?;

    debug!(
        "PC Financial {:04}-{:02}: {} rows, {} payment lines left out",
        anchor.year,
        anchor.month,
        transactions.len(),
        skipped_payments
    );

    Ok(Extraction {
        issuer: ISSUER,
        transactions,
        aggregates: AggregateFigures::PcFinancial {
            previous_balance,
            payments,
            new_balance,
        },
        id_sequence_present: false,
    })
}

fn find_payments_total(labels: &[Regex], text: &str) -> Result<Option<Decimal>, StatementError> {
    for re in labels {
        if let Some(amount) = find_summary_amount(re, text)? {
            return Ok(Some(amount));
        }
    }
    Ok(None)
}

fn missing(anchor: &'static str) -> StatementError {
    StatementError::MissingRequiredAnchor {
        issuer: ISSUER,
        anchor,
    }
}
