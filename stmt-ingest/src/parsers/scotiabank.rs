//! Scotiabank VISA statement parser (text)
//!
//! Expected rows after PDF-to-text (layout mode):
//!   REF.# TRANS. POST    DETAILS                                         AMOUNT($)
//!   001   Dec 8  Dec 11  LOBLAWS #1234 TORONTO ON                            84.12
//!   002   Dec 15 Dec 18  PAYMENT FROM - *****06*2315                        312.40-
//!   003   Dec 22 Dec 27  AMAZON.COM AMZN.COM/BILL WA AMT 25.00 USD            34.18
//!
//! Reference numbers are sequential within a statement. A trailing `-` marks a
//! credit. Foreign purchases carry an `AMT <amount> <currency>` note before the
//! Canadian amount.

use log::debug;
use regex::Regex;
use stmt_core::{StatementAnchor, Transaction, parse_amount, resolve_date};

use crate::error::StatementError;
use crate::parsers::find_summary_amount;
use crate::types::{AggregateFigures, Extraction, IssuerVariant};

const ISSUER: IssuerVariant = IssuerVariant::Scotiabank;

/// Parse extracted statement text into Scotiabank transactions and summary totals.
///
/// A missing statement date or summary total is a hard error.
pub fn parse_scotiabank_text(text: &str) -> Result<Extraction, StatementError> {
    let anchor_re = Regex::new(r"Statement date +(\w{3}) +\d{1,2}, +(\d{4})")?;
    // REF  TRANS-DATE  [POST-DATE]  DETAILS  [AMT foreign-amount words]  AMOUNT[-]
    // An amount directly followed by '%' is an interest rate, not a row.
    let txn_re = Regex::new(concat!(
        r"(?P<id>\d{3}) +(?P<date>\w{3} +\d{1,2}) +(?:\w{3} +\d{1,2} +)?",
        r"(?P<desc>.+?)(?:AMT +(?:[\d,]+?\.\d{2}-?)? (?:[\w ]*?)?)?",
        r" +(?P<amt>[\d,]+?\.\d{2})(?P<polarity>-?)(?:[^%]|$)"
    ))?;
    let payments_re = Regex::new(r"Payments/credits[\s\-$]+([\d,]+\.\d{2})")?;
    let purchases_re = Regex::new(r"Purchases/charges[\s+$]+([\d,]+\.\d{2})")?;

    let caps = anchor_re
        .captures(text)
        .ok_or_else(|| missing("statement date"))?;
    let year: i32 = caps[2].parse().map_err(|_| missing("statement date"))?;
    let anchor =
        StatementAnchor::from_tokens(&caps[1], year).ok_or_else(|| missing("statement date"))?;

    let mut transactions = Vec::new();
    for caps in txn_re.captures_iter(text) {
        let id: u32 = caps["id"].parse().map_err(|_| missing("reference number"))?;
        let date = resolve_date(anchor, &caps["date"])?;
        let amount = parse_amount(&caps["amt"], &caps["polarity"] == "-")?;

        transactions.push(Transaction::new(date, &caps["desc"], amount).with_id(id));
    }

    let payments_credits =
        find_summary_amount(&payments_re, text)?.ok_or_else(|| missing("payments/credits total"))?;
    let purchases_charges =
        find_summary_amount(&purchases_re, text)?.ok_or_else(|| missing("purchases/charges total"))?;

    debug!(
        "Scotiabank {:04}-{:02}: {} rows",
        anchor.year,
        anchor.month,
        transactions.len()
    );

    Ok(Extraction {
        issuer: ISSUER,
        transactions,
        aggregates: AggregateFigures::Scotiabank {
            payments_credits,
            purchases_charges,
        },
        id_sequence_present: true,
    })
}

fn missing(anchor: &'static str) -> StatementError {
    StatementError::MissingRequiredAnchor {
        issuer: ISSUER,
        anchor,
    }
}
