//! CIBC credit card statement parser (text)
//!
//! Expected extracted-text sections:
//!   Statement period    December 16, 2023 to January 15, 2024
//!   Trans     Post
//!   date      date      Description                                 Amount($)
//!   Dec 20    Dec 21    PAYMENT THANK YOU/PAIEMENT MERCI            500.00
//!   Dec 28    Dec 29    UNITED AIRLINES HOUSTON TX                  462.00
//!                         340.00 USD @ 1.358823529
//!   Jan 3     Jan 4     SHOPPERS DRUG MART #1234                     18.40
//!                         TORONTO ON
//!   Total credits   $520.00
//!   Total charges   $526.07
//!
//! Payments are printed as magnitudes and flipped to credits here. Credits and
//! charges totals repeat once per card on the account and are summed.

use log::{debug, warn};
use regex::Regex;
use rust_decimal::Decimal;
use stmt_core::{StatementAnchor, Transaction, parse_amount, resolve_date};

use crate::error::StatementError;
use crate::parsers::sum_summary_amounts;
use crate::types::{AggregateFigures, Extraction, IssuerVariant};

const ISSUER: IssuerVariant = IssuerVariant::Cibc;

/// Descriptions that mark a payment to the card.
const PAYMENT_LINE: &str = r"(?i)PAYMENT\s+THANK\s+YOU|SCOTIABANK\s+PAYMENT";

/// Parse extracted statement text into CIBC transactions and summary totals.
///
/// Without a statement period the statement yields no transactions and no
/// aggregates (a warning is logged).
pub fn parse_cibc_text(text: &str) -> Result<Extraction, StatementError> {
    let period_re = Regex::new(concat!(
        r"(?i)Statement period[ \t]+[a-z]{3}[a-z]*\.?[ \t]+\d{1,2},?(?:[ \t]+\d{4})?",
        r"[ \t]+(?:to|-)[ \t]+(?P<month>[a-z]{3})[a-z]*\.?[ \t]+\d{1,2},[ \t]+(?P<year>\d{4})"
    ))?;
    // TRANS-DATE  [POST-DATE]  DESCRIPTION  [-][$]AMOUNT
    let txn_re = Regex::new(concat!(
        r"^[ \t]*(?P<date>[A-Z][a-z]{2}[ \t]+\d{1,2})[ \t]+",
        r"(?:[A-Z][a-z]{2}[ \t]+\d{1,2}[ \t]+)?",
        r"(?P<desc>.+?)[ \t]+",
        r"(?P<polarity>-)?\$?(?P<amt>\d{1,3}(?:,\d{3})*\.\d{2})[ \t]*$"
    ))?;
    let continuation_re = Regex::new(r"^[ \t]+(?P<text>\S.*?)[ \t]*$")?;
    let not_description_re = Regex::new(r"(?i)^[ \t]*(?:total|page|trans)\b")?;
    let amount_re = Regex::new(r"\d[\d,]*\.\d{2}")?;
    let payment_re = Regex::new(PAYMENT_LINE)?;
    let credits_re = Regex::new(r"(?i)Total credits[ \t]+-?\$?([\d,]+\.\d{2})")?;
    let charges_re = Regex::new(r"(?i)Total charges[ \t]+\+?\$?([\d,]+\.\d{2})")?;

    let Some(caps) = period_re.captures(text) else {
        warn!("CIBC statement has no statement period; no transactions extracted");
        return Ok(Extraction::empty(ISSUER));
    };
    let year: i32 = caps["year"].parse().map_err(|_| missing("statement period"))?;
    let anchor =
        StatementAnchor::from_tokens(&caps["month"], year).ok_or_else(|| missing("statement period"))?;

    let mut transactions: Vec<Transaction> = Vec::new();
    // True while the last row can still receive wrapped description lines.
    let mut row_open = false;

    for line in text.lines() {
        if let Some(caps) = txn_re.captures(line) {
            let date = resolve_date(anchor, &caps["date"])?;
            let desc = caps["desc"].trim();
            let mut amount = parse_amount(&caps["amt"], caps.name("polarity").is_some())?;
            if payment_re.is_match(desc) {
                amount = -amount.abs();
            }

            transactions.push(Transaction::new(date, desc, amount));
            row_open = true;
            continue;
        }

        if !row_open {
            continue;
        }

        match continuation_re.captures(line) {
            Some(caps) if !not_description_re.is_match(line) => {
                // Foreign-currency notes carry amounts; skip them, keep the row open.
                if amount_re.is_match(line) {
                    continue;
                }
                if let Some(last) = transactions.last_mut() {
                    last.item.push(' ');
                    last.item.push_str(&caps["text"]);
                }
            }
            _ => row_open = false,
        }
    }

    let total_credits = sum_summary_amounts(&credits_re, text)?;
    let total_charges = sum_summary_amounts(&charges_re, text)?;
    if total_credits.is_none() && total_charges.is_none() {
        return Err(missing("credit and charge totals"));
    }

    debug!(
        "CIBC {:04}-{:02}: {} rows",
        anchor.year,
        anchor.month,
        transactions.len()
    );

    Ok(Extraction {
        issuer: ISSUER,
        transactions,
        aggregates: AggregateFigures::Cibc {
            total_credits: total_credits.unwrap_or(Decimal::ZERO),
            total_charges: total_charges.unwrap_or(Decimal::ZERO),
        },
        id_sequence_present: false,
    })
}

fn missing(anchor: &'static str) -> StatementError {
    StatementError::MissingRequiredAnchor {
        issuer: ISSUER,
        anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    const STATEMENT: &str = r#"
CIBC Dividend Visa Infinite Card
Statement period    December 16, 2023 to January 15, 2024

Your payments
Trans     Post
date      date      Description                                        Amount($)
Dec 20    Dec 21    PAYMENT THANK YOU/PAIEMENT MERCI                   500.00
Total payments                                                        $500.00

Your new charges and credits
Trans     Post
date      date      Description                                        Amount($)
Dec 18    Dec 19    AMAZON.CA AMAZON.CA ON                              45.67
Dec 28    Dec 29    UNITED AIRLINES HOUSTON TX                         462.00
                      340.00 USD @ 1.358823529
Jan 3     Jan 4     SHOPPERS DRUG MART #1234                            18.40
                      TORONTO ON
Jan 8     Jan 9     RETURN - AMAZON.CA                                 -20.00
Total for 4500 XXXX XXXX 1234                                          $6.07

Total credits   $520.00
Total charges   $526.07
"#;

    #[test]
    fn test_parses_rows_and_totals() {
        let ex = parse_cibc_text(STATEMENT).unwrap();
        assert_eq!(ex.transactions.len(), 5);
        assert!(!ex.id_sequence_present);
        assert_eq!(
            ex.aggregates,
            AggregateFigures::Cibc {
                total_credits: Decimal::new(52000, 2),
                total_charges: Decimal::new(52607, 2),
            }
        );
        assert!(validate(&ex).is_empty());
    }

    #[test]
    fn test_payment_is_flipped_to_credit() {
        let ex = parse_cibc_text(STATEMENT).unwrap();
        let payment = &ex.transactions[0];
        assert_eq!(payment.item, "PAYMENT THANK YOU/PAIEMENT MERCI");
        assert_eq!(payment.amount, Decimal::new(-50000, 2));
        assert_eq!(payment.iso_date(), "2023-12-20");
    }

    #[test]
    fn test_wrapped_description_is_joined() {
        let ex = parse_cibc_text(STATEMENT).unwrap();
        assert_eq!(ex.transactions[3].item, "SHOPPERS DRUG MART #1234 TORONTO ON");
        assert_eq!(ex.transactions[3].iso_date(), "2024-01-03");
    }

    #[test]
    fn test_foreign_currency_note_is_bypassed() {
        let ex = parse_cibc_text(STATEMENT).unwrap();
        assert_eq!(ex.transactions[2].item, "UNITED AIRLINES HOUSTON TX");
        assert_eq!(ex.transactions[2].amount, Decimal::new(46200, 2));
    }

    #[test]
    fn test_leading_minus_is_credit() {
        let ex = parse_cibc_text(STATEMENT).unwrap();
        assert_eq!(ex.transactions[4].amount, Decimal::new(-2000, 2));
        assert_eq!(ex.transactions[4].item, "RETURN - AMAZON.CA");
    }

    #[test]
    fn test_totals_for_several_cards_are_summed() {
        let text = format!(
            "{STATEMENT}Jan 10    Jan 11    SECOND CARD PURCHASE                10.00\n\
             Total credits   $0.00\nTotal charges   $10.00\n"
        );
        let ex = parse_cibc_text(&text).unwrap();
        assert_eq!(
            ex.aggregates,
            AggregateFigures::Cibc {
                total_credits: Decimal::new(52000, 2),
                total_charges: Decimal::new(53607, 2),
            }
        );
        assert!(validate(&ex).is_empty());
    }

    #[test]
    fn test_missing_period_yields_empty_result() {
        let text = STATEMENT.replace("Statement period", "Period");
        let ex = parse_cibc_text(&text).unwrap();
        assert!(ex.transactions.is_empty());
        assert_eq!(ex.aggregates, AggregateFigures::Unavailable);
        assert!(validate(&ex).is_empty());
    }

    #[test]
    fn test_missing_totals_is_fatal() {
        let text = STATEMENT
            .replace("Total credits", "Credits")
            .replace("Total charges", "Charges");
        let err = parse_cibc_text(&text).unwrap_err();
        assert!(matches!(err, StatementError::MissingRequiredAnchor { .. }));
    }

    #[test]
    fn test_scotiabank_payment_is_flipped_to_credit() {
        let text = STATEMENT
            .replace(
                "Total payments",
                "Jan 10    Jan 11    SCOTIABANK PAYMENT                                 100.00\nTotal payments",
            )
            .replace("Total credits   $520.00", "Total credits   $620.00");
        let ex = parse_cibc_text(&text).unwrap();
        assert_eq!(ex.transactions.len(), 6);

        let payment = &ex.transactions[1];
        assert_eq!(payment.item, "SCOTIABANK PAYMENT");
        assert_eq!(payment.amount, Decimal::new(-10000, 2));
        assert_eq!(payment.iso_date(), "2024-01-10");
        assert!(validate(&ex).is_empty());
    }
}
