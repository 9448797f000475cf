use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use stmt_core::Transaction;

use crate::error::{StatementError, ValidationError};
use crate::parsers;

/// Closed set of supported statement layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuerVariant {
    Scotiabank,
    Cibc,
    PcFinancial,
}

impl IssuerVariant {
    /// Detection order; first matching signature wins.
    pub const ALL: [IssuerVariant; 3] = [
        IssuerVariant::Scotiabank,
        IssuerVariant::Cibc,
        IssuerVariant::PcFinancial,
    ];

    /// Case-insensitive signature, matched within a single line.
    pub fn signature(&self) -> &'static str {
        match self {
            IssuerVariant::Scotiabank => r"(?i)scotia.*visa.*card",
            IssuerVariant::Cibc => r"(?i)\bCIBC\b.*\b(?:visa|mastercard)\b",
            IssuerVariant::PcFinancial => r"(?i)PC\s*Financial.*mastercard",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IssuerVariant::Scotiabank => "Scotiabank",
            IssuerVariant::Cibc => "CIBC",
            IssuerVariant::PcFinancial => "PC Financial",
        }
    }

    /// Run this issuer's extractor over the statement text.
    pub fn extract(&self, text: &str) -> Result<Extraction, StatementError> {
        match self {
            IssuerVariant::Scotiabank => parsers::scotiabank::parse_scotiabank_text(text),
            IssuerVariant::Cibc => parsers::cibc::parse_cibc_text(text),
            IssuerVariant::PcFinancial => parsers::pc_financial::parse_pc_financial_text(text),
        }
    }
}

impl fmt::Display for IssuerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary figures printed by the issuer, used only for checksum validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFigures {
    /// Nothing to reconcile against (e.g. a CIBC statement with no period label).
    Unavailable,
    Scotiabank {
        payments_credits: Decimal,
        purchases_charges: Decimal,
    },
    Cibc {
        total_credits: Decimal,
        total_charges: Decimal,
    },
    PcFinancial {
        previous_balance: Decimal,
        payments: Decimal,
        new_balance: Decimal,
    },
}

impl AggregateFigures {
    /// What the extracted amounts should sum to, per the issuer's own totals.
    pub fn expected_total(&self) -> Option<Decimal> {
        match *self {
            AggregateFigures::Unavailable => None,
            AggregateFigures::Scotiabank {
                payments_credits,
                purchases_charges,
            } => Some(purchases_charges - payments_credits),
            AggregateFigures::Cibc {
                total_credits,
                total_charges,
            } => Some(total_charges - total_credits),
            AggregateFigures::PcFinancial {
                previous_balance,
                payments,
                new_balance,
            } => Some(new_balance - previous_balance + payments),
        }
    }
}

/// Raw output of one issuer extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub issuer: IssuerVariant,
    /// Statement order
    pub transactions: Vec<Transaction>,
    pub aggregates: AggregateFigures,
    /// True when rows carry issuer sequence ids
    pub id_sequence_present: bool,
}

impl Extraction {
    pub(crate) fn empty(issuer: IssuerVariant) -> Self {
        Self {
            issuer,
            transactions: Vec::new(),
            aggregates: AggregateFigures::Unavailable,
            id_sequence_present: false,
        }
    }
}

/// Extracted transactions plus whatever validation found.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBatch {
    pub issuer: IssuerVariant,
    pub transactions: Vec<Transaction>,
    pub validation_errors: Vec<ValidationError>,
}

impl TransactionBatch {
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Treat any validation error as fatal for this statement.
    pub fn into_validated(self) -> Result<Vec<Transaction>, StatementError> {
        if self.validation_errors.is_empty() {
            Ok(self.transactions)
        } else {
            Err(StatementError::ValidationFailure(self.validation_errors))
        }
    }
}
