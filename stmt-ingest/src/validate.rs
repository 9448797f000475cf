//! Statement self-checks: sequence id contiguity and checksum reconciliation.
//!
//! Errors are collected, never short-circuited.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::Extraction;

/// Largest residual accepted between issuer totals and the extracted rows.
pub const CHECKSUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Run every check that applies to this extraction.
pub fn validate(extraction: &Extraction) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if extraction.id_sequence_present {
        let ids: Vec<u32> = extraction
            .transactions
            .iter()
            .filter_map(|t| t.transaction_id)
            .collect();
        errors.extend(check_contiguity(&ids));
    }

    if let Some(expected) = extraction.aggregates.expected_total() {
        let amounts: Vec<Decimal> = extraction.transactions.iter().map(|t| t.amount).collect();
        errors.extend(check_checksum(expected, &amounts));
    }

    errors
}

/// One error per adjacent pair that does not step by exactly +1.
pub fn check_contiguity(ids: &[u32]) -> Vec<ValidationError> {
    ids.windows(2)
        .filter(|pair| pair[0].checked_add(1) != Some(pair[1]))
        .map(|pair| ValidationError::NonContiguous {
            previous: pair[0],
            next: pair[1],
        })
        .collect()
}

/// `expected - sum(amounts)` must be within one cent.
pub fn check_checksum(expected: Decimal, amounts: &[Decimal]) -> Option<ValidationError> {
    let residual = amounts.iter().fold(expected, |acc, amount| acc - *amount);

    if residual.abs() > CHECKSUM_TOLERANCE {
        Some(ValidationError::Checksum { residual })
    } else {
        None
    }
}
