//! Issuer detection by signature string.

use regex::RegexSet;

use crate::error::StatementError;
use crate::types::IssuerVariant;

/// Classify statement text. There is no default issuer: no signature, no match.
pub fn detect_issuer(text: &str) -> Result<IssuerVariant, StatementError> {
    let signatures = RegexSet::new(IssuerVariant::ALL.iter().map(|issuer| issuer.signature()))?;

    // Set indices follow `ALL`, so the lowest match is the first in detection order.
    signatures
        .matches(text)
        .iter()
        .next()
        .map(|index| IssuerVariant::ALL[index])
        .ok_or(StatementError::UnrecognizedStatementFormat)
}
