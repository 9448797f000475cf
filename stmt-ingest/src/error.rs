use rust_decimal::Decimal;
use stmt_core::NormalizeError;
use thiserror::Error;

use crate::types::IssuerVariant;

/// Reasons a statement cannot be turned into transactions.
#[derive(Debug, Error)]
pub enum StatementError {
    /// No issuer signature found in the text.
    #[error("unrecognized statement format")]
    UnrecognizedStatementFormat,

    /// A statement date or a summary total the issuer always prints is absent.
    #[error("{issuer} statement is missing its {anchor}")]
    MissingRequiredAnchor {
        issuer: IssuerVariant,
        anchor: &'static str,
    },

    /// The extracted rows disagree with the issuer's own figures.
    #[error("{}", join_validation_errors(.0))]
    ValidationFailure(Vec<ValidationError>),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("invalid statement pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A single consistency problem found after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("transaction ids {previous} and {next} are not contiguous")]
    NonContiguous { previous: u32, next: u32 },

    #[error("checksum failure: residual {residual}")]
    Checksum { residual: Decimal },
}

fn join_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
