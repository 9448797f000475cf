//! stmt-ingest: issuer detection, per-issuer statement extractors and
//! checksum/contiguity validation.

pub mod detect;
pub mod error;
pub mod parsers;
pub mod types;
pub mod validate;

pub use detect::detect_issuer;
pub use error::{StatementError, ValidationError};
pub use types::{AggregateFigures, Extraction, IssuerVariant, TransactionBatch};
pub use validate::{check_checksum, check_contiguity, validate};

/// Detect the issuer, extract its rows and aggregate figures, then validate.
///
/// Validation errors are returned inside the batch; callers decide whether
/// they are fatal (see [`TransactionBatch::into_validated`]).
pub fn extract_transactions(text: &str) -> Result<TransactionBatch, StatementError> {
    let issuer = detect_issuer(text)?;
    let extraction = issuer.extract(text)?;
    let validation_errors = validate(&extraction);

    log::debug!(
        "{}: {} transactions, {} validation errors",
        issuer,
        extraction.transactions.len(),
        validation_errors.len()
    );

    Ok(TransactionBatch {
        issuer,
        transactions: extraction.transactions,
        validation_errors,
    })
}
