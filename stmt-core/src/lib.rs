//! stmt-core: transaction value type and the normalization rules shared by every
//! statement extractor.

pub mod normalize;
pub mod transaction;

pub use normalize::{NormalizeError, StatementAnchor, month_from_abbrev, parse_amount, resolve_date};
pub use transaction::{Transaction, sort_by_date};
