//! stmt-finance: category rules and CSV output for extracted transactions

pub mod category_rules;
pub mod csv_sink;

pub use category_rules::{CategoryRuleSet, ForcedCategory, UNCLASSIFIED, categorize};
pub use csv_sink::{CSV_FIELDS, write_csv, write_csv_file};
