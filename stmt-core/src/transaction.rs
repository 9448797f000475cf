//! Transaction records recovered from a statement

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One statement line, normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date (not the posting date)
    pub date: NaiveDate,
    /// Description as printed by the issuer, trimmed
    pub item: String,
    /// Positive = purchase/charge, negative = payment/credit
    pub amount: Decimal,
    /// Filled in by the categorizer
    pub category: Option<String>,
    /// Issuer-printed sequence number, only used for contiguity checks
    #[serde(skip)]
    pub transaction_id: Option<u32>,
}

impl Transaction {
    pub fn new(date: NaiveDate, item: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            item: item.into().trim().to_string(),
            amount,
            category: None,
            transaction_id: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.transaction_id = Some(id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// ISO 8601 form of the date (YYYY-MM-DD)
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Stable sort by date; rows sharing a date keep their statement order.
pub fn sort_by_date(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| a.date.cmp(&b.date));
}
