//! Category rules loaded from a JSON file, applied in definition order.
//!
//! File shape:
//! ```json
//! {
//!   "groceries": ["LOBLAWS", "METRO"],
//!   "dining": ["COFFEE", "TIM HORTONS"],
//!   "forced": [{ "item": "COFFEE SHOP", "date": "2024-01-05", "category": "gifts" }]
//! }
//! ```
//!
//! Priority: forced (item, date) override > first label with a term contained
//! in the item > "unclassified".

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use stmt_core::Transaction;

/// Label for transactions no rule matched.
pub const UNCLASSIFIED: &str = "unclassified";

/// Reserved key holding exact overrides.
const FORCED_KEY: &str = "forced";

/// Exact (item, date) override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedCategory {
    pub item: String,
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryRule {
    label: String,
    terms: Vec<String>,
}

/// Immutable for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
    forced: Vec<ForcedCategory>,
}

impl CategoryRuleSet {
    /// No rules: everything is unclassified.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a label with its match terms; earlier labels win.
    pub fn with_rule<I, S>(mut self, label: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(CategoryRule {
            label: label.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_forced(mut self, forced: ForcedCategory) -> Self {
        self.forced.push(forced);
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.label.as_str())
    }

    pub fn forced(&self) -> &[ForcedCategory] {
        &self.forced
    }

    /// Parse the JSON category file format. A missing `forced` key is fine.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let root: Map<String, Value> =
            serde_json::from_str(s).context("category file must be a JSON object")?;

        let mut set = Self::empty();
        for (label, value) in root {
            if label == FORCED_KEY {
                if !value.is_null() {
                    set.forced = serde_json::from_value(value)
                        .context("\"forced\" must be a list of {item, date, category}")?;
                }
                continue;
            }

            let Value::Array(items) = value else {
                bail!("category \"{label}\" must be a list of strings");
            };
            let mut terms = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(term) => terms.push(term),
                    other => bail!("category \"{label}\" has a non-string term: {other}"),
                }
            }
            set.rules.push(CategoryRule { label, terms });
        }

        Ok(set)
    }

    /// Load a category file; a file that does not exist yields the empty set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "No category file at {}; every transaction will be {UNCLASSIFIED}",
                path.display()
            );
            return Ok(Self::empty());
        }

        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&s).with_context(|| format!("parse {}", path.display()))
    }

    /// Category label for one transaction. Never fails.
    pub fn category_for(&self, txn: &Transaction) -> &str {
        if let Some(forced) = self
            .forced
            .iter()
            .find(|f| f.item == txn.item && f.date == txn.date)
        {
            return &forced.category;
        }

        self.rules
            .iter()
            .find(|rule| rule.terms.iter().any(|term| txn.item.contains(term.as_str())))
            .map(|rule| rule.label.as_str())
            .unwrap_or(UNCLASSIFIED)
    }
}

/// Assign a category to every transaction.
pub fn categorize(rules: &CategoryRuleSet, txns: Vec<Transaction>) -> Vec<Transaction> {
    txns.into_iter()
        .map(|mut txn| {
            txn.category = Some(rules.category_for(&txn).to_string());
            txn
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn txn(item: &str, date: &str) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(date, item, Decimal::new(450, 2))
    }

    #[test]
    fn test_forced_beats_substring_rule() {
        let rules = CategoryRuleSet::empty()
            .with_rule("dining", ["COFFEE"])
            .with_forced(ForcedCategory {
                item: "COFFEE SHOP".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                category: "gifts".to_string(),
            });

        assert_eq!(rules.category_for(&txn("COFFEE SHOP", "2024-01-05")), "gifts");
        // Same item, other day: the override does not apply.
        assert_eq!(rules.category_for(&txn("COFFEE SHOP", "2024-01-06")), "dining");
    }

    #[test]
    fn test_first_label_in_definition_order_wins() {
        let rules = CategoryRuleSet::from_json_str(
            r#"{"transport": ["ESSO", "UBER"], "dining": ["UBER EATS"], "travel": ["UBER"]}"#,
        )
        .unwrap();
        assert_eq!(rules.labels().collect::<Vec<_>>(), vec!["transport", "dining", "travel"]);
        assert_eq!(rules.category_for(&txn("UBER EATS TORONTO", "2024-01-05")), "transport");
    }

    #[test]
    fn test_unmatched_is_unclassified() {
        let rules = CategoryRuleSet::empty().with_rule("groceries", ["LOBLAWS"]);
        assert_eq!(rules.category_for(&txn("ROGERS WIRELESS", "2024-01-05")), UNCLASSIFIED);
        assert_eq!(
            CategoryRuleSet::empty().category_for(&txn("ANYTHING", "2024-01-05")),
            UNCLASSIFIED
        );
    }

    #[test]
    fn test_matching_is_case_sensitive_substring() {
        let rules = CategoryRuleSet::empty().with_rule("groceries", ["Loblaws"]);
        assert_eq!(rules.category_for(&txn("LOBLAWS #1234", "2024-01-05")), UNCLASSIFIED);
    }

    #[test]
    fn test_json_forced_list_parses() {
        let rules = CategoryRuleSet::from_json_str(
            r#"{
                "dining": ["COFFEE"],
                "forced": [{"item": "COFFEE SHOP", "date": "2024-01-05", "category": "gifts"}]
            }"#,
        )
        .unwrap();
        assert_eq!(rules.forced().len(), 1);
        assert_eq!(rules.labels().collect::<Vec<_>>(), vec!["dining"]);
        assert_eq!(rules.category_for(&txn("COFFEE SHOP", "2024-01-05")), "gifts");
    }

    #[test]
    fn test_missing_or_null_forced_is_tolerated() {
        let rules = CategoryRuleSet::from_json_str(r#"{"dining": ["COFFEE"]}"#).unwrap();
        assert!(rules.forced().is_empty());
        let rules = CategoryRuleSet::from_json_str(r#"{"forced": null}"#).unwrap();
        assert!(rules.forced().is_empty());
    }

    #[test]
    fn test_malformed_files_are_errors() {
        assert!(CategoryRuleSet::from_json_str("[]").is_err());
        assert!(CategoryRuleSet::from_json_str(r#"{"dining": "COFFEE"}"#).is_err());
        assert!(CategoryRuleSet::from_json_str(r#"{"dining": [1]}"#).is_err());
        assert!(CategoryRuleSet::from_json_str(r#"{"forced": [{"item": "X"}]}"#).is_err());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rules = CategoryRuleSet::load(dir.path().join("category.json")).unwrap();
        assert_eq!(rules, CategoryRuleSet::empty());
    }

    #[test]
    fn test_categorize_fills_every_row() {
        let rules = CategoryRuleSet::empty().with_rule("dining", ["COFFEE"]);
        let out = categorize(
            &rules,
            vec![txn("COFFEE SHOP", "2024-01-05"), txn("ROGERS", "2024-01-06")],
        );
        let cats: Vec<_> = out.iter().map(|t| t.category.as_deref()).collect();
        assert_eq!(cats, vec![Some("dining"), Some(UNCLASSIFIED)]);
    }
}
