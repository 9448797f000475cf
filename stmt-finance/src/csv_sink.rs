//! CSV output: one row per transaction, columns `date,item,category,amount`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use stmt_core::Transaction;

/// Output columns, in order.
pub const CSV_FIELDS: [&str; 4] = ["date", "item", "category", "amount"];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: NaiveDate,
    item: &'a str,
    category: &'a str,
    amount: Decimal,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            date: txn.date,
            item: &txn.item,
            category: txn.category.as_deref().unwrap_or(""),
            amount: txn.amount,
        }
    }
}

/// Write transactions (already in output order) as CSV, header first.
pub fn write_csv<W: Write>(writer: W, txns: &[Transaction]) -> Result<()> {
    // Header written by hand so an empty batch still gets one.
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_FIELDS)?;
    for txn in txns {
        wtr.serialize(CsvRow::from(txn))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, txns: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, txns).with_context(|| format!("write {}", path.display()))
}
