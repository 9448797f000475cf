//! Per-file pipeline and the concurrent batch runner.
//!
//! Every file is linearized, extracted, validated and categorized on its own
//! task; results are gathered before anything is written. One failed file
//! fails the run, but only after every file has been attempted.

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stmt_core::{Transaction, sort_by_date};
use stmt_finance::{CategoryRuleSet, categorize};
use stmt_ingest::extract_transactions;
use tokio::task::JoinSet;

use crate::config::LinearizeSection;
use crate::linearize::linearize;

/// Shared, read-only inputs for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub rules: Arc<CategoryRuleSet>,
    pub linearize: Arc<LinearizeSection>,
    /// Reject a statement that fails contiguity or checksum validation
    pub fatal_validation: bool,
}

/// Extract, validate and categorize one statement's text.
pub fn statement_to_transactions(
    text: &str,
    rules: &CategoryRuleSet,
    fatal_validation: bool,
) -> Result<Vec<Transaction>> {
    let batch = extract_transactions(text)?;
    let issuer = batch.issuer;

    let txns = if fatal_validation {
        batch.into_validated()?
    } else {
        for err in &batch.validation_errors {
            warn!("{issuer}: {err}");
        }
        batch.transactions
    };

    Ok(categorize(rules, txns))
}

pub async fn process_file(path: &Path, settings: &RunSettings) -> Result<Vec<Transaction>> {
    let inner = async {
        let text = linearize(path, &settings.linearize).await?;
        statement_to_transactions(&text, &settings.rules, settings.fatal_validation)
    };
    inner
        .await
        .with_context(|| format!("Error reading file {}", path.display()))
}

/// Regular files directly inside `dir`, sorted by name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Process all files concurrently and merge their transactions, sorted by date.
pub async fn run_batch(paths: Vec<PathBuf>, settings: RunSettings) -> Result<Vec<Transaction>> {
    let total = paths.len();
    let mut set = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let settings = settings.clone();
        set.spawn(async move {
            let result = process_file(&path, &settings).await;
            (index, path, result)
        });
    }

    let mut done: Vec<(usize, Vec<Transaction>)> = Vec::with_capacity(total);
    let mut failures = 0usize;

    while let Some(joined) = set.join_next().await {
        let (index, path, result) = joined.context("statement task panicked")?;
        match result {
            Ok(txns) => {
                info!("{}: {} transactions", path.display(), txns.len());
                done.push((index, txns));
            }
            Err(e) => {
                error!("{e:#}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {total} statement file(s) failed; no output written");
    }

    // Input order first so same-day rows from different files stay deterministic.
    done.sort_by_key(|(index, _)| *index);
    let mut all: Vec<Transaction> = done.into_iter().flat_map(|(_, txns)| txns).collect();
    sort_by_date(&mut all);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
    }

    fn settings(fatal_validation: bool) -> RunSettings {
        let rules = CategoryRuleSet::load(fixtures_dir().join("category.json")).unwrap();
        RunSettings {
            rules: Arc::new(rules),
            linearize: Arc::new(LinearizeSection::default()),
            fatal_validation,
        }
    }

    fn copy_fixture(dir: &Path, name: &str) -> PathBuf {
        let dest = dir.join(name);
        fs::copy(fixtures_dir().join(name), &dest).unwrap();
        dest
    }

    #[tokio::test]
    async fn test_directory_run_merges_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        copy_fixture(dir.path(), "scotiabank_2024-01.txt");
        copy_fixture(dir.path(), "cibc_2024-01.txt");
        copy_fixture(dir.path(), "pc_financial_2024-02.txt");

        let paths = discover_inputs(dir.path()).unwrap();
        assert_eq!(paths.len(), 3);

        let txns = run_batch(paths, settings(true)).await.unwrap();
        assert_eq!(txns.len(), 14);
        assert!(txns.windows(2).all(|w| w[0].date <= w[1].date));
        assert!(txns.iter().all(|t| t.category.is_some()));
    }

    #[tokio::test]
    async fn test_one_bad_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        copy_fixture(dir.path(), "scotiabank_2024-01.txt");
        fs::write(dir.path().join("notes.md"), "not a statement").unwrap();
        fs::write(dir.path().join("other.txt"), "Some Other Bank statement").unwrap();

        let paths = discover_inputs(dir.path()).unwrap();
        let err = run_batch(paths, settings(true)).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 of 3 statement file(s) failed; no output written"
        );
    }

    #[tokio::test]
    async fn test_file_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("mystery.txt");
        fs::write(&p, "Some Other Bank statement").unwrap();

        let err = process_file(&p, &settings(true)).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.starts_with("Error reading file"));
        assert!(msg.contains("mystery.txt"));
        assert!(msg.contains("unrecognized statement format"));
    }

    #[test]
    fn test_validation_errors_fatal_only_when_asked() {
        let text = fs::read_to_string(fixtures_dir().join("scotiabank_2024-01.txt"))
            .unwrap()
            .replace("84.12", "84.21");
        let rules = CategoryRuleSet::empty();

        let err = statement_to_transactions(&text, &rules, true).unwrap_err();
        assert!(err.to_string().contains("checksum failure"));

        let txns = statement_to_transactions(&text, &rules, false).unwrap();
        assert_eq!(txns.len(), 5);
    }
}
