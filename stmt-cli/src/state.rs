use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$STMT2CSV_HOME`, or `~/.stmt2csv`.
pub fn stmt2csv_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STMT2CSV_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".stmt2csv"))
}

pub fn ensure_stmt2csv_home() -> Result<PathBuf> {
    let dir = stmt2csv_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
