use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_stmt2csv_home, stmt2csv_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub linearize: LinearizeSection,
    #[serde(default)]
    pub categories: CategoriesSection,
    #[serde(default)]
    pub validation: ValidationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearizeSection {
    /// Command used to turn PDF statements into text
    pub pdftotext_command: String,
    /// Arguments placed before `<file> -`
    pub pdftotext_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    /// Reject a statement when any validation error is found
    pub fatal: bool,
}

impl Default for LinearizeSection {
    fn default() -> Self {
        Self {
            pdftotext_command: "pdftotext".to_string(),
            pdftotext_args: vec!["-layout".to_string()],
        }
    }
}

impl Default for CategoriesSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./category.json"),
        }
    }
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self { fatal: true }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(stmt2csv_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_stmt2csv_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.validation.fatal);
        assert_eq!(cfg.linearize.pdftotext_args, vec!["-layout"]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[validation]\nfatal = false\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert!(!cfg.validation.fatal);
        assert_eq!(cfg.categories.file, PathBuf::from("./category.json"));
    }

    #[test]
    fn test_partial_section_keeps_default_fields() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[linearize]\npdftotext_command = \"/opt/poppler/bin/pdftotext\"\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.linearize.pdftotext_command, "/opt/poppler/bin/pdftotext");
        assert_eq!(cfg.linearize.pdftotext_args, vec!["-layout"]);
    }
}
