//! Turn statement files into plain text.
//!
//! `.txt` is read as-is; `.pdf` goes through `pdftotext -layout <file> -`,
//! which keeps table columns on one line the way the extractors expect.

use anyhow::{Context, Result, bail};
use std::path::Path;
use thiserror::Error;

use crate::config::LinearizeSection;

#[derive(Debug, Error)]
pub enum LinearizeError {
    #[error("unknown file type: {0}")]
    UnknownFileType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PlainText,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, LinearizeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("txt") => Ok(SourceKind::PlainText),
            Some("pdf") => Ok(SourceKind::Pdf),
            _ => Err(LinearizeError::UnknownFileType(path.display().to_string())),
        }
    }
}

/// Read a statement file as linearized text.
pub async fn linearize(path: &Path, cfg: &LinearizeSection) -> Result<String> {
    match SourceKind::from_path(path)? {
        SourceKind::PlainText => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read {}", path.display())),
        SourceKind::Pdf => pdf_to_text(path, cfg).await,
    }
}

async fn pdf_to_text(path: &Path, cfg: &LinearizeSection) -> Result<String> {
    let bin = which::which(&cfg.pdftotext_command).with_context(|| {
        format!(
            "{} not found (install poppler-utils, or set linearize.pdftotext_command in the config)",
            cfg.pdftotext_command
        )
    })?;

    let output = tokio::process::Command::new(&bin)
        .args(&cfg.pdftotext_args)
        .arg(path)
        .arg("-")
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .with_context(|| format!("running {}", bin.display()))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            bin.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
