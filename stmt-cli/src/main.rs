use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use stmt_finance::{CategoryRuleSet, write_csv_file};
use stmt_ingest::{detect_issuer, validate};

mod batch;
mod config;
mod linearize;
mod state;

use batch::{RunSettings, discover_inputs, run_batch};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("STMT2CSV_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "stmt2csv",
    version = VERSION,
    about = "Extract validated, categorized transactions from credit card statements"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one statement, or every statement in a directory, to CSV
    Convert {
        /// Single statement file (.pdf or .txt)
        #[arg(long, conflicts_with = "in_directory", required_unless_present = "in_directory")]
        in_file: Option<PathBuf>,

        /// Directory of statement files, processed concurrently
        #[arg(long)]
        in_directory: Option<PathBuf>,

        /// CSV file to write
        #[arg(long)]
        out_file: PathBuf,

        /// Category rules (JSON); defaults to categories.file from the config
        #[arg(long)]
        category_file: Option<PathBuf>,

        /// Keep statements whose checksum or id sequence does not reconcile
        #[arg(long)]
        allow_validation_errors: bool,
    },

    /// Show what would be extracted from one statement, without categorizing
    Inspect {
        /// Statement file (.pdf or .txt)
        file: PathBuf,
    },

    /// Write a default config to ~/.stmt2csv/config.toml
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            in_file,
            in_directory,
            out_file,
            category_file,
            allow_validation_errors,
        } => {
            let cfg = config::load_config()?;

            let paths = match (in_file, in_directory) {
                (Some(file), _) => vec![file],
                (None, Some(dir)) => discover_inputs(&dir)?,
                (None, None) => bail!("--in-file or --in-directory must be specified"),
            };
            if paths.is_empty() {
                bail!("no statement files found");
            }

            let category_file = category_file.unwrap_or(cfg.categories.file);
            let rules = CategoryRuleSet::load(&category_file)
                .with_context(|| format!("loading categories from {}", category_file.display()))?;

            let settings = RunSettings {
                rules: Arc::new(rules),
                linearize: Arc::new(cfg.linearize),
                fatal_validation: cfg.validation.fatal && !allow_validation_errors,
            };

            let txns = run_batch(paths, settings).await?;
            write_csv_file(&out_file, &txns)?;
            info!(
                "Successfully wrote {} transactions to {}",
                txns.len(),
                out_file.display()
            );
        }

        Command::Inspect { file } => {
            inspect(file).await?;
        }

        Command::InitConfig => {
            config::init_config()?;
        }
    }

    Ok(())
}

async fn inspect(file: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let text = linearize::linearize(&file, &cfg.linearize).await?;

    let issuer = detect_issuer(&text)?;
    let extraction = issuer
        .extract(&text)
        .with_context(|| format!("extracting {}", file.display()))?;
    let errors = validate(&extraction);

    println!("Issuer: {issuer}");
    println!("Transactions: {}\n", extraction.transactions.len());
    for t in &extraction.transactions {
        let id = t
            .transaction_id
            .map(|id| format!("{id:03} "))
            .unwrap_or_default();
        println!("{id}{} {:>12} {}", t.iso_date(), t.amount, t.item);
    }

    println!("\nAggregates: {:?}", extraction.aggregates);
    if let Some(expected) = extraction.aggregates.expected_total() {
        println!("Expected total: {expected}");
    }

    if errors.is_empty() {
        println!("Validation: ok");
    } else {
        println!("Validation: {} error(s)", errors.len());
        for e in &errors {
            println!("- {e}");
        }
    }

    Ok(())
}
