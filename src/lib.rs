pub mod clean;
pub mod cli;
pub mod data;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod report;

use std::{env, fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use crate::{
    clean::{CleanOptions, CleanReport, clean},
    error::CleanError,
};
use crate::cli::Cli;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("retail_clean", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Parses the command line and runs the cleaner.
///
/// A pipeline failure is reported as a single line on stderr and is not
/// turned into an error here, so the process still exits successfully.
pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match execute(&cli) {
        Ok(report) => {
            println!(
                "Preprocessing finished. Cleaned dataset saved to: {}",
                report.output.display()
            );
        }
        Err(err) => {
            eprintln!("Preprocessing failed: {err:#}");
        }
    }
    Ok(())
}

fn execute(cli: &Cli) -> Result<CleanReport> {
    let options = CleanOptions {
        verbose: !cli.quiet,
        delimiter: cli.delimiter,
        input_encoding: cli.input_encoding.clone(),
    };
    let report = clean(&cli.input, &cli.output, &options)?;
    progress(cli, || {
        format!(
            "Wrote {} of {} row(s) ({} duplicate, {} incomplete removed)",
            report.rows_written,
            report.rows_loaded,
            report.duplicates_removed,
            report.incomplete_removed
        )
    });
    if let Some(path) = &cli.encodings {
        save_encodings(&report, path)?;
        progress(cli, || {
            format!(
                "Saved {} category mapping(s) to {:?}",
                report.encodings.len(),
                path
            )
        });
    }
    Ok(report)
}

fn progress<F>(cli: &Cli, message: F)
where
    F: FnOnce() -> String,
{
    if !cli.quiet {
        info!("{}", message());
    }
}

fn save_encodings(report: &CleanReport, path: &Path) -> Result<()> {
    io_utils::ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(&report.encodings)
        .context("Serializing category mappings")?;
    debug!("Category mappings: {json}");
    fs::write(path, json).with_context(|| format!("Writing category mappings to {path:?}"))
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
