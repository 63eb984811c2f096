//! The transaction table cleaning pipeline.
//!
//! [`clean()`] loads a delimited table, then in this order: removes repeated
//! rows, removes rows with any missing cell, converts `TransactionDate` to
//! timestamps, renames `DiscountApplied(%)`, drops `StoreLocation` and
//! `ProductID`, label-encodes `PaymentMethod` and `ProductCategory`, and writes
//! the result. Each optional stage checks for its column first and is skipped
//! when the column is absent.
//!
//! Nothing is written unless every stage before persistence succeeded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{encoding::CategoryMapping, error::CleanError, frame::Table, io_utils, report};

pub const DATE_COLUMN: &str = "TransactionDate";
pub const RENAMED_COLUMNS: &[(&str, &str)] = &[("DiscountApplied(%)", "DiscountApplied")];
pub const DROPPED_COLUMNS: &[&str] = &["StoreLocation", "ProductID"];
pub const CATEGORICAL_COLUMNS: &[&str] = &["PaymentMethod", "ProductCategory"];

#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Report stage progress before each mutation.
    pub verbose: bool,
    /// Field delimiter for both input and output; inferred from the input path when `None`.
    pub delimiter: Option<u8>,
    pub input_encoding: Option<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            delimiter: None,
            input_encoding: None,
        }
    }
}

impl CleanOptions {
    pub fn quiet() -> Self {
        Self {
            verbose: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanReport {
    pub output: PathBuf,
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub encodings: Vec<CategoryMapping>,
}

pub fn clean(input: &Path, output: &Path, options: &CleanOptions) -> Result<CleanReport> {
    if !input.exists() {
        return Err(CleanError::SourceNotFound(input.to_path_buf()).into());
    }
    let delimiter = io_utils::resolve_delimiter(input, options.delimiter);
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;

    progress(options, || format!("Reading dataset from {}", input.display()));
    let mut table = Table::load(input, delimiter, encoding)
        .with_context(|| format!("Loading {input:?}"))?;
    let rows_loaded = table.row_count();
    debug!(
        "Loaded {} row(s) across {} column(s) (delimiter '{}')",
        rows_loaded,
        table.columns.len(),
        crate::printable_delimiter(delimiter)
    );

    progress(options, || {
        let duplicates = table.duplicate_mask().into_iter().filter(|d| *d).count();
        format!("Duplicate rows before removal: {duplicates}")
    });
    let duplicates_removed = table.drop_duplicates();

    progress(options, || {
        format!(
            "Missing values before removal:\n{}",
            report::render_missing_counts(&table.missing_counts())
        )
    });
    let incomplete_removed = table.drop_incomplete();
    debug!(
        "Removed {duplicates_removed} duplicate and {incomplete_removed} incomplete row(s)"
    );

    if table.has_column(DATE_COLUMN) {
        table
            .parse_datetime_column(DATE_COLUMN)
            .with_context(|| format!("Parsing '{DATE_COLUMN}' as timestamps"))?;
        progress(options, || format!("Converted '{DATE_COLUMN}' to timestamps"));
    }

    for (from, to) in RENAMED_COLUMNS {
        if table.has_column(from) && table.rename_column(from, to)? {
            progress(options, || format!("Renamed '{from}' to '{to}'"));
        }
    }

    let present = DROPPED_COLUMNS
        .iter()
        .copied()
        .filter(|name| table.has_column(name))
        .collect::<Vec<_>>();
    if !present.is_empty() {
        let removed = table.drop_columns(&present);
        progress(options, || format!("Dropped column(s): {}", removed.join(", ")));
    }

    let mut encodings = Vec::new();
    for name in CATEGORICAL_COLUMNS {
        if !table.has_column(name) {
            continue;
        }
        let mapping = table.encode_column(name)?.mapping(name);
        progress(options, || {
            format!("Encoded '{name}' into {} code(s)", mapping.labels.len())
        });
        encodings.push(mapping);
    }

    io_utils::ensure_parent_dir(output)?;
    table
        .write(output, delimiter)
        .with_context(|| format!("Writing cleaned table to {output:?}"))?;

    Ok(CleanReport {
        output: output.to_path_buf(),
        rows_loaded,
        duplicates_removed,
        incomplete_removed,
        rows_written: table.row_count(),
        columns: table.column_names(),
        encodings,
    })
}

fn progress<F>(options: &CleanOptions, message: F)
where
    F: FnOnce() -> String,
{
    if options.verbose {
        info!("{}", message());
    }
}
