//! In-memory table the cleaning pipeline mutates stage by stage.
//!
//! A [`Table`] owns an ordered list of [`Column`]s and row-major cells. Every
//! row has exactly one cell per column; a cell is `None` when the source held a
//! missing-value token. Rows are only ever removed wholesale.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Timelike;
use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::{ColumnType, Value, parse_datetime, parse_typed_value},
    encoding::LabelEncoder,
    io_utils,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
}

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Reads a delimited file with a header row, inferring one type per column.
    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(path, delimiter)?;
        let header_record = reader
            .byte_headers()
            .with_context(|| format!("Reading header row of {path:?}"))?
            .clone();
        let headers = io_utils::decode_record(&header_record, encoding)
            .context("Decoding header row")?;

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {}", idx + 2))?;
            raw_rows.push(decoded);
        }
        Self::from_raw(headers, raw_rows)
    }

    /// Builds a typed table from header names and textual rows.
    pub fn from_raw(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            bail!("No columns to parse from input");
        }
        let mut seen = HashSet::new();
        for name in &headers {
            if !seen.insert(name.as_str()) {
                bail!("Duplicate column name '{name}' in header row");
            }
        }
        if let Some((idx, row)) = raw_rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            bail!(
                "Row {} has {} field(s) but the header declares {}",
                idx + 2,
                row.len(),
                headers.len()
            );
        }

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let datatype = ColumnType::infer(raw_rows.iter().map(|row| row[idx].as_str()));
                debug!("Column '{name}' inferred as {datatype}");
                Column { name, datatype }
            })
            .collect::<Vec<_>>();

        let rows = raw_rows
            .iter()
            .enumerate()
            .map(|(row_idx, raw)| {
                columns
                    .iter()
                    .zip(raw)
                    .map(|(column, cell)| {
                        parse_typed_value(cell, column.datatype).with_context(|| {
                            format!("Row {} column '{}'", row_idx + 2, column.name)
                        })
                    })
                    .collect::<Result<Row>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Flags every row that repeats an earlier row across all columns.
    pub fn duplicate_mask(&self) -> Vec<bool> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.rows
            .iter()
            .map(|row| !seen.insert(row_key(row)))
            .collect()
    }

    /// Removes repeated rows, keeping first occurrences; returns how many went.
    pub fn drop_duplicates(&mut self) -> usize {
        let mask = self.duplicate_mask();
        let before = self.rows.len();
        let mut flags = mask.into_iter();
        self.rows.retain(|_| !flags.next().unwrap_or(false));
        before - self.rows.len()
    }

    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let count = self.rows.iter().filter(|row| row[idx].is_none()).count();
                (column.name.clone(), count)
            })
            .collect()
    }

    /// Removes every row holding a missing cell in any column.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.iter().all(Option::is_some));
        before - self.rows.len()
    }

    /// Converts a column to timestamps; any unparsable cell aborts the conversion.
    pub fn parse_datetime_column(&mut self, name: &str) -> Result<()> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| anyhow!("Column '{name}' not found"))?;
        let mut converted = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let cell = match &row[idx] {
                Some(Value::DateTime(dt)) => Some(Value::DateTime(*dt)),
                Some(other) => {
                    let text = other.as_display();
                    let parsed = parse_datetime(&text).with_context(|| {
                        format!("Converting column '{name}' in data row {}", row_idx + 1)
                    })?;
                    Some(Value::DateTime(parsed))
                }
                None => None,
            };
            converted.push(cell);
        }
        for (row, cell) in self.rows.iter_mut().zip(converted) {
            row[idx] = cell;
        }
        self.columns[idx].datatype = ColumnType::DateTime;
        Ok(())
    }

    /// Renames `from` to `to`; returns `false` when `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<bool> {
        let Some(idx) = self.column_index(from) else {
            return Ok(false);
        };
        if from != to && self.has_column(to) {
            bail!("Cannot rename '{from}' to '{to}': column already exists");
        }
        self.columns[idx].name = to.to_string();
        Ok(true)
    }

    /// Removes the named columns that exist; returns the names actually removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let doomed = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| names.contains(&column.name.as_str()))
            .map(|(idx, _)| idx)
            .collect::<HashSet<_>>();
        if doomed.is_empty() {
            return Vec::new();
        }
        let keep = |idx: &usize| !doomed.contains(idx);
        let mut removed = Vec::with_capacity(doomed.len());
        let columns = std::mem::take(&mut self.columns);
        for (idx, column) in columns.into_iter().enumerate() {
            if keep(&idx) {
                self.columns.push(column);
            } else {
                removed.push(column.name);
            }
        }
        for row in &mut self.rows {
            let cells = std::mem::take(row);
            *row = cells
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| keep(idx))
                .map(|(_, cell)| cell)
                .collect();
        }
        removed
    }

    /// Replaces a column's labels with integer codes fitted on its current values.
    pub fn encode_column(&mut self, name: &str) -> Result<LabelEncoder> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| anyhow!("Column '{name}' not found"))?;
        let encoder = LabelEncoder::fit(self.rows.iter().filter_map(|row| row[idx].as_ref()));
        for row in &mut self.rows {
            if let Some(label) = row[idx].take() {
                let code = encoder
                    .transform(&label)
                    .with_context(|| format!("Encoding column '{name}'"))?;
                row[idx] = Some(Value::Integer(code));
            }
        }
        self.columns[idx].datatype = ColumnType::Integer;
        Ok(encoder)
    }

    /// Writes the header row and every data row; no row index is emitted.
    pub fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let date_only = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                column.datatype == ColumnType::DateTime
                    && self.rows.iter().all(|row| match &row[idx] {
                        Some(Value::DateTime(dt)) => dt.num_seconds_from_midnight() == 0
                            && dt.nanosecond() == 0,
                        _ => true,
                    })
            })
            .collect::<Vec<_>>();

        let mut writer = io_utils::open_csv_writer(path, delimiter)?;
        writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .context("Writing output headers")?;
        for (idx, row) in self.rows.iter().enumerate() {
            let fields = row
                .iter()
                .zip(&date_only)
                .map(|(cell, date_only)| render_cell(cell.as_ref(), *date_only));
            writer
                .write_record(fields)
                .with_context(|| format!("Writing output row {}", idx + 2))?;
        }
        writer.flush().context("Flushing output writer")?;
        Ok(())
    }
}

fn render_cell(cell: Option<&Value>, date_only: bool) -> String {
    match cell {
        None => String::new(),
        Some(Value::DateTime(dt)) if date_only => dt.format("%Y-%m-%d").to_string(),
        Some(value) => value.as_display(),
    }
}

fn row_key(row: &Row) -> Vec<Option<String>> {
    row.iter()
        .map(|cell| cell.as_ref().map(Value::as_display))
        .collect()
}
