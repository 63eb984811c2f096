//! Label encoding for categorical columns.
//!
//! A [`LabelEncoder`] is fitted on the values currently present in a column:
//! distinct labels are sorted ascending and assigned dense codes `0..k`. The
//! fitted mapping is scoped to a single run; callers that need stable codes
//! across inputs must keep the returned [`CategoryMapping`] and reuse it.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use itertools::Itertools;
use serde::Serialize;

use crate::data::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<Value>,
    codes: BTreeMap<Value, i64>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let classes = values.into_iter().cloned().sorted().dedup().collect_vec();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code as i64))
            .collect();
        Self { classes, codes }
    }

    pub fn code(&self, label: &Value) -> Option<i64> {
        self.codes.get(label).copied()
    }

    pub fn transform(&self, label: &Value) -> Result<i64> {
        self.code(label)
            .ok_or_else(|| anyhow!("Label '{label}' was not seen while fitting the encoder"))
    }

    pub fn inverse(&self, code: i64) -> Option<&Value> {
        usize::try_from(code).ok().and_then(|idx| self.classes.get(idx))
    }

    pub fn mapping(&self, column: &str) -> CategoryMapping {
        CategoryMapping {
            column: column.to_string(),
            labels: self.classes.iter().map(Value::as_display).collect(),
        }
    }
}

/// Label-to-code table for one encoded column; `labels[code]` is the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMapping {
    pub column: String,
    pub labels: Vec<String>,
}

impl CategoryMapping {
    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }

    pub fn label_of(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }
}
