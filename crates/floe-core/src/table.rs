use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Observed type of a result-set column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Datetime,
    Text,
    Other,
}

/// One named, typed column with its rendered values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Number of distinct values in this column.
    pub fn distinct_count(&self) -> usize {
        self.values.iter().collect::<HashSet<_>>().len()
    }
}

/// A query result set: an ordered sequence of named columns.
///
/// Produced by warehouse query execution and consumed read-only by the chart
/// selector. Column order is the result set's original left-to-right order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<Column>,
}

impl TabularResult {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.columns.iter().all(|c| c.values.is_empty())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }
}
