#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

static NULL: Value = Value::Null;

/// A single cell value. Untagged so constants deserialize directly from
/// TOML configuration and scalar API JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view: integers widen to f64, everything else is None.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", format_numeric(*v)),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// One table row: a field-name to value mapping. A field absent from the
/// map reads as `Null`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &Value {
        self.cells.get(field).unwrap_or(&NULL)
    }

    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).is_null()
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.cells.insert(field.into(), value);
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// An ordered sequence of rows. `columns` carries the original column
/// order; operations that do not explicitly re-order preserve row order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Appends a column if the table does not already have it. Existing
    /// rows read as `Null` for the new column.
    pub fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }
}

/// The two disjoint halves of a partitioned table. Every input row lands
/// in exactly one half; order is preserved within each.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub valid: Table,
    pub rejected: Table,
}

impl Partition {
    /// Splits `table` by a per-row predicate: rows where `keep` is true go
    /// to `valid`, the rest to `rejected`.
    pub fn split(table: Table, mut keep: impl FnMut(&Row) -> bool) -> Self {
        let mut valid = Table::new(table.columns.clone());
        let mut rejected = Table::new(table.columns);
        for row in table.rows {
            if keep(&row) {
                valid.push_row(row);
            } else {
                rejected.push_row(row);
            }
        }
        Self { valid, rejected }
    }

    /// Splits by a precomputed mask; `mask` must be as long as the table.
    pub fn split_by_mask(table: Table, mask: &[bool]) -> Self {
        debug_assert_eq!(mask.len(), table.rows.len());
        let mut valid = Table::new(table.columns.clone());
        let mut rejected = Table::new(table.columns);
        for (row, keep) in table.rows.into_iter().zip(mask) {
            if *keep {
                valid.push_row(row);
            } else {
                rejected.push_row(row);
            }
        }
        Self { valid, rejected }
    }
}
