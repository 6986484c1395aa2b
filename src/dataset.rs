// =============================================================================
// Snapshot Dataset — Columnar, append-only table
// =============================================================================
//
// The profiling core never mutates a dataset in place. Every transform clones
// the table and appends derived columns, so one dataset can be shared by
// reference across the per-signal loop.
//
// Undefined float cells are NaN; undefined timestamps are `None`.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::{ProfileError, Result};

/// A single typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Text(Vec<String>),
    Timestamp(Vec<Option<NaiveDateTime>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Timestamp(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A column of `len` undefined cells of the same kind as `self`.
    fn undefined_like(&self, len: usize) -> Self {
        match self {
            Self::Float(_) => Self::Float(vec![f64::NAN; len]),
            Self::Text(_) => Self::Text(vec![String::new(); len]),
            Self::Timestamp(_) => Self::Timestamp(vec![None; len]),
        }
    }

    /// Render every cell as text; used when two archives disagree on a
    /// column's kind.
    fn into_text(self) -> Vec<String> {
        match self {
            Self::Float(v) => v
                .into_iter()
                .map(|x| if x.is_nan() { String::new() } else { x.to_string() })
                .collect(),
            Self::Text(v) => v,
            Self::Timestamp(v) => v
                .into_iter()
                .map(|t| t.map(|t| t.to_string()).unwrap_or_default())
                .collect(),
        }
    }

    fn append(self, other: Self) -> Self {
        match (self, other) {
            (Self::Float(mut a), Self::Float(b)) => {
                a.extend(b);
                Self::Float(a)
            }
            (Self::Timestamp(mut a), Self::Timestamp(b)) => {
                a.extend(b);
                Self::Timestamp(a)
            }
            (a, b) => {
                let mut text = a.into_text();
                text.extend(b.into_text());
                Self::Text(text)
            }
        }
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    order: Vec<String>,
    columns: HashMap<String, Column>,
    rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows. Zero for a dataset without columns.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Float view of a column; `None` if absent or not numeric.
    pub fn float(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name)? {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Float view of a column that the caller requires.
    pub fn require_float(&self, name: &str) -> Result<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Float(v)) => Ok(v),
            Some(_) => Err(ProfileError::missing(name, "column is not numeric")),
            None => Err(ProfileError::missing(name, "column not present in dataset")),
        }
    }

    /// Insert or replace a column. The first column fixes the row count.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.order.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(ProfileError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: column.len(),
            });
        }
        if self.columns.insert(name.clone(), column).is_none() {
            self.order.push(name);
        }
        Ok(())
    }

    /// Builder-style [`Dataset::insert`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.insert(name, column)?;
        Ok(self)
    }

    pub fn with_float(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.with_column(name, Column::Float(values))
    }

    /// Stack `other` below `self`. Columns present on only one side are
    /// padded with undefined cells; column order follows first appearance.
    pub fn concat(self, other: Dataset) -> Dataset {
        if self.order.is_empty() {
            return other;
        }
        if other.order.is_empty() {
            return self;
        }

        let top_rows = self.rows;
        let bottom_rows = other.rows;
        let mut order = self.order;
        for name in &other.order {
            if !order.contains(name) {
                order.push(name.clone());
            }
        }

        let mut top = self.columns;
        let mut bottom = other.columns;
        let mut columns = HashMap::with_capacity(order.len());
        for name in &order {
            let merged = match (top.remove(name), bottom.remove(name)) {
                (Some(a), Some(b)) => a.append(b),
                (Some(a), None) => {
                    let pad = a.undefined_like(bottom_rows);
                    a.append(pad)
                }
                (None, Some(b)) => b.undefined_like(top_rows).append(b),
                (None, None) => continue,
            };
            columns.insert(name.clone(), merged);
        }

        Dataset {
            order,
            columns,
            rows: top_rows + bottom_rows,
        }
    }
}
