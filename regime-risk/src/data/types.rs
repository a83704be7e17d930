//! Core data types for return panels.
//!
//! A panel is one shared date index plus named columns of daily log returns.
//! Missing or non-finite observations are stored as `None` and skipped by
//! every downstream calculation.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("Column {name} has {len} values but the index has {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

/// Date-indexed panel of daily log returns, one column per asset.
///
/// Duplicate dates in the index are not checked; results computed on such a
/// panel are unspecified.
#[derive(Debug, Clone, Default)]
pub struct ReturnPanel {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl ReturnPanel {
    /// Create an empty panel over the given date index.
    pub fn new(index: Vec<NaiveDate>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Build a single-column panel.
    pub fn from_series(
        name: impl Into<String>,
        index: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> Result<Self, PanelError> {
        Self::new(index).with_column(name, values)
    }

    /// Add a column of returns. NaN and infinite values are stored as missing.
    pub fn with_column(
        self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, PanelError> {
        self.with_optional_column(name, values.into_iter().map(Some).collect())
    }

    /// Add a column with explicit gaps.
    pub fn with_optional_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, PanelError> {
        let name = name.into();

        if values.len() != self.index.len() {
            return Err(PanelError::LengthMismatch {
                name,
                len: values.len(),
                expected: self.index.len(),
            });
        }
        if self.columns.iter().any(|c| c.name == name) {
            return Err(PanelError::DuplicateColumn(name));
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        self.columns.push(Column { name, values });
        Ok(self)
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Option<ReturnSeries<'_>> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| self.view(c))
    }

    /// Borrow a column by name, failing if it does not exist.
    pub fn require(&self, name: &str) -> Result<ReturnSeries<'_>, PanelError> {
        self.column(name)
            .ok_or_else(|| PanelError::MissingColumn(name.to_string()))
    }

    /// All columns in insertion order.
    pub fn series(&self) -> impl Iterator<Item = ReturnSeries<'_>> {
        self.columns.iter().map(|c| self.view(c))
    }

    fn view<'a>(&'a self, column: &'a Column) -> ReturnSeries<'a> {
        ReturnSeries {
            name: &column.name,
            index: &self.index,
            values: &column.values,
        }
    }
}

/// Borrowed view of a single panel column.
#[derive(Debug, Clone, Copy)]
pub struct ReturnSeries<'a> {
    name: &'a str,
    index: &'a [NaiveDate],
    values: &'a [Option<f64>],
}

impl<'a> ReturnSeries<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn index(&self) -> &'a [NaiveDate] {
        self.index
    }

    pub fn values(&self) -> &'a [Option<f64>] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(date, value)` pairs, including gaps.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + 'a {
        self.index.iter().copied().zip(self.values.iter().copied())
    }
}
