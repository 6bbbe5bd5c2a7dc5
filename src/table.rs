//! In-memory tabular data.
//!
//! A [`Table`] is an ordered set of named columns with a uniform row count.
//! Each column stores its cells in a single contiguous `Vec`, one arena per
//! column, with missing cells as `None`. The transform pipeline treats tables
//! as values: every stage receives a table by reference and produces a new
//! one, so a caller-held table is never mutated behind its back.

use chrono::{DateTime, Utc};
use std::fmt;

/// Errors returned when building or reshaping a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A column's length does not match the table's row count.
    LengthMismatch {
        /// Offending column name.
        column: String,
        /// Length the table requires.
        expected: usize,
        /// Length the column actually has.
        actual: usize,
    },
    /// Two columns share the same name.
    DuplicateColumn(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{column}' has {actual} rows, expected {expected}"
            ),
            Self::DuplicateColumn(name) => write!(f, "duplicate column name '{name}'"),
        }
    }
}

impl std::error::Error for TableError {}

/// The broad kind of data a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Floating point numbers.
    Number,
    /// Free-form text.
    Text,
    /// Instants in time (epoch milliseconds, UTC).
    Timestamp,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Text => write!(f, "text"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Columnar cell storage: one homogeneous vector per column.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Numeric cells.
    Number(Vec<Option<f64>>),
    /// Text cells.
    Text(Vec<Option<String>>),
    /// Temporal cells as epoch milliseconds (UTC).
    Timestamp(Vec<Option<i64>>),
}

impl Values {
    /// Number of cells (present or missing).
    pub fn len(&self) -> usize {
        match self {
            Self::Number(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Timestamp(v) => v.len(),
        }
    }

    /// True if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The kind of data stored.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Number(_) => ColumnKind::Number,
            Self::Text(_) => ColumnKind::Text,
            Self::Timestamp(_) => ColumnKind::Timestamp,
        }
    }

    /// Keeps only the cells whose mask entry is `true`.
    ///
    /// The mask must be at least as long as the column; extra entries are
    /// ignored.
    pub fn filtered(&self, mask: &[bool]) -> Self {
        fn keep<T: Clone>(cells: &[Option<T>], mask: &[bool]) -> Vec<Option<T>> {
            cells
                .iter()
                .zip(mask)
                .filter_map(|(cell, &keep)| keep.then(|| cell.clone()))
                .collect()
        }
        match self {
            Self::Number(v) => Self::Number(keep(v, mask)),
            Self::Text(v) => Self::Text(keep(v, mask)),
            Self::Timestamp(v) => Self::Timestamp(keep(v, mask)),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Cell storage.
    pub values: Values,
}

impl Column {
    /// Creates a numeric column.
    pub fn number(name: impl Into<String>, cells: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: Values::Number(cells),
        }
    }

    /// Creates a numeric column with every cell present.
    pub fn number_dense(name: impl Into<String>, cells: impl IntoIterator<Item = f64>) -> Self {
        Self::number(name, cells.into_iter().map(Some).collect())
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: Values::Text(cells),
        }
    }

    /// Creates a timestamp column from epoch milliseconds.
    pub fn timestamp(name: impl Into<String>, cells: Vec<Option<i64>>) -> Self {
        Self {
            name: name.into(),
            values: Values::Timestamp(cells),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The kind of data stored.
    pub fn kind(&self) -> ColumnKind {
        self.values.kind()
    }

    /// Numeric cells, if this is a number column.
    pub fn as_number(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            Values::Number(v) => Some(v),
            _ => None,
        }
    }

    /// Text cells, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.values {
            Values::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Timestamp cells, if this is a timestamp column.
    pub fn as_timestamp(&self) -> Option<&[Option<i64>]> {
        match &self.values {
            Values::Timestamp(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered collection of named columns with a uniform row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, checking uniform length and unique names.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for col in &columns {
                if col.len() != expected {
                    return Err(TableError::LengthMismatch {
                        column: col.name.clone(),
                        expected,
                        actual: col.len(),
                    });
                }
            }
        }
        for (i, col) in columns.iter().enumerate() {
            if columns
                .iter()
                .take(i)
                .any(|earlier| earlier.name == col.name)
            {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if the table holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in display order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns a new table with `column` replacing an existing column of the
    /// same name, or appended at the end otherwise.
    pub fn with_column(&self, column: Column) -> Result<Self, TableError> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(TableError::LengthMismatch {
                column: column.name,
                expected: self.n_rows(),
                actual: column.values.len(),
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter().position(|c| c.name == column.name) {
            Some(idx) => columns[idx] = column,
            None => columns.push(column),
        }
        Ok(Self { columns })
    }

    /// Returns a new table keeping only the rows whose mask entry is `true`.
    ///
    /// The mask must cover every row; extra entries are ignored.
    pub fn filter_rows(&self, mask: &[bool]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c.values.filtered(mask),
            })
            .collect();
        Self { columns }
    }
}

/// Formats an epoch-millisecond timestamp as RFC 3339 (UTC).
///
/// Falls back to the raw number when the value is out of chrono's range.
pub fn format_timestamp(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map_or_else(|| ms.to_string(), |dt| dt.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::number_dense("A", [1.0, 2.0, 3.0]),
            Column::text(
                "label",
                vec![Some("x".to_owned()), None, Some("z".to_owned())],
            ),
        ])
        .expect("uniform columns")
    }

    #[test]
    fn test_row_and_column_counts() {
        let t = sample();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_columns(), 2);
        assert!(t.has_column("A"));
        assert!(!t.has_column("B"));
    }

    #[test]
    fn test_from_columns_rejects_ragged_input() {
        let err = Table::from_columns(vec![
            Column::number_dense("A", [1.0, 2.0]),
            Column::number_dense("B", [1.0]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                column: "B".to_owned(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let err = Table::from_columns(vec![
            Column::number_dense("A", [1.0]),
            Column::number_dense("A", [2.0]),
        ])
        .unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("A".to_owned()));
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let t = sample();
        let t2 = t
            .with_column(Column::number_dense("A", [9.0, 8.0, 7.0]))
            .expect("same length");
        assert_eq!(t2.n_columns(), 2);
        assert_eq!(
            t2.column("A").and_then(Column::as_number),
            Some([Some(9.0), Some(8.0), Some(7.0)].as_slice())
        );
        // Original untouched
        assert_eq!(
            t.column("A").and_then(Column::as_number),
            Some([Some(1.0), Some(2.0), Some(3.0)].as_slice())
        );
    }

    #[test]
    fn test_filter_rows() {
        let t = sample();
        let kept = t.filter_rows(&[true, false, true]);
        assert_eq!(kept.n_rows(), 2);
        assert_eq!(
            kept.column("A").and_then(Column::as_number),
            Some([Some(1.0), Some(3.0)].as_slice())
        );
        assert_eq!(
            kept.column("label").and_then(Column::as_text),
            Some([Some("x".to_owned()), Some("z".to_owned())].as_slice())
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }
}
