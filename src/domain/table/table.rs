// ============================================================
// TABLE
// ============================================================
// Rows validated against one shared, ordered column set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Cell;
use crate::domain::error::{AppError, Result};

/// One row of cells, positionally aligned with [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is Null or the empty string.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

/// A fully materialized table.
///
/// Column order is fixed at construction and every row has exactly one
/// cell per column. Rows whose cells are all blank are never retained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, rejecting duplicate column names and ragged rows.
    /// Blank rows are dropped silently.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate column name: {}",
                    name
                )));
            }
        }

        let mut kept = Vec::with_capacity(rows.len());
        for cells in rows {
            if cells.len() != columns.len() {
                return Err(AppError::DimensionMismatch {
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
            let row = Row::new(cells);
            if !row.is_blank() {
                kept.push(row);
            }
        }

        Ok(Self {
            columns,
            rows: kept,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| AppError::ColumnNotFound(name.to_string()))
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Coercible numeric values of one column in row order.
    pub fn numeric_values(&self, index: usize) -> Vec<f64> {
        self.column(index).filter_map(Cell::as_number).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blank_rows_are_dropped() {
        let table = Table::new(
            columns(&["a", "b"]),
            vec![
                vec![Cell::Number(1.0), Cell::text("x")],
                vec![Cell::Null, Cell::text("")],
                vec![Cell::Null, Cell::Number(0.0)],
            ],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].get(1), Some(&Cell::Number(0.0)));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = Table::new(columns(&["a", "b"]), vec![vec![Cell::Null]]).unwrap_err();
        assert_eq!(
            err,
            AppError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let err = Table::new(columns(&["a", "a"]), Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_column_access() {
        let table = Table::new(
            columns(&["name", "sales"]),
            vec![
                vec![Cell::text("a"), Cell::Number(10.0)],
                vec![Cell::text("b"), Cell::text("oops")],
                vec![Cell::text("c"), Cell::text("5")],
            ],
        )
        .unwrap();

        assert_eq!(table.column_index("sales"), Some(1));
        assert_eq!(table.numeric_values(1), vec![10.0, 5.0]);
        assert!(matches!(
            table.require_column("missing"),
            Err(AppError::ColumnNotFound(_))
        ));
    }
}
