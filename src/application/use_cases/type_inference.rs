// ============================================================
// COLUMN TYPE INFERENCE
// ============================================================
// Whole-column predicates evaluated in a fixed precedence

use super::temporal::{cell_date, cell_time, numeric_literal};
use crate::domain::profile::{ColumnProfile, ColumnType};
use crate::domain::table::{Cell, Table};

/// Axis label used when the table has no Categorical column.
pub const FALLBACK_LABEL_COLUMN: &str = "Label";

/// One entry of the ordered rule set. The first rule whose predicate holds
/// for a column decides its type.
pub struct TypeRule {
    pub column_type: ColumnType,
    pub matches: fn(&[&Cell]) -> bool,
}

/// Date > Time > Numeric. Anything else is Categorical.
pub const TYPE_RULES: [TypeRule; 3] = [
    TypeRule {
        column_type: ColumnType::Date,
        matches: is_date_column,
    },
    TypeRule {
        column_type: ColumnType::Time,
        matches: is_time_column,
    },
    TypeRule {
        column_type: ColumnType::Numeric,
        matches: is_numeric_column,
    },
];

fn is_date_column(cells: &[&Cell]) -> bool {
    cells.iter().all(|cell| cell_date(cell).is_some())
}

fn is_time_column(cells: &[&Cell]) -> bool {
    cells.iter().all(|cell| cell_time(cell).is_some())
}

/// Every value is numeric and no text value reads as a date or a time.
fn is_numeric_column(cells: &[&Cell]) -> bool {
    let every_numeric = cells.iter().all(|cell| numeric_literal(cell).is_some());
    let any_temporal = cells
        .iter()
        .any(|cell| cell_date(cell).is_some() || cell_time(cell).is_some());
    every_numeric && !any_temporal
}

/// Classify one column's cells. An empty column is Categorical.
pub fn classify(cells: &[&Cell]) -> ColumnType {
    if cells.is_empty() {
        return ColumnType::Categorical;
    }

    TYPE_RULES
        .iter()
        .find(|rule| (rule.matches)(cells))
        .map(|rule| rule.column_type)
        .unwrap_or(ColumnType::Categorical)
}

/// Profile every column of the table, in column order.
pub fn infer_profiles(table: &Table) -> Vec<ColumnProfile> {
    let profiles: Vec<ColumnProfile> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Cell> = table.column(idx).collect();
            ColumnProfile::new(name.clone(), classify(&cells))
        })
        .collect();

    tracing::debug!(
        columns = profiles.len(),
        rows = table.row_count(),
        "Inferred column types"
    );
    profiles
}

/// First Categorical column, else the literal placeholder.
pub fn label_column(profiles: &[ColumnProfile]) -> String {
    profiles
        .iter()
        .find(|p| p.is(ColumnType::Categorical))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| FALLBACK_LABEL_COLUMN.to_string())
}
