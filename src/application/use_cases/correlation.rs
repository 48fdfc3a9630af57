use crate::domain::analytics::{Analysis, CorrelationMatrix};
use crate::domain::profile::{columns_of_type, ColumnProfile, ColumnType};
use crate::domain::table::Table;

use super::statistics::round2;

/// Pairwise Pearson coefficients over the Numeric columns.
///
/// Each pair uses the rows where both cells are coercible. A zero
/// denominator yields 0.
pub fn correlation_matrix(table: &Table, profiles: &[ColumnProfile]) -> Analysis<CorrelationMatrix> {
    let columns: Vec<(String, usize)> = columns_of_type(profiles, ColumnType::Numeric)
        .into_iter()
        .filter_map(|name| table.column_index(name).map(|idx| (name.to_string(), idx)))
        .collect();

    Analysis::require(2, columns.len(), || {
        let values = columns
            .iter()
            .map(|(_, x)| {
                columns
                    .iter()
                    .map(|(_, y)| round2(pearson(&paired_values(table, *x, *y))))
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            columns: columns.iter().map(|(name, _)| name.clone()).collect(),
            values,
        }
    })
}

fn paired_values(table: &Table, x: usize, y: usize) -> Vec<(f64, f64)> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let a = row.get(x)?.as_number()?;
            let b = row.get(y)?.as_number()?;
            Some((a, b))
        })
        .collect()
}

/// Unrounded coefficient; 0 when either side has no variance.
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}
