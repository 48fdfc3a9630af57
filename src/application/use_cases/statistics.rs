use std::collections::HashMap;

use crate::domain::analytics::{Analysis, ColumnAnalysis, DescriptiveStats};
use crate::domain::error::Result;
use crate::domain::profile::{columns_of_type, ColumnProfile, ColumnType};
use crate::domain::table::Table;

/// Round half away from zero to 2 decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean, median, mode and extrema over the column's coercible values.
pub fn describe(table: &Table, column: &str) -> Result<Analysis<DescriptiveStats>> {
    let idx = table.require_column(column)?;
    let values = table.numeric_values(idx);
    Ok(Analysis::require(1, values.len(), || describe_values(&values)))
}

/// Stats for every Numeric column, in profile order.
pub fn describe_all(
    table: &Table,
    profiles: &[ColumnProfile],
) -> Result<Vec<ColumnAnalysis<DescriptiveStats>>> {
    columns_of_type(profiles, ColumnType::Numeric)
        .into_iter()
        .map(|name| Ok(ColumnAnalysis::new(name, describe(table, name)?)))
        .collect()
}

/// `values` must be non-empty.
fn describe_values(values: &[f64]) -> DescriptiveStats {
    let count = values.len() as f64;
    let mean = round2(values.iter().sum::<f64>() / count);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        round2((sorted[mid - 1] + sorted[mid]) / 2.0)
    };

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    DescriptiveStats {
        mean,
        median,
        mode: mode(values),
        min,
        max,
    }
}

/// Most frequent value; the first value to reach the top count wins ties.
fn mode(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut best = values[0];
    let mut best_count = 0usize;

    for &value in values {
        // 0.0 and -0.0 are the same value
        let key = if value == 0.0 { 0f64.to_bits() } else { value.to_bits() };
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = value;
        }
    }

    best
}
