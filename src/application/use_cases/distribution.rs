use crate::domain::analytics::{Analysis, BoxPlotStats, ColumnAnalysis, HistogramBucket};
use crate::domain::error::Result;
use crate::domain::profile::{columns_of_type, ColumnProfile, ColumnType};
use crate::domain::table::Table;

pub const MIN_BOX_PLOT_VALUES: usize = 5;
pub const HISTOGRAM_BUCKET_WIDTH: f64 = 10.0;

/// Nearest-rank quartiles with whiskers clipped to the Tukey fences.
pub fn box_plot(table: &Table, column: &str) -> Result<Analysis<BoxPlotStats>> {
    let idx = table.require_column(column)?;
    let values = table.numeric_values(idx);
    Ok(Analysis::require(MIN_BOX_PLOT_VALUES, values.len(), || {
        box_plot_values(values)
    }))
}

fn box_plot_values(mut values: Vec<f64>) -> BoxPlotStats {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let at = |fraction: f64| values[(n as f64 * fraction).floor() as usize];

    let q1 = at(0.25);
    let median = at(0.5);
    let q3 = at(0.75);
    let iqr = q3 - q1;

    BoxPlotStats {
        min: values[0].max(q1 - 1.5 * iqr),
        q1,
        median,
        q3,
        max: values[n - 1].min(q3 + 1.5 * iqr),
    }
}

/// Sparse fixed-width buckets, ascending by numeric bucket start.
pub fn histogram(table: &Table, column: &str) -> Result<Analysis<Vec<HistogramBucket>>> {
    let idx = table.require_column(column)?;
    let values = table.numeric_values(idx);
    Ok(Analysis::require(1, values.len(), || bucketize(&values)))
}

/// Buckets are keyed by their f64 start, so magnitudes beyond the i64
/// range still land in distinct buckets.
fn bucketize(values: &[f64]) -> Vec<HistogramBucket> {
    let mut starts: Vec<f64> = values.iter().map(|v| bucket_start(*v)).collect();
    starts.sort_by(f64::total_cmp);

    let mut buckets: Vec<HistogramBucket> = Vec::new();
    for start in starts {
        match buckets.last_mut() {
            Some(last) if last.bucket_start == start => last.count += 1,
            _ => buckets.push(HistogramBucket {
                bucket_start: start,
                count: 1,
            }),
        }
    }
    buckets
}

fn bucket_start(value: f64) -> f64 {
    // + 0.0 folds -0.0 into the zero bucket
    (value / HISTOGRAM_BUCKET_WIDTH).floor() * HISTOGRAM_BUCKET_WIDTH + 0.0
}

pub fn box_plot_all(
    table: &Table,
    profiles: &[ColumnProfile],
) -> Result<Vec<ColumnAnalysis<BoxPlotStats>>> {
    columns_of_type(profiles, ColumnType::Numeric)
        .into_iter()
        .map(|name| Ok(ColumnAnalysis::new(name, box_plot(table, name)?)))
        .collect()
}

pub fn histogram_all(
    table: &Table,
    profiles: &[ColumnProfile],
) -> Result<Vec<ColumnAnalysis<Vec<HistogramBucket>>>> {
    columns_of_type(profiles, ColumnType::Numeric)
        .into_iter()
        .map(|name| Ok(ColumnAnalysis::new(name, histogram(table, name)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Cell;

    fn numbers(values: &[f64]) -> Table {
        Table::new(
            vec!["v".to_string()],
            values.iter().map(|v| vec![Cell::Number(*v)]).collect(),
        )
        .unwrap()
    }

    fn buckets(values: &[f64]) -> Vec<(f64, usize)> {
        histogram(&numbers(values), "v")
            .unwrap()
            .into_computed()
            .unwrap()
            .into_iter()
            .map(|b| (b.bucket_start, b.count))
            .collect()
    }

    #[test]
    fn test_box_plot_one_to_ten() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let stats = box_plot(&numbers(&values), "v")
            .unwrap()
            .into_computed()
            .unwrap();

        assert_eq!(
            stats,
            BoxPlotStats {
                min: 1.0,
                q1: 3.0,
                median: 6.0,
                q3: 8.0,
                max: 10.0
            }
        );
    }

    #[test]
    fn test_whiskers_are_clipped_to_fences() {
        let stats = box_plot(&numbers(&[1.0, 2.0, 3.0, 4.0, 100.0]), "v")
            .unwrap()
            .into_computed()
            .unwrap();
        // q1 = 2, q3 = 4, iqr = 2: upper fence at 7
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.max, 7.0);
        assert_eq!(stats.min, 1.0);
    }

    #[test]
    fn test_box_plot_needs_five_values() {
        let result = box_plot(&numbers(&[1.0, 2.0, 3.0, 4.0]), "v").unwrap();
        assert_eq!(
            result,
            Analysis::InsufficientData {
                required: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn test_histogram_buckets() {
        assert_eq!(
            buckets(&[3.0, 11.0, 12.0, 25.0]),
            vec![(0.0, 1), (10.0, 2), (20.0, 1)]
        );
    }

    #[test]
    fn test_histogram_orders_numerically() {
        // As text "100" would sort before "20"
        assert_eq!(
            buckets(&[105.0, 20.0, -3.0]),
            vec![(-10.0, 1), (20.0, 1), (100.0, 1)]
        );
    }

    #[test]
    fn test_histogram_keeps_huge_magnitudes_apart() {
        let table = Table::new(
            vec!["id".to_string()],
            vec![
                vec![Cell::text("12345678901234567890123")],
                vec![Cell::text("98765432109876543210987")],
                vec![Cell::text("-98765432109876543210987")],
            ],
        )
        .unwrap();
        let result = histogram(&table, "id").unwrap().into_computed().unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|b| b.count == 1));
        let starts: Vec<f64> = result.iter().map(|b| b.bucket_start).collect();
        assert!((starts[0] / -9.8765432109876543e22 - 1.0).abs() < 1e-9);
        assert!((starts[1] / 1.2345678901234568e22 - 1.0).abs() < 1e-9);
        assert!((starts[2] / 9.8765432109876543e22 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_zero_shares_the_zero_bucket() {
        assert_eq!(buckets(&[-0.0, 0.0, 4.0]), vec![(0.0, 3)]);
        assert!(buckets(&[-0.0])[0].0.is_sign_positive());
    }

    #[test]
    fn test_histogram_without_values_is_insufficient() {
        let table = Table::new(vec!["v".to_string()], vec![vec![Cell::text("x")]]).unwrap();
        assert!(histogram(&table, "v").unwrap().is_insufficient());
    }

    #[test]
    fn test_bulk_helpers_skip_non_numeric_columns() {
        let table = Table::new(
            vec!["name".to_string(), "v".to_string()],
            vec![vec![Cell::text("a"), Cell::Number(1.0)]],
        )
        .unwrap();
        let profiles = vec![
            ColumnProfile::new("name", ColumnType::Categorical),
            ColumnProfile::new("v", ColumnType::Numeric),
        ];

        let plots = box_plot_all(&table, &profiles).unwrap();
        assert_eq!(plots.len(), 1);
        assert!(plots[0].analysis.is_insufficient());

        let histograms = histogram_all(&table, &profiles).unwrap();
        assert_eq!(histograms[0].column, "v");
        assert_eq!(histograms[0].analysis.computed().unwrap().len(), 1);
    }
}
