// ============================================================
// TIME SERIES NORMALIZER
// ============================================================
// Merge a date column and a time column into ordered points

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDateTime;

use super::temporal::{cell_date, cell_time, combine, numeric_literal};
use crate::domain::analytics::{SeriesValue, TimeSeries, TimeSeriesPoint};
use crate::domain::error::{AppError, Result};
use crate::domain::profile::{ColumnProfile, ColumnType};
use crate::domain::table::{Row, Table};

const UNAVAILABLE_REASON: &str = "Dataset must contain at least one valid date and time column.";

/// Numeric columns usable as the series value, in column order.
pub fn metric_candidates<'a>(
    profiles: &'a [ColumnProfile],
    date_column: &str,
    time_column: &str,
) -> Vec<&'a str> {
    profiles
        .iter()
        .filter(|p| p.is(ColumnType::Numeric))
        .map(|p| p.name.as_str())
        .filter(|name| *name != date_column && *name != time_column)
        .collect()
}

/// Build the series from the first Date and first Time column.
///
/// With a metric (explicit, or the first candidate when `metric` is
/// `None`) every surviving row becomes one point. Without any candidate,
/// rows are counted per formatted timestamp label.
pub fn build_time_series(
    table: &Table,
    profiles: &[ColumnProfile],
    metric: Option<&str>,
    label_format: &str,
) -> Result<TimeSeries> {
    let date_column = profiles.iter().find(|p| p.is(ColumnType::Date));
    let time_column = profiles.iter().find(|p| p.is(ColumnType::Time));

    let (Some(date_column), Some(time_column)) = (date_column, time_column) else {
        tracing::debug!("Time series unavailable: missing date or time column");
        return Ok(TimeSeries::Unavailable {
            reason: UNAVAILABLE_REASON.to_string(),
        });
    };

    let date_idx = table.require_column(&date_column.name)?;
    let time_idx = table.require_column(&time_column.name)?;

    let candidates = metric_candidates(profiles, &date_column.name, &time_column.name);
    let metric = match metric {
        Some(name) => {
            table.require_column(name)?;
            if !candidates.contains(&name) {
                return Err(AppError::ValidationError(format!(
                    "Column '{}' is not a numeric metric",
                    name
                )));
            }
            Some(name)
        }
        None => candidates.first().copied(),
    };

    let timestamp_of = |row: &Row| -> Option<NaiveDateTime> {
        let date = cell_date(row.get(date_idx)?)?;
        let time = cell_time(row.get(time_idx)?)?;
        combine(date, time)
    };

    let series = match metric {
        Some(metric) => {
            let metric_idx = table.require_column(metric)?;

            let mut stamped: Vec<(NaiveDateTime, f64)> = table
                .rows()
                .iter()
                .filter_map(|row| {
                    let value = numeric_literal(row.get(metric_idx)?)?;
                    Some((timestamp_of(row)?, value))
                })
                .collect();
            stamped.sort_by_key(|(timestamp, _)| *timestamp);

            let points = stamped
                .into_iter()
                .map(|(timestamp, value)| {
                    Ok(TimeSeriesPoint {
                        timestamp,
                        label: format_label(&timestamp, label_format)?,
                        value: SeriesValue::Metric(value),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            TimeSeries::Metric {
                date_column: date_column.name.clone(),
                time_column: time_column.name.clone(),
                metric: metric.to_string(),
                points,
            }
        }
        None => {
            // label -> (earliest instant carrying the label, rows)
            let mut counts: HashMap<String, (NaiveDateTime, usize)> = HashMap::new();
            for timestamp in table.rows().iter().filter_map(|row| timestamp_of(row)) {
                let label = format_label(&timestamp, label_format)?;
                let entry = counts.entry(label).or_insert((timestamp, 0));
                entry.0 = entry.0.min(timestamp);
                entry.1 += 1;
            }

            let mut points: Vec<TimeSeriesPoint> = counts
                .into_iter()
                .map(|(label, (timestamp, count))| TimeSeriesPoint {
                    timestamp,
                    label,
                    value: SeriesValue::Count(count),
                })
                .collect();
            points.sort_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a.label.cmp(&b.label))
            });

            TimeSeries::Counts {
                date_column: date_column.name.clone(),
                time_column: time_column.name.clone(),
                points,
            }
        }
    };

    tracing::debug!(
        points = series.points().len(),
        rows = table.row_count(),
        "Built time series"
    );
    Ok(series)
}

fn format_label(timestamp: &NaiveDateTime, format: &str) -> Result<String> {
    let mut label = String::new();
    write!(label, "{}", timestamp.format(format)).map_err(|_| {
        AppError::ValidationError(format!("Invalid time label format: {}", format))
    })?;
    Ok(label)
}
