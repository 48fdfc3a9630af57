// ============================================================
// ANALYTICS RESULT TYPES
// ============================================================
// Plain serializable outputs of the analytics engines

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::table::Row;

/// Outcome of an engine that needs a minimum amount of data.
///
/// `InsufficientData` is distinct from a computed result that happens to
/// be empty or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Analysis<T> {
    Computed(T),
    InsufficientData { required: usize, actual: usize },
}

impl<T> Analysis<T> {
    /// `Computed` when `actual >= required`, otherwise the sentinel.
    pub fn require(required: usize, actual: usize, compute: impl FnOnce() -> T) -> Self {
        if actual < required {
            Analysis::InsufficientData { required, actual }
        } else {
            Analysis::Computed(compute())
        }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            Analysis::Computed(value) => Some(value),
            Analysis::InsufficientData { .. } => None,
        }
    }

    pub fn into_computed(self) -> Option<T> {
        match self {
            Analysis::Computed(value) => Some(value),
            Analysis::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Analysis::InsufficientData { .. })
    }
}

/// An engine result tagged with the column it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis<T> {
    pub column: String,
    pub analysis: Analysis<T>,
}

impl<T> ColumnAnalysis<T> {
    pub fn new(column: impl Into<String>, analysis: Analysis<T>) -> Self {
        Self {
            column: column.into(),
            analysis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Rounded to 2 decimals.
    pub mean: f64,
    /// Exact middle value for odd counts, rounded midpoint for even counts.
    pub median: f64,
    pub mode: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotStats {
    /// Lower whisker, clipped to the Tukey fence.
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Upper whisker, clipped to the Tukey fence.
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub bucket_start: f64,
    pub count: usize,
}

/// Square matrix of rounded Pearson coefficients over Numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Coefficient between two named columns.
    pub fn between(&self, x: &str, y: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == x)?;
        let j = self.columns.iter().position(|c| c == y)?;
        self.get(i, j)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Position of the row in the source table.
    pub row_index: usize,
    pub row: Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesValue {
    Metric(f64),
    Count(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: NaiveDateTime,
    pub label: String,
    pub value: SeriesValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeSeries {
    /// No date or no time column; the chart cannot be built.
    Unavailable { reason: String },
    /// One point per surviving row, valued by the selected metric.
    Metric {
        date_column: String,
        time_column: String,
        metric: String,
        points: Vec<TimeSeriesPoint>,
    },
    /// Row counts per distinct timestamp when no metric column exists.
    Counts {
        date_column: String,
        time_column: String,
        points: Vec<TimeSeriesPoint>,
    },
}

impl TimeSeries {
    pub fn points(&self) -> &[TimeSeriesPoint] {
        match self {
            TimeSeries::Unavailable { .. } => &[],
            TimeSeries::Metric { points, .. } | TimeSeries::Counts { points, .. } => points,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, TimeSeries::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_distinguishes_sentinel() {
        let short: Analysis<usize> = Analysis::require(5, 4, || 1);
        assert_eq!(
            short,
            Analysis::InsufficientData {
                required: 5,
                actual: 4
            }
        );

        let empty: Analysis<Vec<u8>> = Analysis::require(0, 0, Vec::new);
        assert_eq!(empty.computed(), Some(&Vec::new()));
    }

    #[test]
    fn test_analysis_serialization() {
        let short: Analysis<f64> = Analysis::InsufficientData {
            required: 2,
            actual: 1,
        };
        let json = serde_json::to_value(&short).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["result"]["required"], 2);
    }

    #[test]
    fn test_correlation_lookup() {
        let matrix = CorrelationMatrix {
            columns: vec!["a".into(), "b".into()],
            values: vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        };
        assert_eq!(matrix.between("a", "b"), Some(0.5));
        assert_eq!(matrix.between("a", "z"), None);
    }
}
