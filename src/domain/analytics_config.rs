// ============================================================
// ANALYTICS CONFIGURATION
// ============================================================
// Tunables for extraction heuristics and analytics defaults

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Month names used as implicit row delimiters in document text.
pub const DEFAULT_ROW_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Configuration for extraction and analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Field delimiter for delimited text (default: auto-detect)
    pub delimiter: Option<char>,

    /// Trim surrounding whitespace from delimited fields (default: false).
    /// When on, whitespace-only fields become empty and such rows are dropped.
    pub trim_fields: bool,

    /// Category labels that start a new row in document text
    pub row_labels: Vec<String>,

    /// Row count for top/bottom ranking when the caller gives none (default: 5)
    pub top_n: usize,

    /// chrono format for time-series labels (default: `%-d/%-m/%Y, %-I:%M:%S %P`)
    pub time_label_format: String,

    /// tracing-subscriber filter directive (default: "info")
    pub log_filter: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim_fields: false,
            row_labels: DEFAULT_ROW_LABELS.iter().map(|s| s.to_string()).collect(),
            top_n: 5,
            time_label_format: "%-d/%-m/%Y, %-I:%M:%S %P".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AnalyticsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
                return Err(format!("delimiter {:?} is not a usable ASCII separator", delimiter));
            }
        }
        if self.top_n == 0 {
            return Err("top_n must be >= 1".to_string());
        }
        if self.row_labels.iter().any(|l| l.trim().is_empty()) {
            return Err("row_labels must not contain blank labels".to_string());
        }
        if self.time_label_format.trim().is_empty() {
            return Err("time_label_format must not be empty".to_string());
        }
        if StrftimeItems::new(&self.time_label_format).any(|item| matches!(item, Item::Error)) {
            return Err(format!(
                "time_label_format {:?} is not a valid chrono format",
                self.time_label_format
            ));
        }
        Ok(())
    }
}
