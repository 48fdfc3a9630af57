// ============================================================
// DOCUMENT ROW RECONSTRUCTION
// ============================================================
// Rebuild table rows from a flat document text stream

use regex::Regex;

use super::normalize_headers;
use crate::domain::error::{AppError, Result};
use crate::domain::table::{Cell, Table};

/// Result of turning free text into rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub table: Table,
    /// Candidate rows that did not fit the header and were skipped.
    pub dropped_rows: usize,
}

/// Strategy for recovering rows from extracted document text.
pub trait RowReconstruction: Send + Sync {
    fn name(&self) -> &'static str;

    fn reconstruct(&self, text: &str) -> Result<Reconstruction>;
}

/// Splits text on a fixed vocabulary of category labels.
///
/// Text before the first label is the header line. Every label starts a
/// row: the label fills the first column and the whitespace-separated
/// numbers that follow fill the rest. A row is kept only when every
/// token is numeric and their count is exactly `columns - 1`.
pub struct LabeledSegmentStrategy {
    labels: Vec<String>,
    pattern: Option<Regex>,
}

impl LabeledSegmentStrategy {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        let pattern = if labels.is_empty() {
            None
        } else {
            let mut trimmed: Vec<&str> = labels.iter().map(|l| l.trim()).collect();
            // Longest first so a label never shadows a longer one sharing its prefix
            trimmed.sort_by(|a, b| b.len().cmp(&a.len()));
            let alternatives: Vec<String> = trimmed.into_iter().map(Self::label_pattern).collect();
            let source = format!("(?:{})", alternatives.join("|"));
            Some(
                Regex::new(&source)
                    .map_err(|e| AppError::ValidationError(format!("Invalid row labels: {}", e)))?,
            )
        };

        Ok(Self { labels, pattern })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whole-word match. `\b` only holds next to a word character, so
    /// an edge that is punctuation (`(A)`, `Q1.`) is left unanchored.
    fn label_pattern(label: &str) -> String {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let start = if label.starts_with(is_word) { r"\b" } else { "" };
        let end = if label.ends_with(is_word) { r"\b" } else { "" };
        format!("{}{}{}", start, regex::escape(label), end)
    }

    fn parse_numbers(segment: &str) -> Option<Vec<f64>> {
        segment
            .split_whitespace()
            .map(|token| token.parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect()
    }
}

impl RowReconstruction for LabeledSegmentStrategy {
    fn name(&self) -> &'static str {
        "labeled-segments"
    }

    fn reconstruct(&self, text: &str) -> Result<Reconstruction> {
        let matches: Vec<_> = match &self.pattern {
            Some(pattern) => pattern.find_iter(text).collect(),
            None => Vec::new(),
        };

        let header_end = matches.first().map(|m| m.start()).unwrap_or(text.len());
        let header_tokens: Vec<&str> = text[..header_end].split_whitespace().collect();

        if header_tokens.is_empty() {
            return Ok(Reconstruction {
                table: Table::empty(),
                dropped_rows: matches.len(),
            });
        }

        let columns = normalize_headers(header_tokens);
        let expected = columns.len() - 1;

        let mut rows = Vec::new();
        let mut dropped_rows = 0usize;

        for (idx, label) in matches.iter().enumerate() {
            let segment_end = matches
                .get(idx + 1)
                .map(|next| next.start())
                .unwrap_or(text.len());
            let segment = &text[label.end()..segment_end];

            match Self::parse_numbers(segment) {
                Some(numbers) if numbers.len() == expected => {
                    let mut cells = Vec::with_capacity(columns.len());
                    cells.push(Cell::text(label.as_str()));
                    cells.extend(numbers.into_iter().map(Cell::Number));
                    rows.push(cells);
                }
                _ => dropped_rows += 1,
            }
        }

        Ok(Reconstruction {
            table: Table::new(columns, rows)?,
            dropped_rows,
        })
    }
}
