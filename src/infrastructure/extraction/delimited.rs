// ============================================================
// DELIMITED TEXT ADAPTER
// ============================================================
// Parse delimited text with encoding fallback and numeric coercion

use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{normalize_headers, Extraction, FormatAdapter};
use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::{AppError, Result};
use crate::domain::format_kind::FormatKind;
use crate::domain::table::{Cell, Table};

const SOURCE: &str = "CSV";

/// Plain decimal or scientific literal, no thousands separators.
static NUMERIC_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").unwrap());

/// Largest integer an f64 holds exactly; larger literals stay text.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Records sampled when guessing the delimiter.
const DELIMITER_SAMPLE_RECORDS: usize = 10;

/// Delimited text adapter with delimiter detection
pub struct DelimitedAdapter {
    /// Delimiter byte, `None` to detect per input
    delimiter: Option<u8>,

    /// Whether to trim whitespace from headers and values. Off by default:
    /// trimming turns whitespace-only fields into empty ones.
    trim: bool,
}

impl Default for DelimitedAdapter {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: false,
        }
    }
}

impl DelimitedAdapter {
    /// Create a new adapter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            delimiter: config.delimiter.map(|c| c as u8),
            trim: config.trim_fields,
        }
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse delimited content into a table. The first record is the header.
    pub fn parse_content(&self, content: &str, diagnostics: &mut Diagnostics) -> Result<Table> {
        if content.contains('\0') {
            return Err(AppError::ParseError(
                "Input contains NUL bytes and is not delimited text".to_string(),
            ));
        }

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true) // Ragged rows are padded or truncated below
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read headers: {}", e)))?
            .clone();

        if headers.iter().all(|h| h.is_empty()) {
            return Ok(Table::empty());
        }

        let columns = normalize_headers(headers.iter());
        let width = columns.len();

        let mut rows = Vec::new();
        let mut surplus_rows = 0usize;

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse row {}: {}", index + 1, e))
            })?;

            if record.len() > width {
                surplus_rows += 1;
            }

            let cells = (0..width)
                .map(|idx| record.get(idx).map(Self::coerce_field).unwrap_or(Cell::Null))
                .collect();
            rows.push(cells);
        }

        if surplus_rows > 0 {
            diagnostics.warn(
                SOURCE,
                format!(
                    "{} row(s) had more fields than the header; extra fields were ignored",
                    surplus_rows
                ),
            );
        }

        let table = Table::new(columns, rows)?;
        tracing::debug!(
            delimiter = %(delimiter as char).escape_default(),
            rows = table.row_count(),
            columns = table.column_count(),
            "Parsed delimited text"
        );
        Ok(table)
    }

    /// Decode bytes as UTF-8 (BOM stripped), falling back to Windows-1252.
    fn decode(bytes: &[u8], diagnostics: &mut Diagnostics) -> String {
        let (content, had_errors) = UTF_8.decode_with_bom_removal(bytes);
        if !had_errors {
            return content.into_owned();
        }

        diagnostics.warn(SOURCE, "Input is not valid UTF-8; decoded as Windows-1252");
        let (content, _, _) = WINDOWS_1252.decode(bytes);
        content.into_owned()
    }

    /// Number when the field is a plain numeric literal, Null when empty,
    /// otherwise Text.
    fn coerce_field(value: &str) -> Cell {
        if value.is_empty() {
            return Cell::Null;
        }
        if NUMERIC_FIELD.is_match(value) {
            if let Ok(n) = value.trim().parse::<f64>() {
                if n.is_finite() && n.abs() <= MAX_SAFE_INTEGER {
                    return Cell::Number(n);
                }
            }
        }
        Cell::text(value)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe).
    ///
    /// Each candidate parses the first records with the csv reader, so
    /// separators inside quoted fields do not count. The candidate whose
    /// field counts are highest and most uniform wins; ties keep the
    /// earlier candidate, and comma is the fallback.
    pub fn detect_delimiter(content: &str) -> u8 {
        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for delimiter in DELIMITER_CANDIDATES {
            let score = Self::delimiter_score(content, delimiter);
            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }

    /// Mean separators per record, damped by their standard deviation.
    fn delimiter_score(content: &str, delimiter: u8) -> f32 {
        let separators: Vec<f32> = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes())
            .records()
            .take(DELIMITER_SAMPLE_RECORDS)
            .map_while(|record| record.ok())
            .map(|record| record.len().saturating_sub(1) as f32)
            .collect();

        if separators.is_empty() {
            return 0.0;
        }

        let count = separators.len() as f32;
        let mean = separators.iter().sum::<f32>() / count;
        let variance = separators.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / count;
        mean / (1.0 + variance.sqrt())
    }
}

#[async_trait]
impl FormatAdapter for DelimitedAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::DelimitedText
    }

    async fn extract(&self, bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Extraction> {
        let content = Self::decode(bytes, diagnostics);

        match self.parse_content(&content, diagnostics) {
            Ok(table) => Ok(Extraction::new(table)),
            Err(e) => {
                diagnostics.error(SOURCE, format!("Failed to parse delimited text: {}", e));
                Ok(Extraction::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Table {
        DelimitedAdapter::new()
            .parse_content(content, &mut Diagnostics::new())
            .unwrap()
    }

    #[test]
    fn test_parse_simple_csv() {
        let table = parse("name,age,city\nAlice,30,NYC\nBob,25.5,LA");

        assert_eq!(table.columns(), &["name", "age", "city"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0].get(0), Some(&Cell::text("Alice")));
        assert_eq!(table.rows()[0].get(1), Some(&Cell::Number(30.0)));
        assert_eq!(table.rows()[1].get(1), Some(&Cell::Number(25.5)));
    }

    #[test]
    fn test_fully_empty_rows_are_dropped() {
        let table = parse("a,b\n1,2\n,\n\n3,\n");

        // "1,2" and "3," survive; the empty-field and blank lines do not
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].get(1), Some(&Cell::Null));
    }

    #[test]
    fn test_whitespace_only_rows_are_kept_verbatim() {
        let table = parse("a,b\n  ,  \n1,2\n");

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows()[0].cells(),
            &[Cell::text("  "), Cell::text("  ")]
        );
        assert_eq!(table.rows()[1].get(0), Some(&Cell::Number(1.0)));
    }

    #[test]
    fn test_padded_numbers_still_coerce_without_trimming() {
        let table = parse("a, b\n 1 , x \n");

        assert_eq!(table.columns(), &["a", " b"]);
        assert_eq!(table.rows()[0].get(0), Some(&Cell::Number(1.0)));
        assert_eq!(table.rows()[0].get(1), Some(&Cell::text(" x ")));
    }

    #[test]
    fn test_opt_in_trimming() {
        let table = DelimitedAdapter::new()
            .with_trim(true)
            .parse_content("a, b\n 1 , x \n", &mut Diagnostics::new())
            .unwrap();

        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.rows()[0].get(1), Some(&Cell::text("x")));
    }

    #[test]
    fn test_field_coercion() {
        assert_eq!(DelimitedAdapter::coerce_field("-1.5e3"), Cell::Number(-1500.0));
        assert_eq!(DelimitedAdapter::coerce_field(".5"), Cell::Number(0.5));
        assert_eq!(DelimitedAdapter::coerce_field("true"), Cell::text("true"));
        assert_eq!(DelimitedAdapter::coerce_field("1,234"), Cell::text("1,234"));
        assert_eq!(
            DelimitedAdapter::coerce_field("2023-01-01"),
            Cell::text("2023-01-01")
        );
        assert_eq!(
            DelimitedAdapter::coerce_field("12345678901234567890"),
            Cell::text("12345678901234567890")
        );
        assert_eq!(DelimitedAdapter::coerce_field(""), Cell::Null);
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let mut diagnostics = Diagnostics::new();
        let table = DelimitedAdapter::new()
            .parse_content("a,b\n1\n2,3,4\n", &mut diagnostics)
            .unwrap();

        assert_eq!(table.rows()[0].cells(), &[Cell::Number(1.0), Cell::Null]);
        assert_eq!(
            table.rows()[1].cells(),
            &[Cell::Number(2.0), Cell::Number(3.0)]
        );
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn test_duplicate_headers_are_renamed() {
        let table = parse("x,x,\n1,2,3");
        assert_eq!(table.columns(), &["x", "x_1", "__EMPTY"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(DelimitedAdapter::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(DelimitedAdapter::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(DelimitedAdapter::detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(DelimitedAdapter::detect_delimiter(""), b',');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_separators() {
        let content = "\"a,b,c\";\"d\"\n\"e,f,g\";\"h\"\n";
        assert_eq!(DelimitedAdapter::detect_delimiter(content), b';');

        let table = parse("\"total,net\";\"note\"\n\"7\";\"x\"\n");
        assert_eq!(table.columns(), &["total,net", "note"]);
        assert_eq!(table.rows()[0].get(0), Some(&Cell::Number(7.0)));
    }

    #[test]
    fn test_semicolon_input_is_detected() {
        let table = parse("item;price\npen;1.5\n");
        assert_eq!(table.columns(), &["item", "price"]);
        assert_eq!(table.rows()[0].get(1), Some(&Cell::Number(1.5)));
    }

    #[tokio::test]
    async fn test_binary_input_yields_empty_table_and_diagnostic() {
        let mut diagnostics = Diagnostics::new();
        let extraction = DelimitedAdapter::new()
            .extract(b"PK\x03\x04\x00\x00binary", &mut diagnostics)
            .await
            .unwrap();

        assert!(extraction.table.is_empty());
        assert!(diagnostics.has_errors());
    }

    #[tokio::test]
    async fn test_latin1_fallback_and_bom() {
        let mut diagnostics = Diagnostics::new();
        let extraction = DelimitedAdapter::new()
            .extract(b"city,temp\nK\xf6ln,12\n", &mut diagnostics)
            .await
            .unwrap();
        assert_eq!(
            extraction.table.rows()[0].get(0),
            Some(&Cell::text("Köln"))
        );
        assert_eq!(diagnostics.entries().len(), 1);

        let mut diagnostics = Diagnostics::new();
        let extraction = DelimitedAdapter::new()
            .extract(b"\xef\xbb\xbfid,v\n1,2\n", &mut diagnostics)
            .await
            .unwrap();
        assert_eq!(extraction.table.columns(), &["id", "v"]);
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn test_row_count_matches_non_empty_input_rows() {
        let content = "a,b,c\n1,,\n,,\nx,y,z\n,,\n,,7\n";
        let expected = content
            .lines()
            .skip(1)
            .filter(|line| line.split(',').any(|f| !f.is_empty()))
            .count();
        assert_eq!(parse(content).row_count(), expected);
    }
}
