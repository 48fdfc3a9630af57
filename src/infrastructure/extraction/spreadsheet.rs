use std::io::Cursor;

use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use super::{normalize_headers, Extraction, FormatAdapter};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::Result;
use crate::domain::format_kind::FormatKind;
use crate::domain::table::{Cell, Table};

const SOURCE: &str = "XLSX";

/// Reads the first worksheet of a workbook; the first row holds headers.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetAdapter;

impl SpreadsheetAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a worksheet range into a table.
    ///
    /// Missing cells become empty text rather than Null so that fully
    /// empty rows are dropped by the table's blank-row rule.
    pub fn table_from_range(range: &Range<Data>) -> Result<Table> {
        let mut rows = range.rows();

        let Some(header_row) = rows.next() else {
            return Ok(Table::empty());
        };

        let columns = normalize_headers(header_row.iter().map(|cell| cell.to_string()));
        let width = columns.len();

        let data_rows = rows
            .map(|row| {
                (0..width)
                    .map(|idx| row.get(idx).map(Self::cell_from_data).unwrap_or_else(|| Cell::text("")))
                    .collect()
            })
            .collect();

        Table::new(columns, data_rows)
    }

    fn cell_from_data(data: &Data) -> Cell {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            // Raw export: date cells keep their serial day value
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
            Data::Bool(b) => Cell::text(b.to_string()),
            Data::Error(e) => Cell::text(e.to_string()),
            Data::Empty => Cell::text(""),
        }
    }
}

#[async_trait]
impl FormatAdapter for SpreadsheetAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::Spreadsheet
    }

    async fn extract(&self, bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Extraction> {
        let mut workbook = match open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())) {
            Ok(workbook) => workbook,
            Err(e) => {
                diagnostics.error(SOURCE, format!("Failed to open workbook: {}", e));
                return Ok(Extraction::empty());
            }
        };

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                diagnostics.error(SOURCE, format!("Failed to read first worksheet: {}", e));
                return Ok(Extraction::empty());
            }
            None => {
                diagnostics.error(SOURCE, "No worksheet found in workbook");
                return Ok(Extraction::empty());
            }
        };

        match Self::table_from_range(&range) {
            Ok(table) => Ok(Extraction::new(table)),
            Err(e) => {
                diagnostics.error(SOURCE, format!("Failed to build table from worksheet: {}", e));
                Ok(Extraction::empty())
            }
        }
    }
}
