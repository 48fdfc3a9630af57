// ============================================================
// DELIMITED RE-EXPORT
// ============================================================
// Write a table back out as comma-separated text

use csv::WriterBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

/// Render the table as CSV: header first, columns in table order.
/// Null cells are empty fields and integral numbers have no fraction.
pub fn to_delimited(table: &Table) -> Result<String> {
    to_delimited_with(table, b',')
}

pub fn to_delimited_with(table: &Table, delimiter: u8) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(table.columns())
        .map_err(|e| AppError::IoError(format!("Failed to write header: {}", e)))?;

    for (index, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.cells().iter().map(|cell| cell.to_text().into_owned()))
            .map_err(|e| AppError::IoError(format!("Failed to write row {}: {}", index + 1, e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::IoError(format!("Failed to flush CSV writer: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::ParseError(e.to_string()))
}
