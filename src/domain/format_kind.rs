use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::AppError;

/// Declared kind of an input byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    DelimitedText,
    Spreadsheet,
    DocumentText,
}

impl FormatKind {
    /// Guess the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        extension.parse().ok()
    }
}

impl FromStr for FormatKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "tsv" | "delimited" | "delimited_text" => Ok(FormatKind::DelimitedText),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" | "excel" | "spreadsheet" => {
                Ok(FormatKind::Spreadsheet)
            }
            "pdf" | "document" | "document_text" => Ok(FormatKind::DocumentText),
            other => Err(AppError::ValidationError(format!(
                "Unsupported file type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::DelimitedText => write!(f, "delimited-text"),
            FormatKind::Spreadsheet => write!(f, "spreadsheet"),
            FormatKind::DocumentText => write!(f, "document-text"),
        }
    }
}
