// ============================================================
// FORMAT EXTRACTION LAYER
// ============================================================
// Turn raw bytes of a declared kind into a normalized Table

mod delimited;
mod document;
mod headers;
mod segments;
mod spreadsheet;

pub use delimited::DelimitedAdapter;
pub use document::DocumentTextAdapter;
pub use headers::normalize_headers;
pub use segments::{LabeledSegmentStrategy, Reconstruction, RowReconstruction};
pub use spreadsheet::SpreadsheetAdapter;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::Result;
use crate::domain::format_kind::FormatKind;
use crate::domain::table::Table;

/// Output of one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub table: Table,
    /// Source rows that could not be reconstructed and were left out.
    pub dropped_rows: usize,
}

impl Extraction {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            dropped_rows: 0,
        }
    }

    /// Recoverable failure: no rows, the reason lives in the diagnostics.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Common contract of every format adapter.
///
/// Recoverable input problems are reported through `diagnostics` with an
/// empty table; only failures that make the input unreadable are `Err`.
#[async_trait]
pub trait FormatAdapter: Send + Sync {
    fn kind(&self) -> FormatKind;

    async fn extract(&self, bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Extraction>;
}

/// Picks the adapter for a declared kind.
pub struct TableExtractor {
    delimited: DelimitedAdapter,
    spreadsheet: SpreadsheetAdapter,
    document: DocumentTextAdapter,
}

impl TableExtractor {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            delimited: DelimitedAdapter::from_config(config),
            spreadsheet: SpreadsheetAdapter::new(),
            document: DocumentTextAdapter::from_config(config)?,
        })
    }

    /// Swap the document-text row reconstruction strategy.
    pub fn with_document_strategy(mut self, strategy: Box<dyn RowReconstruction>) -> Self {
        self.document = DocumentTextAdapter::new(strategy);
        self
    }

    pub fn adapter(&self, kind: FormatKind) -> &dyn FormatAdapter {
        match kind {
            FormatKind::DelimitedText => &self.delimited,
            FormatKind::Spreadsheet => &self.spreadsheet,
            FormatKind::DocumentText => &self.document,
        }
    }

    pub async fn extract(
        &self,
        bytes: &[u8],
        kind: FormatKind,
        diagnostics: &mut Diagnostics,
    ) -> Result<Extraction> {
        tracing::info!(%kind, bytes = bytes.len(), "Extracting table");
        let extraction = self.adapter(kind).extract(bytes, diagnostics).await?;
        tracing::info!(
            %kind,
            rows = extraction.table.row_count(),
            columns = extraction.table.column_count(),
            dropped = extraction.dropped_rows,
            "Extraction finished"
        );
        Ok(extraction)
    }
}
