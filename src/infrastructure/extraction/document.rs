use async_trait::async_trait;
use lopdf::Document;

use super::{Extraction, FormatAdapter, LabeledSegmentStrategy, RowReconstruction};
use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::{AppError, Result};
use crate::domain::format_kind::FormatKind;

const SOURCE: &str = "PDF";

/// Extracts page text in page order and hands it to a row reconstruction
/// strategy.
///
/// Unlike the other adapters, a document that cannot be loaded is a hard
/// failure: the caller gets `AppError::Extraction` and no table.
pub struct DocumentTextAdapter {
    strategy: Box<dyn RowReconstruction>,
}

impl DocumentTextAdapter {
    pub fn new(strategy: Box<dyn RowReconstruction>) -> Self {
        Self { strategy }
    }

    /// Labeled-segment strategy over the configured row labels.
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        let strategy = LabeledSegmentStrategy::new(config.row_labels.clone())?;
        Ok(Self::new(Box::new(strategy)))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Load the document and read page text sequentially, one page per
    /// scheduler turn.
    async fn read_pages(bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Vec<String>> {
        let owned = bytes.to_vec();
        let document = tokio::task::spawn_blocking(move || Document::load_mem(&owned))
            .await
            .map_err(|e| AppError::Extraction(format!("PDF loader task failed: {}", e)))?
            .map_err(|e| AppError::Extraction(format!("Failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in page_numbers {
            match document.extract_text(&[page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    diagnostics.warn(
                        SOURCE,
                        format!("Skipping page {}: text extraction failed: {}", page_number, e),
                    );
                }
            }
            tokio::task::yield_now().await;
        }

        Ok(pages)
    }

    /// Concatenate pages in order, one line break after each page.
    pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
        let mut full_text = String::new();
        for page in pages {
            full_text.push_str(page.as_ref());
            full_text.push('\n');
        }
        full_text
    }

    /// Run the strategy over already extracted text.
    pub fn extract_from_text(&self, text: &str, diagnostics: &mut Diagnostics) -> Result<Extraction> {
        if text.trim().is_empty() {
            diagnostics.warn(SOURCE, "No text layer found in document");
            return Ok(Extraction::empty());
        }

        let reconstruction = self.strategy.reconstruct(text)?;

        if reconstruction.table.column_count() == 0 {
            diagnostics.warn(SOURCE, "No header line found before the first row label");
        }
        if reconstruction.dropped_rows > 0 {
            diagnostics.warn(
                SOURCE,
                format!(
                    "{} row(s) did not match the header width and were dropped ({})",
                    reconstruction.dropped_rows,
                    self.strategy.name()
                ),
            );
        }

        Ok(Extraction {
            table: reconstruction.table,
            dropped_rows: reconstruction.dropped_rows,
        })
    }
}

#[async_trait]
impl FormatAdapter for DocumentTextAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::DocumentText
    }

    async fn extract(&self, bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Extraction> {
        let pages = Self::read_pages(bytes, diagnostics).await?;
        tracing::debug!(pages = pages.len(), strategy = self.strategy.name(), "Read document text");

        let full_text = Self::join_pages(&pages);
        self.extract_from_text(&full_text, diagnostics)
    }
}
