// ============================================================
// ANALYSIS SESSION
// ============================================================
// Extract once, profile once, then run every engine over the snapshot

use serde::Serialize;

use super::correlation::correlation_matrix;
use super::distribution::{box_plot_all, histogram_all};
use super::ranking::rank_rows;
use super::statistics::describe_all;
use super::time_series::build_time_series;
use super::type_inference::{infer_profiles, label_column};
use crate::domain::analytics::{
    Analysis, BoxPlotStats, ColumnAnalysis, CorrelationMatrix, DescriptiveStats, HistogramBucket,
    RankDirection, RankedRow, TimeSeries,
};
use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::error::Result;
use crate::domain::format_kind::FormatKind;
use crate::domain::profile::ColumnProfile;
use crate::domain::table::Table;
use crate::infrastructure::extraction::TableExtractor;

const SOURCE: &str = "ANALYSIS";

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    pub column: String,
    pub direction: RankDirection,
    /// Falls back to the configured `top_n`.
    pub count: Option<usize>,
}

/// Caller choices for one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisRequest {
    pub metric: Option<String>,
    pub ranking: Option<RankingRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub column: String,
    pub direction: RankDirection,
    pub rows: Vec<RankedRow>,
}

/// Everything derived from one table, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub kind: FormatKind,
    pub table: Table,
    pub dropped_rows: usize,
    pub profiles: Vec<ColumnProfile>,
    pub label_column: String,
    pub summaries: Vec<ColumnAnalysis<DescriptiveStats>>,
    pub box_plots: Vec<ColumnAnalysis<BoxPlotStats>>,
    pub histograms: Vec<ColumnAnalysis<Vec<HistogramBucket>>>,
    pub correlation: Analysis<CorrelationMatrix>,
    pub time_series: TimeSeries,
    pub ranking: Option<RankingReport>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct AnalysisSession {
    config: AnalyticsConfig,
    extractor: TableExtractor,
}

impl AnalysisSession {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        let extractor = TableExtractor::new(&config)?;
        Ok(Self { config, extractor })
    }

    pub fn with_extractor(config: AnalyticsConfig, extractor: TableExtractor) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Extract `bytes` and analyze the resulting table.
    ///
    /// Only fatal extraction failures and invalid requests are `Err`;
    /// recoverable problems end up in the report's diagnostics.
    pub async fn run(
        &self,
        bytes: &[u8],
        kind: FormatKind,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport> {
        let mut diagnostics = Diagnostics::new();
        let extraction = self.extractor.extract(bytes, kind, &mut diagnostics).await?;

        let report = self.analyze(
            kind,
            extraction.table,
            extraction.dropped_rows,
            request,
            diagnostics,
        )?;
        Ok(report)
    }

    /// Analyze an already extracted table.
    pub fn analyze(
        &self,
        kind: FormatKind,
        table: Table,
        dropped_rows: usize,
        request: &AnalysisRequest,
        mut diagnostics: Diagnostics,
    ) -> Result<AnalysisReport> {
        if table.is_empty() {
            diagnostics.warn(SOURCE, "No rows to analyze");
        }

        let profiles = infer_profiles(&table);
        let label_column = label_column(&profiles);

        let summaries = describe_all(&table, &profiles)?;
        let box_plots = box_plot_all(&table, &profiles)?;
        let histograms = histogram_all(&table, &profiles)?;
        let correlation = correlation_matrix(&table, &profiles);

        let time_series = build_time_series(
            &table,
            &profiles,
            request.metric.as_deref(),
            &self.config.time_label_format,
        )?;
        if let TimeSeries::Unavailable { reason } = &time_series {
            diagnostics.info(SOURCE, reason.clone());
        }

        let ranking = match &request.ranking {
            Some(ranking) => {
                let count = ranking.count.unwrap_or(self.config.top_n);
                let rows = rank_rows(&table, &ranking.column, ranking.direction, count)?;
                Some(RankingReport {
                    column: ranking.column.clone(),
                    direction: ranking.direction,
                    rows,
                })
            }
            None => None,
        };

        tracing::info!(
            %kind,
            rows = table.row_count(),
            columns = table.column_count(),
            numeric = summaries.len(),
            time_series = time_series.is_available(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            kind,
            table,
            dropped_rows,
            profiles,
            label_column,
            summaries,
            box_plots,
            histograms,
            correlation,
            time_series,
            ranking,
            diagnostics: diagnostics.into_entries(),
        })
    }
}
