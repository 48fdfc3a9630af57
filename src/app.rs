use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::{AnalysisRequest, AnalysisSession, RankingRequest};
use crate::domain::analytics::RankDirection;
use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::format_kind::FormatKind;
use crate::infrastructure::config::ConfigService;

#[derive(Debug, Parser)]
#[command(name = "datadash")]
#[command(about = "Extract a table from CSV, spreadsheet or PDF and print its analytics as JSON")]
#[command(version)]
pub struct Cli {
    /// Input file
    pub file: PathBuf,

    /// Input kind (csv, xlsx, pdf, ...); defaults from the file extension
    #[arg(short, long)]
    pub kind: Option<FormatKind>,

    /// TOML file layered over the built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Numeric column plotted by the time series
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Rank rows by this numeric column
    #[arg(long)]
    pub rank_by: Option<String>,

    /// Rank ascending instead of descending
    #[arg(long, requires = "rank_by")]
    pub bottom: bool,

    /// Number of ranked rows (default: top_n from config)
    #[arg(short = 'n', long, requires = "rank_by")]
    pub count: Option<usize>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    pub fn resolve_kind(&self) -> Result<FormatKind> {
        self.kind
            .or_else(|| FormatKind::from_path(&self.file))
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Cannot tell the file kind of {}; pass --kind",
                    self.file.display()
                ))
            })
    }

    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            metric: self.metric.clone(),
            ranking: self.rank_by.as_ref().map(|column| RankingRequest {
                column: column.clone(),
                direction: if self.bottom {
                    RankDirection::Bottom
                } else {
                    RankDirection::Top
                },
                count: self.count,
            }),
        }
    }
}

fn load_config(cli: &Cli) -> Result<AnalyticsConfig> {
    let mut service = ConfigService::new();
    if let Some(path) = &cli.config {
        service = service.with_file(path);
    }
    service.load()
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so the
/// report on stdout stays machine-readable.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// The filter comes from the config, so this runs once logging is up.
fn log_config(cli: &Cli, config: &AnalyticsConfig) {
    tracing::debug!(
        file = ?cli.config,
        delimiter = ?config.delimiter,
        trim = config.trim_fields,
        top_n = config.top_n,
        labels = config.row_labels.len(),
        "Loaded analytics config"
    );
}

fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.log_filter);
    log_config(&cli, &config);

    let kind = cli.resolve_kind()?;
    let request = cli.request();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        let bytes = tokio::fs::read(&cli.file).await.map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", cli.file.display(), e))
        })?;
        tracing::info!(file = %cli.file.display(), %kind, bytes = bytes.len(), "Loaded input");

        let session = AnalysisSession::new(config)?;
        session.run(&bytes, kind, &request).await
    })?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}

pub fn run() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "datadash failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
