pub mod application;
pub mod domain;
pub mod infrastructure;

mod app;

pub use app::{run, Cli};
pub use application::{AnalysisReport, AnalysisRequest, AnalysisSession};
pub use domain::error::{AppError, Result};
pub use domain::format_kind::FormatKind;
pub use domain::table::{Cell, Row, Table};
