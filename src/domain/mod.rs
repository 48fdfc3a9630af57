pub mod analytics;
pub mod analytics_config;
pub mod diagnostics;
pub mod error;
pub mod format_kind;
pub mod profile;

// Normalized table model
pub mod table;
