use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::domain::analytics_config::AnalyticsConfig;
use crate::domain::error::{AppError, Result};

/// Environment variables with this prefix override file and default values.
pub const ENV_PREFIX: &str = "DATADASH_";

/// Layered configuration: defaults, then an optional TOML file, then env.
pub struct ConfigService {
    file: Option<PathBuf>,
    use_env: bool,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Layer a TOML file over the defaults. The file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AnalyticsConfig::default()));
        if let Some(path) = &self.file {
            figment = figment.merge(Toml::file(path));
        }
        if self.use_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX));
        }
        figment
    }

    pub fn load(&self) -> Result<AnalyticsConfig> {
        if let Some(path) = &self.file {
            if !path.is_file() {
                return Err(AppError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        let config: AnalyticsConfig = self.figment().extract()?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid analytics config: {}", e)))?;
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigService::new().without_env().load().unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "datadash.toml",
                r#"
                    top_n = 3
                    delimiter = ";"
                    row_labels = ["Q1", "Q2", "Q3", "Q4"]
                "#,
            )?;
            jail.set_env("DATADASH_TOP_N", "8");

            let config = ConfigService::new()
                .with_file("datadash.toml")
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.top_n, 8);
            assert_eq!(config.delimiter, Some(';'));
            assert_eq!(config.row_labels, vec!["Q1", "Q2", "Q3", "Q4"]);
            assert!(!config.trim_fields);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "top_n = 0")?;
            let err = ConfigService::new()
                .without_env()
                .with_file("bad.toml")
                .load()
                .unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigService::new()
            .without_env()
            .with_file(dir.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(msg) if msg.contains("absent.toml")));
    }
}
