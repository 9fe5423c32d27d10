//! TOML configuration file.
//!
//! Every table and key is optional:
//!
//! ```toml
//! [loader]
//! encoding = "iso-8859-1"
//!
//! [loader.columns]
//! offence = "Offences"
//!
//! [hotspots]
//! epsilon_radians = 8.5e-7
//! top_k = 100
//!
//! [display]
//! table_rows = 10
//! ```

use std::path::Path;

use hotspot_map_hotspot_models::{HotspotParams, InvalidParamsError};
use hotspot_map_source::LoaderConfig;
use serde::{Deserialize, Serialize};

/// Terminal output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows in the printed hotspot table.
    pub table_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { table_rows: 10 }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `[loader]`: columns, encoding and CSV dialect.
    pub loader: LoaderConfig,
    /// `[hotspots]`: clustering and ranking parameters.
    pub hotspots: HotspotParams,
    /// `[display]`: terminal output.
    pub display: DisplayConfig,
}

/// Errors from reading or checking the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path to the config file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path to the config file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// Hotspot parameters the engine would reject.
    #[error(transparent)]
    InvalidParams(#[from] InvalidParamsError),
}

impl AppConfig {
    /// Reads the config file, or returns defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            source: e,
        })?;

        log::debug!("Loaded config from {display}");

        Self::from_toml(&contents, &display)
    }

    /// Parses a config document. `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown values.
    pub fn from_toml(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::de::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_owned(),
            source: e,
        })
    }

    /// Rejects parameters the engine would refuse.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParams`] for invalid hotspot parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hotspots.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_map_hotspot_models::DEFAULT_EPSILON_RADIANS;
    use hotspot_map_source::Encoding;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = AppConfig::from_toml("", "test").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.display.table_rows, 10);
        assert_eq!(config.loader.encoding, Encoding::Latin1);
        assert!((config.hotspots.epsilon_radians - DEFAULT_EPSILON_RADIANS).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_tables_merge_with_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [loader]
            encoding = "utf-8"

            [loader.columns]
            id = "Ticket"

            [hotspots]
            top_k = 25

            [display]
            table_rows = 5
            "#,
            "test",
        )
        .unwrap();

        assert_eq!(config.loader.encoding, Encoding::Utf8);
        assert_eq!(config.loader.columns.id.as_deref(), Some("Ticket"));
        assert_eq!(config.loader.columns.offence, "Offences");
        assert_eq!(config.hotspots.top_k, 25);
        assert_eq!(config.hotspots.min_points, 1);
        assert_eq!(config.display.table_rows, 5);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[hotspots\ntop_k = ", "bad.toml"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_params_fail_validation() {
        let config = AppConfig::from_toml("[hotspots]\nepsilon_radians = -1.0\n", "test").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParams(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("hotspot_cli_missing_config.toml");
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
