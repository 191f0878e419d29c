//! Error types for CLI operations.

use std::path::Path;

use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Failed to load configuration from {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ContractError,
    },

    /// A command line override produced an unusable clock
    #[error("Invalid override for {field}: {message}")]
    InvalidOverride {
        field: &'static str,
        message: String,
    },

    /// Strict mode and at least one sensor was rejected
    #[error("{count} configured sensor(s) could not be created: {names}")]
    SensorsRejected { count: usize, names: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn config(path: &Path, source: ContractError) -> Self {
        Self::Config {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn invalid_override(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            field,
            message: message.into(),
        }
    }

    pub fn sensors_rejected(names: &[String]) -> Self {
        Self::SensorsRejected {
            count: names.len(),
            names: names.join(", "),
        }
    }
}

/// Load a configuration file, mapping failures onto [`CliError`].
pub fn load_config(path: &Path) -> Result<contracts::SimulationConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }
    config_loader::ConfigLoader::load_from_path(path).map_err(|e| CliError::config(path, e))
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
