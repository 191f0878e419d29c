//! Sensor factory error types

use contracts::{ContractError, SensorKind};
use noise::NoiseError;
use thiserror::Error;

/// Sensor loading and update errors
#[derive(Debug, Error)]
pub enum SensorError {
    /// Descriptor kind differs from the sensor type it was handed to
    #[error("descriptor of kind '{actual}' cannot load a '{expected}' sensor")]
    KindMismatch {
        expected: SensorKind,
        actual: SensorKind,
    },

    /// Empty sensor name
    #[error("sensor name must not be empty")]
    EmptyName,

    /// Negative or non-finite update rate
    #[error("invalid update rate {rate} for sensor '{name}'")]
    InvalidUpdateRate { name: String, rate: f64 },

    /// No built-in implementation for the kind
    #[error("sensor kind '{kind}' is not supported")]
    UnsupportedKind { kind: SensorKind },

    /// Update or init before a successful load
    #[error("sensor '{name}' is not initialized")]
    NotInitialized { name: String },

    /// Update failed for a sensor specific reason
    #[error("sensor '{name}' update failed: {message}")]
    UpdateFailed { name: String, message: String },

    /// Noise model construction failed
    #[error(transparent)]
    Noise(#[from] NoiseError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SensorError {
    /// Create update failure error
    pub fn update_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_initialized(name: impl Into<String>) -> Self {
        Self::NotInitialized { name: name.into() }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SensorError>;
