//! Noise error types

use contracts::NoiseType;
use thiserror::Error;

/// Noise construction and configuration errors
///
/// `apply` itself never fails; these only come out of construction and of
/// installing a custom callback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    /// Descriptor named a type the factory cannot build
    #[error("unsupported noise type '{value}'")]
    UnsupportedType { value: String },

    /// Integer type code outside the known range
    #[error("unsupported noise type code {code}")]
    UnsupportedTypeCode { code: i32 },

    /// Parameter outside its admissible range
    #[error("invalid noise parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Callback installed on a non-custom model
    #[error("custom noise callback requires a custom noise model, got {actual}")]
    NotCustom { actual: NoiseType },

    /// Callback installed twice
    #[error("custom noise callback is already installed")]
    CallbackAlreadySet,
}

impl NoiseError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, NoiseError>;
