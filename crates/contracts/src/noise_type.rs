//! NoiseType - noise model variant tag
//!
//! The integer codes are stable and appear in diagnostic text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Noise model variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum NoiseType {
    /// Pass-through
    None = 0,
    /// User supplied callback
    Custom = 1,
    /// Additive Gaussian with fixed bias
    Gaussian = 2,
    /// Gaussian followed by rounding to a precision step
    GaussianQuantized = 3,
}

impl NoiseType {
    /// Stable integer code of the tag.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Descriptor spelling of the tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Custom => "custom",
            Self::Gaussian => "gaussian",
            Self::GaussianQuantized => "gaussian_quantized",
        }
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "custom" => Ok(Self::Custom),
            "gaussian" => Ok(Self::Gaussian),
            "gaussian_quantized" => Ok(Self::GaussianQuantized),
            _ => Err(ContractError::unknown_variant("noise type", s)),
        }
    }
}

impl TryFrom<i32> for NoiseType {
    type Error = ContractError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Custom),
            2 => Ok(Self::Gaussian),
            3 => Ok(Self::GaussianQuantized),
            other => Err(ContractError::unknown_variant(
                "noise type code",
                other.to_string(),
            )),
        }
    }
}
