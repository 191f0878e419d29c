//! Noise model enum

use std::fmt;

use contracts::NoiseType;

use crate::custom::CustomNoise;
use crate::error::{NoiseError, Result};
use crate::gaussian::GaussianNoiseModel;

/// Noise applied to a scalar measurement.
///
/// Static dispatch over a closed set of variants.
#[derive(Debug, Default)]
pub enum NoiseModel {
    /// Identity
    #[default]
    None,
    /// Gaussian, optionally quantized
    Gaussian(GaussianNoiseModel),
    /// Caller supplied function
    Custom(CustomNoise),
}

impl NoiseModel {
    pub fn none() -> Self {
        Self::None
    }

    /// Custom model without a callback (identity until one is installed)
    pub fn custom() -> Self {
        Self::Custom(CustomNoise::new())
    }

    pub fn noise_type(&self) -> NoiseType {
        match self {
            Self::None => NoiseType::None,
            Self::Gaussian(model) => model.noise_type(),
            Self::Custom(_) => NoiseType::Custom,
        }
    }

    /// Apply noise to `value`; `dt` is the time in seconds since the previous
    /// sample (only custom callbacks look at it).
    #[inline]
    pub fn apply(&mut self, value: f64, dt: f64) -> f64 {
        match self {
            Self::None => value,
            Self::Gaussian(model) => model.apply(value),
            Self::Custom(custom) => custom.apply(value, dt),
        }
    }

    /// Install the callback of a custom model.
    ///
    /// # Errors
    ///
    /// [`NoiseError::NotCustom`] on other variants,
    /// [`NoiseError::CallbackAlreadySet`] on a second install.
    pub fn set_custom_callback<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        match self {
            Self::Custom(custom) => custom.set_callback(callback),
            other => Err(NoiseError::NotCustom {
                actual: other.noise_type(),
            }),
        }
    }

    pub fn as_gaussian(&self) -> Option<&GaussianNoiseModel> {
        match self {
            Self::Gaussian(model) => Some(model),
            _ => None,
        }
    }

    pub fn print(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        match self {
            Self::Gaussian(model) => model.print(out),
            other => write_base_description(other.noise_type(), out),
        }
    }
}

/// Description used by variants without anything more specific to report.
pub fn write_base_description(noise_type: NoiseType, out: &mut dyn fmt::Write) -> fmt::Result {
    write!(
        out,
        "Noise with type[{}] does not have an overloaded Print function. No more information is available.",
        noise_type.code()
    )
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f)
    }
}

impl From<GaussianNoiseModel> for NoiseModel {
    fn from(model: GaussianNoiseModel) -> Self {
        Self::Gaussian(model)
    }
}

impl From<CustomNoise> for NoiseModel {
    fn from(custom: CustomNoise) -> Self {
        Self::Custom(custom)
    }
}
