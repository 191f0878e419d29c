//! Custom noise: a caller supplied `(value, dt) -> value` function.

use std::fmt;

use crate::error::{NoiseError, Result};

/// Custom noise callback type
pub type CustomNoiseCallback = Box<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Custom noise state.
///
/// Behaves as identity until a callback is installed; the callback can be
/// installed once.
#[derive(Default)]
pub struct CustomNoise {
    callback: Option<CustomNoiseCallback>,
}

impl CustomNoise {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Install the callback.
    ///
    /// # Errors
    ///
    /// [`NoiseError::CallbackAlreadySet`] if one is already installed.
    pub fn set_callback<F>(&mut self, callback: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        if self.callback.is_some() {
            return Err(NoiseError::CallbackAlreadySet);
        }
        self.callback = Some(Box::new(callback));
        Ok(())
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn apply(&self, value: f64, dt: f64) -> f64 {
        match &self.callback {
            Some(callback) => callback(value, dt),
            None => value,
        }
    }
}

impl fmt::Debug for CustomNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomNoise")
            .field("has_callback", &self.has_callback())
            .finish()
    }
}
