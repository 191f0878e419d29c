//! SimulationConfig - declarative simulation document
//!
//! Clock settings plus the sensors to create. Loaded by `config_loader`,
//! driven by the CLI.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::{SensorDescriptor, SimTime};

/// Root simulation document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct SimulationConfig {
    /// Clock settings
    #[serde(default)]
    #[validate(nested)]
    pub simulation: SimulationSettings,

    /// Sensors to create, in registration order
    #[serde(default)]
    #[validate(nested)]
    pub sensors: Vec<SensorDescriptor>,
}

/// Clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SimulationSettings {
    /// Noise master seed; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Clock step (ms)
    #[serde(default = "default_step_ms")]
    #[validate(range(min = 1))]
    pub step_ms: u64,

    /// Total simulated time (s)
    #[serde(default = "default_duration_s")]
    #[validate(range(min = 0.0))]
    pub duration_s: f64,
}

fn default_step_ms() -> u64 {
    10
}

fn default_duration_s() -> f64 {
    1.0
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            step_ms: default_step_ms(),
            duration_s: default_duration_s(),
        }
    }
}

impl SimulationSettings {
    /// Clock step as a duration
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    /// Total simulated time, zero when not representable
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_s).unwrap_or_default()
    }

    /// Number of ticks [`ticks`](Self::ticks) yields, saturating at `u64::MAX`
    pub fn tick_count(&self) -> u64 {
        if self.step_ms == 0 {
            return 0;
        }
        let steps = self.duration().as_millis() / u128::from(self.step_ms);
        u64::try_from(steps).map_or(u64::MAX, |steps| steps.saturating_add(1))
    }

    /// Tick times `0, step, 2·step, ..` up to and including the duration
    pub fn ticks(&self) -> impl Iterator<Item = SimTime> {
        let step_ms = self.step_ms;
        (0..self.tick_count()).map(move |k| Duration::from_millis(step_ms.saturating_mul(k)))
    }
}
