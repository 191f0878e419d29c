//! Measurement - sensor output
//!
//! What a concrete sensor hands to its publisher after noise was applied.
//! The transport behind the callback is outside this workspace.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{SensorId, SensorKind, SimTime};

/// One published measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Registry id of the producing sensor
    pub sensor_id: SensorId,

    /// Sensor name
    pub name: String,

    /// Publishing topic
    pub topic: String,

    /// Sensor kind
    pub kind: SensorKind,

    /// Simulation time of the sample
    pub timestamp: SimTime,

    /// Value after noise
    pub value: f64,

    /// Value before noise
    pub raw_value: f64,
}

/// Measurement callback type
///
/// Uses `Arc` so that one publisher can be shared by several sensors.
pub type MeasurementCallback = Arc<dyn Fn(Measurement) + Send + Sync>;
