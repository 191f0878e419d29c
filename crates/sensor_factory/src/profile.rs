//! Synthetic altitude trajectory driving the built-in sensors.

use std::f64::consts::TAU;

use contracts::{SensorDescriptor, SimTime};

use crate::error::Result;

/// `altitude(t) = offset + amplitude * sin(2π · frequency · t)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltitudeProfile {
    /// Mean altitude (m)
    pub offset: f64,
    /// Oscillation amplitude (m)
    pub amplitude: f64,
    /// Oscillation frequency (Hz)
    pub frequency: f64,
}

impl AltitudeProfile {
    pub const OFFSET_KEY: &'static str = "altitude_offset";
    pub const AMPLITUDE_KEY: &'static str = "altitude_amplitude";
    pub const FREQUENCY_KEY: &'static str = "altitude_frequency";

    /// Constant altitude
    pub fn fixed(altitude: f64) -> Self {
        Self {
            offset: altitude,
            ..Self::default()
        }
    }

    /// Read the profile attributes, missing ones default to 0
    pub fn from_descriptor(descriptor: &SensorDescriptor) -> Result<Self> {
        Ok(Self {
            offset: descriptor.attribute_f64_or(Self::OFFSET_KEY, 0.0)?,
            amplitude: descriptor.attribute_f64_or(Self::AMPLITUDE_KEY, 0.0)?,
            frequency: descriptor.attribute_f64_or(Self::FREQUENCY_KEY, 0.0)?,
        })
    }

    pub fn altitude(&self, t: SimTime) -> f64 {
        self.offset + self.amplitude * (TAU * self.frequency * t.as_secs_f64()).sin()
    }

    /// Time derivative of [`altitude`](Self::altitude) (m/s)
    pub fn vertical_velocity(&self, t: SimTime) -> f64 {
        let w = TAU * self.frequency;
        self.amplitude * w * (w * t.as_secs_f64()).cos()
    }
}
