//! Altimeter sensor
//!
//! Reports vertical position relative to a reference height, and the
//! vertical velocity, along an [`AltitudeProfile`]. Noise applies to the
//! position.

use contracts::{SensorDescriptor, SensorKind, SimTime};
use noise::NoiseFactory;
use tracing::trace;

use crate::error::{Result, SensorError};
use crate::profile::AltitudeProfile;
use crate::sensor::{Sensor, SensorBase};

/// One altimeter reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AltimeterReading {
    pub timestamp: SimTime,
    /// Noisy vertical position (m)
    pub vertical_position: f64,
    /// Vertical velocity (m/s)
    pub vertical_velocity: f64,
}

/// Altimeter sensor
#[derive(Debug)]
pub struct AltimeterSensor {
    base: SensorBase,
    profile: AltitudeProfile,
    vertical_reference: f64,
    last_reading: Option<AltimeterReading>,
}

impl Default for AltimeterSensor {
    fn default() -> Self {
        Self {
            base: SensorBase::new(SensorKind::Altimeter),
            profile: AltitudeProfile::default(),
            vertical_reference: 0.0,
            last_reading: None,
        }
    }
}

impl AltimeterSensor {
    pub const VERTICAL_REFERENCE_KEY: &'static str = "vertical_reference";

    pub fn vertical_reference(&self) -> f64 {
        self.vertical_reference
    }

    pub fn set_vertical_reference(&mut self, reference: f64) {
        self.vertical_reference = reference;
    }

    pub fn profile(&self) -> AltitudeProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: AltitudeProfile) {
        self.profile = profile;
    }

    pub fn last_reading(&self) -> Option<AltimeterReading> {
        self.last_reading
    }
}

impl Sensor for AltimeterSensor {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn load(&mut self, descriptor: &SensorDescriptor, noise: &mut NoiseFactory) -> Result<()> {
        let profile = AltitudeProfile::from_descriptor(descriptor)?;
        let vertical_reference = descriptor.attribute_f64_or(Self::VERTICAL_REFERENCE_KEY, 0.0)?;

        self.base.load(descriptor, noise)?;
        self.profile = profile;
        self.vertical_reference = vertical_reference;
        self.base.set_initialized(true);
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        if !self.base.is_initialized() {
            return Err(SensorError::not_initialized(self.base.name()));
        }
        self.last_reading = None;
        Ok(())
    }

    fn update(&mut self, now: SimTime) -> Result<()> {
        if !self.base.is_initialized() {
            return Err(SensorError::not_initialized(self.base.name()));
        }

        let raw = self.profile.altitude(now) - self.vertical_reference;
        let dt = self.base.elapsed_since_update(now);
        let position = self.base.apply_noise(raw, dt);

        let reading = AltimeterReading {
            timestamp: now,
            vertical_position: position,
            vertical_velocity: self.profile.vertical_velocity(now),
        };
        self.last_reading = Some(reading);
        self.base.publish(now, position, raw);

        trace!(
            name = %self.base.name(),
            vertical_position = position,
            vertical_velocity = reading.vertical_velocity,
            "altimeter updated"
        );
        Ok(())
    }
}
