//! Air pressure sensor
//!
//! Barometric pressure from the International Standard Atmosphere at
//! `reference_altitude + altitude(t)`.

use contracts::{SensorDescriptor, SensorKind, SimTime};
use noise::NoiseFactory;
use tracing::trace;

use crate::error::{Result, SensorError};
use crate::profile::AltitudeProfile;
use crate::sensor::{Sensor, SensorBase};

/// Sea level standard pressure (Pa)
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;
/// Sea level standard temperature (K)
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;
/// Troposphere temperature lapse rate (K/m)
pub const LAPSE_RATE: f64 = 0.0065;
/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.314_459_8;
/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.806_65;
/// Molar mass of dry air (kg/mol)
pub const MOLAR_MASS_AIR: f64 = 0.028_964_4;
/// Upper bound of the troposphere (m)
pub const TROPOPAUSE_ALTITUDE: f64 = 11_000.0;

/// ISA pressure (Pa) at `altitude` metres.
///
/// Lapse-rate model up to the tropopause, isothermal above it.
pub fn isa_pressure(altitude: f64) -> f64 {
    let exponent = GRAVITY * MOLAR_MASS_AIR / (GAS_CONSTANT * LAPSE_RATE);
    let troposphere = |h: f64| SEA_LEVEL_PRESSURE * (1.0 - LAPSE_RATE * h / SEA_LEVEL_TEMPERATURE).powf(exponent);

    if altitude <= TROPOPAUSE_ALTITUDE {
        troposphere(altitude)
    } else {
        let tropopause_temperature = SEA_LEVEL_TEMPERATURE - LAPSE_RATE * TROPOPAUSE_ALTITUDE;
        troposphere(TROPOPAUSE_ALTITUDE)
            * (-GRAVITY * MOLAR_MASS_AIR * (altitude - TROPOPAUSE_ALTITUDE)
                / (GAS_CONSTANT * tropopause_temperature))
                .exp()
    }
}

/// Air pressure sensor
#[derive(Debug)]
pub struct AirPressureSensor {
    base: SensorBase,
    profile: AltitudeProfile,
    reference_altitude: f64,
    last_pressure: Option<f64>,
}

impl Default for AirPressureSensor {
    fn default() -> Self {
        Self {
            base: SensorBase::new(SensorKind::AirPressure),
            profile: AltitudeProfile::default(),
            reference_altitude: 0.0,
            last_pressure: None,
        }
    }
}

impl AirPressureSensor {
    pub const REFERENCE_ALTITUDE_KEY: &'static str = "reference_altitude";

    pub fn reference_altitude(&self) -> f64 {
        self.reference_altitude
    }

    pub fn set_reference_altitude(&mut self, altitude: f64) {
        self.reference_altitude = altitude;
    }

    pub fn set_profile(&mut self, profile: AltitudeProfile) {
        self.profile = profile;
    }

    /// Last noisy pressure (Pa)
    pub fn pressure(&self) -> Option<f64> {
        self.last_pressure
    }
}

impl Sensor for AirPressureSensor {
    fn base(&self) -> &SensorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SensorBase {
        &mut self.base
    }

    fn load(&mut self, descriptor: &SensorDescriptor, noise: &mut NoiseFactory) -> Result<()> {
        let profile = AltitudeProfile::from_descriptor(descriptor)?;
        let reference_altitude = descriptor.attribute_f64_or(Self::REFERENCE_ALTITUDE_KEY, 0.0)?;

        self.base.load(descriptor, noise)?;
        self.profile = profile;
        self.reference_altitude = reference_altitude;
        self.base.set_initialized(true);
        Ok(())
    }

    fn init(&mut self) -> Result<()> {
        if !self.base.is_initialized() {
            return Err(SensorError::not_initialized(self.base.name()));
        }
        self.last_pressure = None;
        Ok(())
    }

    fn update(&mut self, now: SimTime) -> Result<()> {
        if !self.base.is_initialized() {
            return Err(SensorError::not_initialized(self.base.name()));
        }

        let altitude = self.reference_altitude + self.profile.altitude(now);
        let raw = isa_pressure(altitude);
        if !raw.is_finite() {
            return Err(SensorError::update_failed(
                self.base.name(),
                format!("no pressure defined at altitude {altitude} m"),
            ));
        }
        let dt = self.base.elapsed_since_update(now);
        let pressure = self.base.apply_noise(raw, dt);

        self.last_pressure = Some(pressure);
        self.base.publish(now, pressure, raw);

        trace!(name = %self.base.name(), altitude, pressure, "air pressure updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MemorySink, NoiseDescriptor};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn noise_factory() -> NoiseFactory {
        NoiseFactory::with_seed(5, Arc::new(MemorySink::new()))
    }

    #[test]
    fn test_isa_reference_points() {
        assert!((isa_pressure(0.0) - SEA_LEVEL_PRESSURE).abs() < 1e-6);
        // standard atmosphere tables: 89 875 Pa at 1 km, 22 632 Pa at 11 km
        assert!((isa_pressure(1_000.0) - 89_875.0).abs() < 50.0);
        assert!((isa_pressure(11_000.0) - 22_632.0).abs() < 50.0);
        assert!(isa_pressure(15_000.0) < isa_pressure(11_000.0));
        assert!(isa_pressure(-100.0) > SEA_LEVEL_PRESSURE);
    }

    #[test]
    fn test_update_publishes_pressure() {
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();

        let descriptor = SensorDescriptor::new("baro", SensorKind::AirPressure)
            .with_attribute(AirPressureSensor::REFERENCE_ALTITUDE_KEY, 1_000.0);
        let mut sensor = AirPressureSensor::default();
        sensor.load(&descriptor, &mut noise_factory()).unwrap();
        sensor.init().unwrap();
        sensor
            .base_mut()
            .set_publisher(Arc::new(move |m| sink.lock().unwrap().push(m)));

        sensor.update(Duration::from_secs(1)).unwrap();

        let published = published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "/baro/air_pressure");
        assert_eq!(published[0].value, published[0].raw_value);
        assert!((sensor.pressure().unwrap() - isa_pressure(1_000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_noise() {
        let descriptor = SensorDescriptor::new("baro", SensorKind::AirPressure)
            .with_noise(NoiseDescriptor::gaussian(0.0, 0.0, 12.0, 0.0));
        let mut sensor = AirPressureSensor::default();
        sensor.load(&descriptor, &mut noise_factory()).unwrap();
        sensor.update(Duration::ZERO).unwrap();
        assert!((sensor.pressure().unwrap() - (SEA_LEVEL_PRESSURE + 12.0)).abs() < 1e-6);
    }

    #[test]
    fn test_undefined_altitude_fails_update() {
        let descriptor = SensorDescriptor::new("baro", SensorKind::AirPressure)
            .with_attribute(AirPressureSensor::REFERENCE_ALTITUDE_KEY, 50_000.0);
        let mut sensor = AirPressureSensor::default();
        sensor.load(&descriptor, &mut noise_factory()).unwrap();
        // well above the tropopause the isothermal layer still yields a value
        sensor.update(Duration::ZERO).unwrap();

        sensor.set_reference_altitude(f64::NAN);
        assert!(matches!(
            sensor.update(Duration::ZERO),
            Err(SensorError::UpdateFailed { .. })
        ));
    }
}
