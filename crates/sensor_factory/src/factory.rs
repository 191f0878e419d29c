//! SensorFactory 核心实现
//!
//! 从 SensorDescriptor 创建传感器：load，然后 init。

use contracts::{Diagnostic, SensorDescriptor, SensorKind, SharedSink};
use noise::NoiseFactory;
use tracing::{info, instrument, warn};

use crate::air_pressure::AirPressureSensor;
use crate::altimeter::AltimeterSensor;
use crate::error::{Result, SensorError};
use crate::sensor::Sensor;

const COMPONENT: &str = "sensor_factory";

/// Sensor Factory
///
/// Builds sensors from descriptors. Owns the noise factory so that every
/// sensor's noise model draws from the same master stream. Failures are
/// reported on the diagnostic sink; the `create_*` methods then return `None`.
pub struct SensorFactory {
    noise: NoiseFactory,
    sink: SharedSink,
}

impl SensorFactory {
    /// 创建新的 SensorFactory
    pub fn new(sink: SharedSink) -> Self {
        Self {
            noise: NoiseFactory::new(sink.clone()),
            sink,
        }
    }

    /// Factory whose noise models are reproducible
    pub fn with_seed(seed: u64, sink: SharedSink) -> Self {
        Self {
            noise: NoiseFactory::with_seed(seed, sink.clone()),
            sink,
        }
    }

    pub fn noise_factory(&mut self) -> &mut NoiseFactory {
        &mut self.noise
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Create a `T` from `descriptor`, `None` on failure.
    pub fn create_sensor<T: Sensor + Default>(&mut self, descriptor: &SensorDescriptor) -> Option<Box<T>> {
        let result = self.try_create_sensor::<T>(descriptor);
        self.report(descriptor, result)
    }

    /// Create whichever built-in sensor matches the descriptor kind.
    pub fn create_dyn(&mut self, descriptor: &SensorDescriptor) -> Option<Box<dyn Sensor>> {
        let result = self.try_create_dyn(descriptor);
        self.report(descriptor, result)
    }

    /// Like [`create_sensor`](Self::create_sensor) but hands back the error.
    #[instrument(
        name = "sensor_factory_create_sensor",
        skip(self, descriptor),
        fields(sensor_name = %descriptor.name, kind = %descriptor.kind)
    )]
    pub fn try_create_sensor<T: Sensor + Default>(&mut self, descriptor: &SensorDescriptor) -> Result<Box<T>> {
        let mut sensor = Box::<T>::default();
        sensor.load(descriptor, &mut self.noise)?;
        sensor.init()?;

        info!(topic = %sensor.topic(), "sensor created");
        Ok(sensor)
    }

    /// Like [`create_dyn`](Self::create_dyn) but hands back the error.
    pub fn try_create_dyn(&mut self, descriptor: &SensorDescriptor) -> Result<Box<dyn Sensor>> {
        match descriptor.kind {
            SensorKind::Altimeter => Ok(self.try_create_sensor::<AltimeterSensor>(descriptor)?),
            SensorKind::AirPressure => Ok(self.try_create_sensor::<AirPressureSensor>(descriptor)?),
            kind => Err(SensorError::UnsupportedKind { kind }),
        }
    }

    fn report<S: ?Sized>(&self, descriptor: &SensorDescriptor, result: Result<Box<S>>) -> Option<Box<S>> {
        match result {
            Ok(sensor) => Some(sensor),
            Err(e) => {
                warn!(
                    sensor_name = %descriptor.name,
                    kind = %descriptor.kind,
                    error = %e,
                    "sensor creation failed"
                );
                let hint = if descriptor.kind.requires_rendering() {
                    " (rendering sensors need an external implementation)"
                } else {
                    ""
                };
                self.sink.report(Diagnostic::error(
                    COMPONENT,
                    format!("unable to create sensor '{}': {e}{hint}", descriptor.name),
                ));
                None
            }
        }
    }
}
