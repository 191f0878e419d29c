//! Sensor base contract
//!
//! [`Sensor`] is what the manager schedules; [`SensorBase`] holds the state
//! every sensor shares (identity, naming, rate, noise, publisher).

use std::any::Any;
use std::fmt;

use contracts::{
    Measurement, MeasurementCallback, SensorDescriptor, SensorId, SensorKind, SimTime, NO_SENSOR,
};
use noise::{NoiseFactory, NoiseModel};
use tracing::{debug, trace};

use crate::error::{Result, SensorError};

/// Any-casting support for sensors
///
/// Blanket-implemented, sensors never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A simulated sensor
///
/// Lifecycle: `load` from a descriptor, `init`, then repeated `update` calls
/// from the manager. Implementors provide the four required methods; the
/// accessors read through [`SensorBase`].
pub trait Sensor: AsAny + Send {
    fn base(&self) -> &SensorBase;

    fn base_mut(&mut self) -> &mut SensorBase;

    /// Configure the sensor from a descriptor.
    ///
    /// Must mark the base initialized only once everything succeeded.
    fn load(&mut self, descriptor: &SensorDescriptor, noise: &mut NoiseFactory) -> Result<()>;

    /// Post-load initialization
    fn init(&mut self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(SensorError::not_initialized(self.name()))
        }
    }

    /// Produce one sample for simulation time `now`
    fn update(&mut self, now: SimTime) -> Result<()>;

    fn id(&self) -> SensorId {
        self.base().id()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn topic(&self) -> &str {
        self.base().topic()
    }

    fn kind(&self) -> SensorKind {
        self.base().kind()
    }

    fn update_rate(&self) -> f64 {
        self.base().update_rate()
    }

    fn last_update_time(&self) -> Option<SimTime> {
        self.base().last_update_time()
    }

    fn is_initialized(&self) -> bool {
        self.base().is_initialized()
    }

    fn noise(&self) -> Option<&NoiseModel> {
        self.base().noise()
    }
}

impl dyn Sensor {
    pub fn downcast_ref<T: Sensor>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Sensor>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// State shared by all sensors
pub struct SensorBase {
    id: SensorId,
    name: String,
    topic: String,
    kind: SensorKind,
    update_rate: f64,
    last_update_time: Option<SimTime>,
    initialized: bool,
    noise: Option<NoiseModel>,
    publisher: Option<MeasurementCallback>,
}

impl SensorBase {
    /// Unloaded base for a sensor of `kind`
    pub fn new(kind: SensorKind) -> Self {
        Self {
            id: NO_SENSOR,
            name: String::new(),
            topic: String::new(),
            kind,
            update_rate: 0.0,
            last_update_time: None,
            initialized: false,
            noise: None,
            publisher: None,
        }
    }

    /// Shared part of [`Sensor::load`].
    ///
    /// Validates the descriptor, applies name, topic and rate, and builds the
    /// noise model. Leaves `initialized` untouched.
    pub fn load(&mut self, descriptor: &SensorDescriptor, noise: &mut NoiseFactory) -> Result<()> {
        if descriptor.kind != self.kind {
            return Err(SensorError::KindMismatch {
                expected: self.kind,
                actual: descriptor.kind,
            });
        }
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err(SensorError::EmptyName);
        }
        if !descriptor.update_rate.is_finite() || descriptor.update_rate < 0.0 {
            return Err(SensorError::InvalidUpdateRate {
                name: name.to_string(),
                rate: descriptor.update_rate,
            });
        }

        let model = descriptor
            .noise
            .as_ref()
            .map(|n| noise.new_noise_model(n, Some(self.kind.as_str())))
            .transpose()?;

        self.name = name.to_string();
        self.topic = match descriptor.topic.as_deref().map(str::trim) {
            Some(topic) if !topic.is_empty() => sanitize_topic(topic),
            _ => default_topic(name, self.kind),
        };
        self.update_rate = descriptor.update_rate;
        self.noise = model;

        debug!(
            name = %self.name,
            topic = %self.topic,
            kind = %self.kind,
            update_rate = self.update_rate,
            has_noise = self.noise.is_some(),
            "sensor base loaded"
        );
        Ok(())
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    /// Assign the registry id; only the first valid id sticks.
    pub fn assign_id(&mut self, id: SensorId) -> bool {
        if self.id.is_valid() || !id.is_valid() {
            return false;
        }
        self.id = id;
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: &str) {
        self.topic = sanitize_topic(topic);
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn update_rate(&self) -> f64 {
        self.update_rate
    }

    pub fn set_update_rate(&mut self, rate_hz: f64) -> Result<()> {
        if !rate_hz.is_finite() || rate_hz < 0.0 {
            return Err(SensorError::InvalidUpdateRate {
                name: self.name.clone(),
                rate: rate_hz,
            });
        }
        self.update_rate = rate_hz;
        Ok(())
    }

    pub fn last_update_time(&self) -> Option<SimTime> {
        self.last_update_time
    }

    pub fn set_last_update_time(&mut self, time: SimTime) {
        self.last_update_time = Some(time);
    }

    /// Seconds since the last recorded update, 0 before the first one or
    /// when `now` lies before it
    pub fn elapsed_since_update(&self, now: SimTime) -> f64 {
        self.last_update_time
            .map(|last| now.saturating_sub(last).as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn noise(&self) -> Option<&NoiseModel> {
        self.noise.as_ref()
    }

    pub fn noise_mut(&mut self) -> Option<&mut NoiseModel> {
        self.noise.as_mut()
    }

    pub fn set_noise(&mut self, noise: Option<NoiseModel>) {
        self.noise = noise;
    }

    /// Apply the noise model, identity when there is none
    pub fn apply_noise(&mut self, value: f64, dt: f64) -> f64 {
        match self.noise.as_mut() {
            Some(model) => model.apply(value, dt),
            None => value,
        }
    }

    pub fn set_publisher(&mut self, publisher: MeasurementCallback) {
        self.publisher = Some(publisher);
    }

    pub fn has_publisher(&self) -> bool {
        self.publisher.is_some()
    }

    /// Build a measurement stamped with this sensor's identity and hand it to
    /// the publisher. Returns the measurement either way.
    pub fn publish(&self, timestamp: SimTime, value: f64, raw_value: f64) -> Measurement {
        let measurement = Measurement {
            sensor_id: self.id,
            name: self.name.clone(),
            topic: self.topic.clone(),
            kind: self.kind,
            timestamp,
            value,
            raw_value,
        };
        if let Some(publisher) = &self.publisher {
            publisher(measurement.clone());
            trace!(topic = %self.topic, value, "measurement published");
        }
        measurement
    }
}

impl fmt::Debug for SensorBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorBase")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("topic", &self.topic)
            .field("kind", &self.kind)
            .field("update_rate", &self.update_rate)
            .field("last_update_time", &self.last_update_time)
            .field("initialized", &self.initialized)
            .field("noise", &self.noise.as_ref().map(NoiseModel::noise_type))
            .field("has_publisher", &self.publisher.is_some())
            .finish()
    }
}

/// `/<name>/<kind>`, sanitized
pub fn default_topic(name: &str, kind: SensorKind) -> String {
    sanitize_topic(&format!("{}/{}", name.trim(), kind.as_str()))
}

/// Whitespace becomes `_`, a leading `/` is enforced
pub fn sanitize_topic(topic: &str) -> String {
    let cleaned: String = topic
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if cleaned.starts_with('/') {
        cleaned
    } else {
        format!("/{cleaned}")
    }
}
