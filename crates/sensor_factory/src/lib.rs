//! # Sensor Factory
//!
//! Sensor base contract and construction.
//!
//! Responsibilities:
//! - [`Sensor`] trait and the shared [`SensorBase`] state
//! - Build sensors from a `SensorDescriptor` (load, then init)
//! - Built-in non-rendering sensors: [`AltimeterSensor`], [`AirPressureSensor`]

pub mod air_pressure;
pub mod altimeter;
pub mod error;
pub mod factory;
pub mod profile;
pub mod sensor;

pub use air_pressure::{isa_pressure, AirPressureSensor};
pub use altimeter::{AltimeterReading, AltimeterSensor};
pub use error::{Result, SensorError};
pub use factory::SensorFactory;
pub use profile::AltitudeProfile;
pub use sensor::{default_topic, sanitize_topic, AsAny, Sensor, SensorBase};
