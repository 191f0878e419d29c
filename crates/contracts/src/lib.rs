//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the sensor simulation:
//! sensor identities, declarative descriptors, the noise variant tag, the
//! measurement handed to publishers and the injected diagnostics sink.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Simulation time is a [`SimTime`] (`Duration` since simulation start)
//! - Update rates are expressed in Hz; `0` means "every tick"

mod descriptor;
mod diagnostics;
mod error;
mod measurement;
mod noise_type;
mod report;
mod sensor_id;
mod simulation;
mod time;

pub use descriptor::*;
pub use diagnostics::*;
pub use error::*;
pub use measurement::*;
pub use noise_type::NoiseType;
pub use report::RunOnceReport;
pub use sensor_id::{SensorId, SensorIdAllocator, NO_SENSOR};
pub use simulation::{SimulationConfig, SimulationSettings};
pub use time::{is_every_tick, period_elapsed, SimTime};
