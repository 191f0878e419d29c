//! Simulation driver: builds a Manager from configuration and steps it.

mod runner;
mod stats;

pub use runner::{Simulation, SimulationOptions};
pub use stats::SimulationStats;
