//! Simulation run statistics.

use std::time::Duration;

use contracts::SimTime;
use observability::RunStatsAggregator;

/// Statistics from a simulation run
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    /// Sensors registered with the manager
    pub sensors_registered: usize,

    /// Names of configured sensors that could not be created
    pub sensors_rejected: Vec<String>,

    /// Last simulation time that was stepped
    pub sim_time: SimTime,

    /// Wall clock duration of the run
    pub wall_time: Duration,

    /// Measurements received from publishers
    pub measurements: u64,

    /// Run was cut short by a shutdown signal
    pub interrupted: bool,

    /// Per tick and per topic aggregates
    pub run_stats: RunStatsAggregator,
}

impl SimulationStats {
    /// Simulated seconds per wall clock second
    pub fn speedup(&self) -> f64 {
        let wall = self.wall_time.as_secs_f64();
        if wall > 0.0 {
            self.sim_time.as_secs_f64() / wall
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!();
        println!("Overview");
        println!("  Simulated time: {:.3}s", self.sim_time.as_secs_f64());
        println!("  Wall time: {:.3}s", self.wall_time.as_secs_f64());
        println!("  Speedup: {:.1}x", self.speedup());
        println!("  Sensors registered: {}", self.sensors_registered);
        if !self.sensors_rejected.is_empty() {
            println!(
                "  Sensors rejected: {} ({})",
                self.sensors_rejected.len(),
                self.sensors_rejected.join(", ")
            );
        }
        println!("  Measurements: {}", self.measurements);
        if self.interrupted {
            println!("  Interrupted before the configured duration");
        }
        println!();
        print!("{}", self.run_stats.summary());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup() {
        let stats = SimulationStats {
            sim_time: Duration::from_secs(10),
            wall_time: Duration::from_millis(500),
            ..Default::default()
        };
        assert!((stats.speedup() - 20.0).abs() < 1e-9);
        assert_eq!(SimulationStats::default().speedup(), 0.0);
    }
}
