//! Simulation runner - owns the Manager and the clock.

use std::future::Future;

use contracts::{Measurement, SharedSink, SimulationConfig, SimulationSettings};
use manager::Manager;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::SimulationStats;

/// Runner options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Step every sensor on every tick
    pub force: bool,

    /// Wall clock speed multiplier (None = as fast as possible)
    pub realtime_speed: Option<f64>,

    /// Print each measurement as it is received
    pub print_measurements: bool,
}

/// A configured simulation ready to run
pub struct Simulation {
    manager: Manager,
    settings: SimulationSettings,
    options: SimulationOptions,
    measurements: mpsc::UnboundedReceiver<Measurement>,
    rejected: Vec<String>,
}

impl Simulation {
    /// Register every configured sensor and attach a shared publisher.
    ///
    /// Sensors that cannot be created are reported on `sink` and listed in
    /// [`rejected`](Self::rejected); the rest of the configuration still runs.
    pub fn build(config: &SimulationConfig, options: SimulationOptions, sink: SharedSink) -> Self {
        let mut manager = match config.simulation.seed {
            Some(seed) => Manager::with_seed(seed, sink),
            None => Manager::new(sink),
        };
        manager.init();

        let mut rejected = Vec::new();
        for descriptor in &config.sensors {
            let id = manager.create_from_descriptor(descriptor);
            if id.is_valid() {
                debug!(sensor_id = %id, name = %descriptor.name, "sensor registered");
            } else {
                warn!(name = %descriptor.name, kind = %descriptor.kind, "sensor rejected");
                rejected.push(descriptor.name.clone());
            }
        }

        let (tx, measurements) = mpsc::unbounded_channel();
        let publisher: contracts::MeasurementCallback = std::sync::Arc::new(move |m| {
            // receiver is dropped only once run() has returned
            let _ = tx.send(m);
        });
        for sensor in manager.iter_mut() {
            sensor.base_mut().set_publisher(publisher.clone());
        }

        info!(
            registered = manager.len(),
            rejected = rejected.len(),
            step_ms = config.simulation.step_ms,
            duration_s = config.simulation.duration_s,
            "Simulation built"
        );

        Self {
            manager,
            settings: config.simulation.clone(),
            options,
            measurements,
            rejected,
        }
    }

    /// Names of configured sensors that could not be created
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Step the clock until the configured duration or until `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> SimulationStats {
        tokio::pin!(shutdown);

        let started = Instant::now();
        let mut stats = SimulationStats {
            sensors_registered: self.manager.len(),
            sensors_rejected: self.rejected.clone(),
            ..Default::default()
        };

        for now in self.settings.ticks() {
            let interrupted = match self.options.realtime_speed {
                Some(speed) => {
                    let deadline = started + now.div_f64(speed);
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => true,
                        _ = tokio::time::sleep_until(deadline) => false,
                    }
                }
                None => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => true,
                        _ = tokio::task::yield_now() => false,
                    }
                }
            };
            if interrupted {
                warn!(sim_time_s = now.as_secs_f64(), "Shutdown requested, stopping simulation");
                stats.interrupted = true;
                break;
            }

            let tick_started = Instant::now();
            let report = self.manager.run_once(now, self.options.force);
            let tick_ms = tick_started.elapsed().as_secs_f64() * 1000.0;

            stats.run_stats.update(&report, tick_ms);
            stats.sim_time = now;
            self.drain_measurements(&mut stats);
        }

        stats.wall_time = started.elapsed();
        stats
    }

    fn drain_measurements(&mut self, stats: &mut SimulationStats) {
        while let Ok(measurement) = self.measurements.try_recv() {
            observability::record_measurement(&measurement);
            stats.run_stats.record_measurement(&measurement);
            stats.measurements += 1;

            if self.options.print_measurements {
                println!(
                    "{:>10.3}s  {:<32} {:>16.6}  (raw {:.6})",
                    measurement.timestamp.as_secs_f64(),
                    measurement.topic,
                    measurement.value,
                    measurement.raw_value
                );
            }
        }
    }
}
