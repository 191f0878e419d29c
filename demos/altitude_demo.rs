//! Altitude Demo
//!
//! Registers an altimeter with a custom noise model next to the sensors of a
//! configuration file, steps the manager for a few seconds and prints the
//! readings.
//!
//! Run with: cargo run -p demos --bin altitude_demo [config.toml]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{SensorDescriptor, SensorKind, SimulationConfig, TracingSink};
use manager::Manager;
use noise::NoiseModel;
use observability::RunStatsAggregator;
use sensor_factory::{AltimeterSensor, Sensor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading sensor config");
            ConfigLoader::load_from_path(std::path::Path::new(&path))?
        }
        None => SimulationConfig::default(),
    };

    let mut manager = Manager::with_seed(config.simulation.seed.unwrap_or(1), TracingSink::shared());
    manager.init();
    for descriptor in &config.sensors {
        manager.create_from_descriptor(descriptor);
    }

    // an altimeter whose noise is a slow drift rather than a distribution
    let descriptor = SensorDescriptor::new("drifting_alt", SensorKind::Altimeter)
        .with_update_rate(5.0)
        .with_attribute("altitude_offset", 100.0);
    let drifting = manager
        .create_sensor::<AltimeterSensor>(&descriptor)
        .ok_or("altimeter could not be created")?;
    let mut model = NoiseModel::custom();
    model.set_custom_callback(|value, dt| value + 0.5 * dt)?;
    drifting.base_mut().set_noise(Some(model));
    let drifting_id = drifting.id();

    let stats = Arc::new(Mutex::new(RunStatsAggregator::new()));
    let collector = stats.clone();
    let publisher: contracts::MeasurementCallback = Arc::new(move |m| {
        if let Ok(mut stats) = collector.lock() {
            stats.record_measurement(&m);
        }
    });
    for sensor in manager.iter_mut() {
        sensor.base_mut().set_publisher(publisher.clone());
    }

    for sensor in manager.iter() {
        let mut description = String::new();
        if let Some(noise) = sensor.noise() {
            noise.print(&mut description)?;
        }
        tracing::info!(id = %sensor.id(), name = %sensor.name(), noise = %description, "registered");
    }

    let step = Duration::from_millis(10);
    for k in 0..=300u32 {
        let now = step * k;
        let report = manager.run_once(now, false);
        if let Ok(mut stats) = stats.lock() {
            stats.update(&report, 0.0);
        }

        if let Some(reading) = manager
            .sensor_as::<AltimeterSensor>(drifting_id)
            .and_then(AltimeterSensor::last_reading)
            .filter(|r| r.timestamp == now)
        {
            println!(
                "t={:>5.2}s  drifting altitude {:>8.3} m",
                now.as_secs_f64(),
                reading.vertical_position
            );
        }
    }

    if let Ok(stats) = stats.lock() {
        print!("{}", stats.summary());
    }
    Ok(())
}
