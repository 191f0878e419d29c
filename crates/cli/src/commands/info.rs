//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::{NoiseDescriptor, SensorDescriptor, SimulationConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::load_config;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    clock: ClockInfo,
    sensors: Vec<SensorInfo>,
}

#[derive(Serialize)]
struct ClockInfo {
    step_ms: u64,
    duration_s: f64,
    tick_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct SensorInfo {
    name: String,
    kind: String,
    topic: String,
    update_rate_hz: f64,
    simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    noise: Option<NoiseDescriptor>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl SensorInfo {
    fn new(sensor: &SensorDescriptor, detailed: bool) -> Self {
        Self {
            name: sensor.name.clone(),
            kind: sensor.kind.to_string(),
            topic: resolved_topic(sensor),
            update_rate_hz: sensor.update_rate,
            simulated: !sensor.kind.requires_rendering(),
            noise: if detailed { sensor.noise.clone() } else { None },
            attributes: if detailed {
                sensor.attributes.clone().into_iter().collect()
            } else {
                BTreeMap::new()
            },
        }
    }
}

/// Topic the sensor will publish on once loaded
fn resolved_topic(sensor: &SensorDescriptor) -> String {
    match &sensor.topic {
        Some(topic) => sensor_factory::sanitize_topic(topic),
        None => sensor_factory::default_topic(&sensor.name, sensor.kind),
    }
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args.sensors);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args.sensors);
    }

    Ok(())
}

fn build_config_info(config: &SimulationConfig, detailed: bool) -> ConfigInfo {
    ConfigInfo {
        clock: ClockInfo {
            step_ms: config.simulation.step_ms,
            duration_s: config.simulation.duration_s,
            tick_count: config.simulation.tick_count(),
            seed: config.simulation.seed,
        },
        sensors: config
            .sensors
            .iter()
            .map(|s| SensorInfo::new(s, detailed))
            .collect(),
    }
}

fn print_config_info(config: &SimulationConfig, detailed: bool) {
    let info = build_config_info(config, detailed);

    println!("=== sensorsim configuration ===\n");

    println!("Clock");
    println!("  ├─ Step: {} ms", info.clock.step_ms);
    println!("  ├─ Duration: {} s", info.clock.duration_s);
    println!("  ├─ Ticks: {}", info.clock.tick_count);
    match info.clock.seed {
        Some(seed) => println!("  └─ Seed: {}", seed),
        None => println!("  └─ Seed: (entropy)"),
    }

    println!("\nSensors ({})", info.sensors.len());
    for (i, sensor) in info.sensors.iter().enumerate() {
        let is_last = i == info.sensors.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let rate = if sensor.update_rate_hz > 0.0 {
            format!("{} Hz", sensor.update_rate_hz)
        } else {
            "every tick".to_string()
        };
        let external = if sensor.simulated { "" } else { ", external" };
        println!(
            "  {} {} ({}, {}{}) -> {}",
            prefix, sensor.name, sensor.kind, rate, external, sensor.topic
        );

        if !detailed {
            continue;
        }
        match &sensor.noise {
            Some(noise) => println!(
                "  {}   noise: {} mean={} stddev={} bias_mean={} bias_stddev={} precision={}",
                child_prefix,
                noise.noise_type,
                noise.mean,
                noise.stddev,
                noise.bias_mean,
                noise.bias_stddev,
                noise.precision
            ),
            None => println!("  {}   noise: none", child_prefix),
        }
        for (key, value) in &sensor.attributes {
            println!("  {}   {} = {}", child_prefix, key, value);
        }
    }

    println!();
}
