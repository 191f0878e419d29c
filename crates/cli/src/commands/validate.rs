//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{NoiseType, SimulationConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::load_config;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    step_ms: u64,
    duration_s: f64,
    tick_count: u64,
    seeded: bool,
    sensor_count: usize,
    noisy_sensor_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let noisy_sensor_count = config
                .sensors
                .iter()
                .filter(|s| {
                    s.noise
                        .as_ref()
                        .is_some_and(|n| n.parsed_type().is_ok_and(|t| t != NoiseType::None))
                })
                .count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    step_ms: config.simulation.step_ms,
                    duration_s: config.simulation.duration_s,
                    tick_count: config.simulation.tick_count(),
                    seeded: config.simulation.seed.is_some(),
                    sensor_count: config.sensors.len(),
                    noisy_sensor_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &SimulationConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.sensors.is_empty() {
        warnings.push("No sensors configured - the run will only advance the clock".to_string());
    }
    if config.simulation.duration_s == 0.0 {
        warnings.push("simulation.duration_s is 0 - only the t=0 tick will run".to_string());
    }
    if config.simulation.seed.is_none() {
        warnings.push("simulation.seed is not set - noise will differ between runs".to_string());
    }

    let tick_rate = 1000.0 / config.simulation.step_ms as f64;
    for sensor in &config.sensors {
        if sensor.kind.requires_rendering() {
            warnings.push(format!(
                "Sensor '{}' is a {} sensor - it needs an external implementation and will be skipped",
                sensor.name, sensor.kind
            ));
        }

        if sensor.update_rate > tick_rate {
            warnings.push(format!(
                "Sensor '{}' updates at {} Hz but the clock only ticks at {} Hz",
                sensor.name, sensor.update_rate, tick_rate
            ));
        }

        if let Some(noise) = &sensor.noise {
            if matches!(noise.parsed_type(), Ok(NoiseType::GaussianQuantized)) && noise.precision <= 0.0 {
                warnings.push(format!(
                    "Sensor '{}' uses gaussian_quantized noise with precision {} - no quantization will be applied",
                    sensor.name, noise.precision
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Step: {} ms", summary.step_ms);
            println!("  Duration: {} s ({} ticks)", summary.duration_s, summary.tick_count);
            println!("  Seeded: {}", summary.seeded);
            println!("  Sensors: {}", summary.sensor_count);
            println!("  With noise: {}", summary.noisy_sensor_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{NoiseDescriptor, SensorDescriptor, SensorKind, SimulationSettings};

    #[test]
    fn test_warnings() {
        let config = SimulationConfig {
            simulation: SimulationSettings {
                seed: None,
                step_ms: 100,
                duration_s: 1.0,
            },
            sensors: vec![
                SensorDescriptor::new("cam", SensorKind::Camera),
                SensorDescriptor::new("alt", SensorKind::Altimeter).with_update_rate(50.0),
                SensorDescriptor::new("baro", SensorKind::AirPressure)
                    .with_noise(NoiseDescriptor::gaussian_quantized(0.0, 1.0, 0.0, 0.0, 0.0)),
            ],
        };

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("seed"));
        assert!(warnings[1].contains("external implementation"));
        assert!(warnings[2].contains("50 Hz"));
        assert!(warnings[3].contains("no quantization"));
    }

    #[test]
    fn test_empty_config_warnings() {
        let warnings = collect_warnings(&SimulationConfig::default());
        assert!(warnings.iter().any(|w| w.contains("No sensors")));
    }
}
