//! `run` command implementation.

use anyhow::Result;
use contracts::{SimulationConfig, TracingSink};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::{load_config, CliError};
use crate::simulation::{Simulation, SimulationOptions};

/// Execute the `run` command
pub async fn run_simulation(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args)?;

    info!(
        sensors = config.sensors.len(),
        step_ms = config.simulation.step_ms,
        duration_s = config.simulation.duration_s,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let options = SimulationOptions {
        force: args.force,
        realtime_speed: args.realtime.then_some(args.speed),
        print_measurements: args.print_measurements,
    };
    let simulation = Simulation::build(&config, options, TracingSink::shared());

    if args.strict && !simulation.rejected().is_empty() {
        return Err(CliError::sensors_rejected(simulation.rejected()).into());
    }

    info!("Starting simulation...");
    let stats = simulation.run(shutdown_signal()).await;

    info!(
        ticks = stats.run_stats.total_ticks,
        updates = stats.run_stats.total_updated,
        failed = stats.run_stats.total_failed,
        measurements = stats.measurements,
        sim_time_s = stats.sim_time.as_secs_f64(),
        wall_time_s = stats.wall_time.as_secs_f64(),
        "Simulation finished"
    );
    stats.print_summary();

    if stats.interrupted {
        warn!("Simulation interrupted by shutdown signal");
    }
    Ok(())
}

/// Apply command line overrides, then re-check the clock.
fn apply_overrides(config: &mut SimulationConfig, args: &RunArgs) -> Result<(), CliError> {
    if let Some(seed) = args.seed {
        info!(seed, "Overriding noise seed from CLI");
        config.simulation.seed = Some(seed);
    }
    if let Some(duration) = args.duration {
        if !duration.is_finite() || duration < 0.0 {
            return Err(CliError::invalid_override(
                "duration",
                format!("{duration} is not a non-negative number of seconds"),
            ));
        }
        info!(duration_s = duration, "Overriding duration from CLI");
        config.simulation.duration_s = duration;
    }
    if let Some(step_ms) = args.step_ms {
        if step_ms == 0 {
            return Err(CliError::invalid_override("step_ms", "step must be at least 1 ms"));
        }
        info!(step_ms, "Overriding clock step from CLI");
        config.simulation.step_ms = step_ms;
    }
    if args.realtime && !(args.speed.is_finite() && args.speed > 0.0) {
        return Err(CliError::invalid_override(
            "speed",
            format!("{} is not a positive multiplier", args.speed),
        ));
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &SimulationConfig) {
    let settings = &config.simulation;
    println!("\n=== Configuration Summary ===\n");
    println!("Clock:");
    println!("  Step: {} ms", settings.step_ms);
    println!("  Duration: {} s", settings.duration_s);
    println!("  Ticks: {}", settings.tick_count());
    match settings.seed {
        Some(seed) => println!("  Seed: {seed}"),
        None => println!("  Seed: (entropy)"),
    }

    println!("\nSensors ({}):", config.sensors.len());
    for sensor in &config.sensors {
        let rate = if sensor.update_rate > 0.0 {
            format!("{} Hz", sensor.update_rate)
        } else {
            "every tick".to_string()
        };
        let noise = sensor
            .noise
            .as_ref()
            .map(|n| n.noise_type.as_str())
            .unwrap_or("none");
        println!("  - {} ({}) - {}, noise: {}", sensor.name, sensor.kind, rate, noise);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["run"];
        argv.extend_from_slice(extra);
        let cli = crate::cli::Cli::parse_from(std::iter::once("sensorsim").chain(argv));
        match cli.command {
            crate::cli::Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = SimulationConfig::default();
        apply_overrides(
            &mut config,
            &run_args(&["--seed", "9", "--duration", "0.5", "--step-ms", "5"]),
        )
        .unwrap();

        assert_eq!(config.simulation.seed, Some(9));
        assert_eq!(config.simulation.duration_s, 0.5);
        assert_eq!(config.simulation.step_ms, 5);
    }

    #[test]
    fn test_bad_overrides_rejected() {
        let mut config = SimulationConfig::default();
        assert!(apply_overrides(&mut config, &run_args(&["--step-ms", "0"])).is_err());
        assert!(apply_overrides(&mut config, &run_args(&["--duration=-1"])).is_err());
        assert!(apply_overrides(&mut config, &run_args(&["--realtime", "--speed", "0"])).is_err());
    }
}
