//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sensorsim - Simulated sensor registry and scheduler
#[derive(Parser, Debug)]
#[command(
    name = "sensorsim",
    author,
    version,
    about = "Simulated sensor manager with configurable noise models",
    long_about = "Registers simulated sensors from a configuration file, steps them on a \n\
                  fixed simulation clock at their declared update rates, and reports \n\
                  the noisy measurements they publish."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSORSIM_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SENSORSIM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "sensors.toml", env = "SENSORSIM_CONFIG")]
    pub config: PathBuf,

    /// Override the noise seed from configuration
    #[arg(long, env = "SENSORSIM_SEED")]
    pub seed: Option<u64>,

    /// Override the simulated duration in seconds
    #[arg(long, env = "SENSORSIM_DURATION")]
    pub duration: Option<f64>,

    /// Override the clock step in milliseconds
    #[arg(long, env = "SENSORSIM_STEP_MS")]
    pub step_ms: Option<u64>,

    /// Step every sensor on every tick regardless of its update rate
    #[arg(long)]
    pub force: bool,

    /// Pace ticks against the wall clock
    #[arg(long)]
    pub realtime: bool,

    /// Wall clock speed multiplier used with --realtime
    #[arg(long, default_value = "1.0", requires = "realtime")]
    pub speed: f64,

    /// Fail when any configured sensor cannot be created
    #[arg(long)]
    pub strict: bool,

    /// Print every published measurement
    #[arg(long)]
    pub print_measurements: bool,

    /// Validate configuration and exit without running the simulation
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SENSORSIM_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sensors.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensors.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show noise and attribute details per sensor
    #[arg(long)]
    pub sensors: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
