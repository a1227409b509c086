use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use flowtrace_config::FlowtraceConfig;
use flowtrace_telemetry::MetricsRecorder;

#[derive(Parser)]
#[command(name = "flowtrace", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture live traffic for one window and emit per-flow statistics
    Run(RunArgs),
    /// List capture-capable network interfaces
    Devices,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file; defaults to config/flowtrace.yaml + environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Capture interface, overriding the configured one
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Observation window in seconds, overriding the configured one
    #[arg(short = 'w', long)]
    pub window_secs: Option<u64>,

    /// Output CSV path, overriding the configured one
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cli.command {
        Commands::Run(args) => run_capture(args),
        Commands::Devices => list_devices(),
    }
}

fn run_capture(args: RunArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match &args.config {
        Some(path) => FlowtraceConfig::load_from_path(path)?,
        None => FlowtraceConfig::load()?,
    };

    if let Some(interface) = args.interface {
        config.capture.interface = interface;
    }
    if let Some(secs) = args.window_secs {
        config.window.duration_secs = secs;
    }
    if let Some(output) = args.output {
        config.output.path = output;
    }

    let metrics = MetricsRecorder::new();
    flowtrace_engine::run_live(&config, metrics)?;
    Ok(())
}

fn list_devices() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for name in flowtrace_capture::devices()? {
        println!("{name}");
    }
    Ok(())
}
