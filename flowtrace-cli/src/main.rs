//! ## flowtrace-cli
//! Flowtrace entrypoint: live capture on one interface for a bounded
//! observation window, emitting per-flow statistics with payload
//! entropy scores as CSV.

use clap::Parser;
use flowtrace_telemetry::logging::EventLogger;

mod commands;

use commands::Cli;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    EventLogger::init();
    let cli = Cli::parse();
    commands::run_command(cli)
}
