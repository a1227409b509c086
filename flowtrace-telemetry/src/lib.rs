//! # Flowtrace Telemetry
//!
//! Logging and metrics for the capture pipeline.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
