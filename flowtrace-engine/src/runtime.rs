//! Live-capture wiring: config -> sink -> capture loop -> aggregator.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Local};
use tracing::{error, info};

use flowtrace_config::FlowtraceConfig;
use flowtrace_core::decode::decode;
use flowtrace_telemetry::MetricsRecorder;

use crate::aggregator::{CaptureState, FlowAggregator};
use crate::error::EngineError;
use crate::sink::{CsvSink, SinkError};

/// Captures on the configured interface for one observation window and
/// writes per-flow records to the configured CSV file.
///
/// Sink creation and device open failures are fatal and returned before
/// any packet is processed. The loop itself stops when a packet arrives
/// past the window deadline or the device stops delivering frames; a
/// sink write failure aborts the run.
pub fn run_live(config: &FlowtraceConfig, metrics: MetricsRecorder) -> Result<(), EngineError> {
    let sink = CsvSink::create(&config.output.path)?;
    let deadline = Local::now() + Duration::seconds(config.window.duration_secs as i64);
    let mut aggregator = FlowAggregator::new(deadline, sink, metrics);

    info!(
        interface = %config.capture.interface,
        window_secs = config.window.duration_secs,
        output = %config.output.path.display(),
        "starting capture window"
    );

    let terminate = AtomicBool::new(false);
    let mut sink_failure: Option<SinkError> = None;

    flowtrace_capture::run(
        &config.capture.interface,
        config.capture.snaplen,
        config.capture.promiscuous,
        &terminate,
        |frame| {
            let descriptor = decode(&frame.data, frame.observed_at);
            match aggregator.process(&descriptor) {
                Ok(CaptureState::Capturing) => {}
                Ok(CaptureState::Stopped) => terminate.store(true, Ordering::Relaxed),
                Err(e) => {
                    error!(error = %e, "sink write failed, aborting capture");
                    sink_failure = Some(e);
                    terminate.store(true, Ordering::Relaxed);
                }
            }
        },
    )?;

    if let Some(failure) = sink_failure {
        return Err(failure.into());
    }

    // Source exhausted or deadline reached: final flush either way.
    aggregator.finish()?;
    Ok(())
}
