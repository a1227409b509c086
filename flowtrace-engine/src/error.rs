use thiserror::Error;

use flowtrace_capture::CaptureError;
use flowtrace_config::ConfigError;

use crate::sink::SinkError;

/// Top-level engine failure. Everything here is fatal: the run aborts
/// with a diagnostic, there is no retry path.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("output sink error: {0}")]
    Sink(#[from] SinkError),
}
