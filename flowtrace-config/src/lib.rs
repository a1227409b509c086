//! # Flowtrace Configuration
//!
//! Hierarchical configuration for the capture window, the capture
//! device, and the output destination.
//!
//! Hierarchy:
//! 1. Default values
//! 2. `config/flowtrace.yaml`, if present
//! 3. `FLOWTRACE_*` environment variables (nested fields split on `__`)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod capture;
mod error;
mod output;
mod validation;
mod window;

pub use capture::CaptureConfig;
pub use error::ConfigError;
pub use output::OutputConfig;
pub use window::WindowConfig;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct FlowtraceConfig {
    /// Capture device parameters.
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Observation window bounds.
    #[validate(nested)]
    pub window: WindowConfig,

    /// Output destination for emitted flow records.
    #[validate(nested)]
    pub output: OutputConfig,
}

impl FlowtraceConfig {
    /// Load configuration from the default file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FlowtraceConfig::default()));

        if Path::new("config/flowtrace.yaml").exists() {
            figment = figment.merge(Yaml::file("config/flowtrace.yaml"));
        }

        figment
            .merge(Env::prefixed("FLOWTRACE_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path, for tests and one-off runs.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(FlowtraceConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("FLOWTRACE_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
