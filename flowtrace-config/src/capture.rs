//! Capture device configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Live-capture parameters for the single monitored interface.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CaptureConfig {
    /// Network interface to capture on.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Snapshot length per frame, bytes.
    #[validate(range(min = 64, max = 262144))]
    #[serde(default = "default_snaplen")]
    pub snaplen: usize,

    /// Run the device in promiscuous mode?
    #[serde(default = "default_promiscuous")]
    pub promiscuous: bool,
}

fn default_interface() -> String {
    "eth0".into()
}

fn default_snaplen() -> usize {
    65536
}

fn default_promiscuous() -> bool {
    true
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            snaplen: default_snaplen(),
            promiscuous: default_promiscuous(),
        }
    }
}
