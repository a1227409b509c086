//! Observation window configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Bounds for one capture run. The window is wall-clock: the run stops
/// once a packet arrives after the deadline, or when the source ends.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct WindowConfig {
    /// Observation window duration in seconds.
    #[validate(range(min = 1, max = 86400))]
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
}

fn default_duration_secs() -> u64 {
    30
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
        }
    }
}
