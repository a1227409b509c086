//! Output destination configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where emitted flow records go.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct OutputConfig {
    /// CSV file the flow records are written to. Created at startup;
    /// creation failure is fatal.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("packet_output.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
