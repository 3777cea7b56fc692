//! JSON configuration for the command-line tools.
//!
//! Every section is `#[serde(default)]`, so an empty object is a valid
//! configuration. Sections are turned into engine parameters with their
//! `resolve` methods.

pub mod fusion_demo;
pub mod threshold_sweep;
pub mod voting;

use crate::error::FusionError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the tools write their JSON report.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report path; printed to stdout when unset.
    pub json_out: Option<PathBuf>,
}

/// Read and parse a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, FusionError> {
    let shown = path.display();
    let data = fs::read_to_string(path)
        .map_err(|e| FusionError::Config(format!("Failed to read config {shown}: {e}")))?;
    serde_json::from_str(&data)
        .map_err(|e| FusionError::Config(format!("Failed to parse config {shown}: {e}")))
}
