use super::voting::VotingConfig;
use super::{load_json, OutputConfig};
use crate::error::FusionError;
use crate::sweep::SweepParameter;
use crate::synthetic::SyntheticParams;
use serde::Deserialize;
use std::path::Path;

/// Config of the `threshold_sweep` tool.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SweepToolConfig {
    pub synthetic: SyntheticParams,
    /// Weighting and undecided-label settings shared by all samples.
    pub voting: VotingConfig,
    pub samples: usize,
    pub parameters: Vec<SweepParameter>,
    pub output: OutputConfig,
}

impl Default for SweepToolConfig {
    fn default() -> Self {
        Self {
            synthetic: SyntheticParams::default(),
            voting: VotingConfig::default(),
            samples: 10,
            parameters: SweepParameter::ALL.to_vec(),
            output: OutputConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<SweepToolConfig, FusionError> {
    load_json(path)
}
