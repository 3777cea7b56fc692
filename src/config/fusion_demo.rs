use super::voting::{ResolverConfig, VotingConfig};
use super::{load_json, OutputConfig};
use crate::error::FusionError;
use crate::synthetic::SyntheticParams;
use serde::Deserialize;
use std::path::Path;

/// Config of the `fusion_demo` tool.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FusionDemoConfig {
    pub synthetic: SyntheticParams,
    pub voting: VotingConfig,
    pub resolver: ResolverConfig,
    /// Score classifiers per label against the synthetic ground truth (for
    /// label voters and label-based weighting).
    pub score_against_ground_truth: bool,
    /// Drop the probability fields before fusing.
    pub without_probabilities: bool,
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<FusionDemoConfig, FusionError> {
    load_json(path)
}
