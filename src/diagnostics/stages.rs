use crate::resolve::{AmbiguousVoxel, Resolution};
use crate::volume::{Label, ScalarVolume};
use crate::voting::{ConfigWarning, DecisionKind, UndecidedBreakdown, VotingOutput};
use crate::weighting::WeightType;
use serde::Serialize;

/// Summary of the voting stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStage {
    pub elapsed_ms: f64,
    pub weight_type: WeightType,
    pub undecided_label: Label,
    pub total_label_count: usize,
    pub undecided_count: usize,
    pub undecided_fraction: f64,
    pub undecided_by_reason: UndecidedBreakdown,
    pub decision_means: Vec<DecisionMean>,
    pub warnings: Vec<ConfigWarning>,
}

/// Mean of one decision field over all voxels.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMean {
    pub kind: DecisionKind,
    pub mean: f64,
}

impl VotingStage {
    pub fn from_output(out: &VotingOutput, elapsed_ms: f64) -> Self {
        let decision_means = [
            DecisionKind::FirstPercentage,
            DecisionKind::PercentageDifference,
            DecisionKind::Ratio,
            DecisionKind::PixelEntropy,
        ]
        .into_iter()
        .map(|kind| DecisionMean {
            kind,
            mean: mean(out.decision.get(kind)),
        })
        .collect();
        Self {
            elapsed_ms,
            weight_type: out.weight_type,
            undecided_label: out.undecided_label,
            total_label_count: out.total_label_count,
            undecided_count: out.undecided_count,
            undecided_fraction: out.undecided_fraction(),
            undecided_by_reason: out.undecided_by_reason,
            decision_means,
            warnings: out.warnings.clone(),
        }
    }
}

fn mean(field: &ScalarVolume) -> f64 {
    if field.data.is_empty() {
        0.0
    } else {
        field.data.iter().sum::<f64>() / field.data.len() as f64
    }
}

/// Summary of the undecided-voxel pass.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveStage {
    pub elapsed_ms: f64,
    pub resolved_count: usize,
    pub remaining_undecided: usize,
    pub ambiguous_count: usize,
    pub ambiguous: Vec<AmbiguousVoxel>,
}

impl ResolveStage {
    pub fn from_resolution(res: &Resolution, elapsed_ms: f64) -> Self {
        Self {
            elapsed_ms,
            resolved_count: res.resolved_count,
            remaining_undecided: res.remaining_undecided,
            ambiguous_count: res.ambiguous.len(),
            ambiguous: res.ambiguous.clone(),
        }
    }
}
