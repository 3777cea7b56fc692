use super::stages::{ResolveStage, VotingStage};
use super::timing::TimingBreakdown;
use crate::inputs::InputSummary;
use crate::volume::{Dims, Label, LabelVolume};
use crate::voting::DecisionFields;
use serde::Serialize;

/// Result of [`FusionPipeline::run`](crate::pipeline::FusionPipeline::run).
///
/// Volumes stay in memory; only the trace is serialized.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionReport {
    /// Final labels after the optional resolution pass.
    #[serde(skip)]
    pub labels: LabelVolume,
    /// Decision fields of the voting stage.
    #[serde(skip)]
    pub decision: DecisionFields,
    pub undecided_label: Label,
    /// Voxels still carrying the undecided label.
    pub final_undecided: usize,
    pub trace: FusionTrace,
}

/// Everything the stages reported, plus timings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub voting: VotingStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolveStage>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub dims: Dims,
    pub classifiers: usize,
    pub total_label_count: usize,
    pub has_probabilities: bool,
}

impl InputDescriptor {
    pub fn new(summary: &InputSummary, has_probabilities: bool) -> Self {
        Self {
            dims: summary.dims,
            classifiers: summary.classifiers,
            total_label_count: summary.total_label_count,
            has_probabilities,
        }
    }
}
