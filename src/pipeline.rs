//! Two-stage fusion pipeline: weighted vote, then undecided-voxel resolution.
//!
//! Typical usage:
//! ```no_run
//! use label_fusion::inputs::FusionInputs;
//! use label_fusion::pipeline::{FusionParams, FusionPipeline};
//! use label_fusion::volume::{LabelVolume, ProbabilityStack};
//!
//! # fn example(labels: Vec<LabelVolume>, probs: Vec<ProbabilityStack>) -> Result<(), label_fusion::FusionError> {
//! let pipeline = FusionPipeline::new(FusionParams {
//!     resolve_undecided: true,
//!     ..Default::default()
//! });
//! let report = pipeline.run(&FusionInputs::new(&labels).with_probabilities(&probs))?;
//! println!("left undecided: {}", report.final_undecided);
//! # Ok(())
//! # }
//! ```
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    FusionReport, FusionTrace, InputDescriptor, ResolveStage, TimingBreakdown, VotingStage,
};
use crate::error::FusionError;
use crate::inputs::FusionInputs;
use crate::resolve::{ResolverParams, UndecidedResolver};
use crate::voting::{VotingEngine, VotingParams};
use log::debug;
use std::time::Instant;

/// Parameters of a full fusion run.
#[derive(Clone, Debug, Default)]
pub struct FusionParams {
    pub voting: VotingParams,
    pub resolver: ResolverParams,
    /// Run the resolution pass on voxels the vote left undecided.
    pub resolve_undecided: bool,
}

pub struct FusionPipeline {
    engine: VotingEngine,
    resolver: UndecidedResolver,
    resolve_undecided: bool,
}

impl FusionPipeline {
    pub fn new(params: FusionParams) -> Self {
        Self {
            engine: VotingEngine::new(params.voting),
            resolver: UndecidedResolver::new(params.resolver),
            resolve_undecided: params.resolve_undecided,
        }
    }

    /// Vote, then resolve undecided voxels when enabled and any remain.
    ///
    /// Resolution requirements (two classifiers, probability fields) are
    /// checked before voting so a misconfigured run produces no output.
    pub fn run(&self, inputs: &FusionInputs<'_>) -> Result<FusionReport, FusionError> {
        let total_start = Instant::now();
        let summary = inputs.validate()?;
        if self.resolve_undecided {
            if summary.classifiers < 2 {
                return Err(FusionError::InsufficientClassifiers {
                    found: summary.classifiers,
                    minimum: 2,
                });
            }
            if inputs.probability_stacks().is_none() {
                return Err(FusionError::MissingProbabilities("undecided pixel resolution"));
            }
        }
        let input = InputDescriptor::new(&summary, inputs.probability_stacks().is_some());
        debug!(
            "FusionPipeline::run start dims={} classifiers={} resolve={}",
            summary.dims, summary.classifiers, self.resolve_undecided
        );

        let mut timings = TimingBreakdown::default();
        let vote_start = Instant::now();
        let voted = self.engine.fuse(inputs)?;
        let vote_ms = elapsed_ms(vote_start);
        timings.push("vote", vote_ms);
        let voting = VotingStage::from_output(&voted, vote_ms);

        let undecided_label = voted.undecided_label;
        let mut final_undecided = voted.undecided_count;
        let mut resolve = None;
        let labels = if self.resolve_undecided && voted.undecided_count > 0 {
            let start = Instant::now();
            let res = self.resolver.resolve(inputs, &voted.labels, undecided_label)?;
            let ms = elapsed_ms(start);
            timings.push("resolve", ms);
            final_undecided = res.remaining_undecided;
            resolve = Some(ResolveStage::from_resolution(&res, ms));
            res.labels
        } else {
            voted.labels
        };

        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "FusionPipeline::run done total_ms={:.3} undecided={}",
            timings.total_ms, final_undecided
        );

        Ok(FusionReport {
            labels,
            decision: voted.decision,
            undecided_label,
            final_undecided,
            trace: FusionTrace {
                input,
                timings,
                voting,
                resolve,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{Dims, LabelVolume};

    #[test]
    fn vote_only_run_reports_voting_stage() {
        let dims = Dims::new(2, 1, 1);
        let labels = vec![
            LabelVolume::from_vec(dims, vec![1, 1]).unwrap(),
            LabelVolume::from_vec(dims, vec![1, 2]).unwrap(),
        ];
        let report = FusionPipeline::new(FusionParams::default())
            .run(&FusionInputs::new(&labels))
            .unwrap();
        assert_eq!(report.labels.data, vec![1, 3]);
        assert_eq!(report.final_undecided, 1);
        assert!(report.trace.resolve.is_none());
        assert_eq!(report.trace.timings.stages.len(), 1);
        assert_eq!(report.trace.voting.undecided_by_reason.tie, 1);
    }

    #[test]
    fn resolution_requires_probabilities_before_voting() {
        let dims = Dims::new(1, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 1), LabelVolume::filled(dims, 2)];
        let err = FusionPipeline::new(FusionParams {
            resolve_undecided: true,
            ..Default::default()
        })
        .run(&FusionInputs::new(&labels))
        .unwrap_err();
        assert!(matches!(err, FusionError::MissingProbabilities(_)));
    }
}
