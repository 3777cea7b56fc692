//! Voting engine: validation, fallbacks and the per-voxel vote.
//!
//! Typical usage:
//! ```no_run
//! use label_fusion::inputs::FusionInputs;
//! use label_fusion::voting::{VotingEngine, VotingParams};
//! use label_fusion::volume::LabelVolume;
//!
//! # fn example(segmentations: Vec<LabelVolume>) -> Result<(), label_fusion::FusionError> {
//! let engine = VotingEngine::new(VotingParams {
//!     min_difference_percentage: Some(0.2),
//!     ..Default::default()
//! });
//! let out = engine.fuse(&FusionInputs::new(&segmentations))?;
//! println!("undecided: {} voxels", out.undecided_count);
//! # Ok(())
//! # }
//! ```
use super::decision::{
    Decision, DecisionFields, UndecidedBreakdown, UndecidedReason, VotingOutput,
};
use super::params::{ConfigWarning, VotingParams};
use crate::error::FusionError;
use crate::inputs::{FusionInputs, InputSummary};
use crate::parallel::{map_regions, partition, Region};
use crate::stats::GuessStats;
use crate::volume::{Label, LabelVolume, ProbabilityStack, ScalarVolume};
use crate::weighting::WeightType;
use log::{debug, warn};

/// Weighted majority voting over an ensemble of label volumes.
pub struct VotingEngine {
    params: VotingParams,
}

/// Run-level settings after validation and fallbacks.
struct ResolvedVoting<'a> {
    params: &'a VotingParams,
    weight_type: WeightType,
    max_pixel_entropy: Option<f64>,
    probabilities: Option<&'a [ProbabilityStack]>,
    undecided_label: Label,
    total_label_count: usize,
    classifiers: usize,
}

impl ResolvedVoting<'_> {
    #[inline]
    fn needs_stats(&self) -> bool {
        self.max_pixel_entropy.is_some() || self.weight_type.needs_probabilities()
    }
}

/// Result of scanning a vote tally.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tally {
    first_label: Label,
    first_votes: f64,
    second_votes: f64,
    tied: bool,
}

#[derive(Clone, Copy, Debug)]
struct VoxelVote {
    decision: Decision,
    first_percentage: f64,
    percentage_difference: f64,
    ratio: f64,
    pixel_entropy: f64,
}

impl VoxelVote {
    fn without_voters() -> Self {
        Self {
            decision: Decision::Undecided(UndecidedReason::NoVoters),
            first_percentage: 0.0,
            percentage_difference: 0.0,
            ratio: 0.0,
            pixel_entropy: 0.0,
        }
    }
}

struct RegionVotes {
    labels: Vec<Label>,
    first_percentage: Vec<f64>,
    percentage_difference: Vec<f64>,
    ratio: Vec<f64>,
    pixel_entropy: Vec<f64>,
    breakdown: UndecidedBreakdown,
}

impl RegionVotes {
    fn with_capacity(n: usize) -> Self {
        Self {
            labels: Vec::with_capacity(n),
            first_percentage: Vec::with_capacity(n),
            percentage_difference: Vec::with_capacity(n),
            ratio: Vec::with_capacity(n),
            pixel_entropy: Vec::with_capacity(n),
            breakdown: UndecidedBreakdown::default(),
        }
    }

    fn push(&mut self, vote: VoxelVote, undecided_label: Label) {
        if let Decision::Undecided(reason) = vote.decision {
            self.breakdown.record(reason);
        }
        self.labels.push(vote.decision.label(undecided_label));
        self.first_percentage.push(vote.first_percentage);
        self.percentage_difference.push(vote.percentage_difference);
        self.ratio.push(vote.ratio);
        self.pixel_entropy.push(vote.pixel_entropy);
    }
}

impl VotingEngine {
    pub fn new(params: VotingParams) -> Self {
        Self { params }
    }

    /// Fuse the label volumes of `inputs` into one consensus volume.
    ///
    /// Shape and map problems fail before any voxel is visited; recoverable
    /// misconfiguration degrades to equal weighting and is reported in
    /// [`VotingOutput::warnings`].
    pub fn fuse(&self, inputs: &FusionInputs<'_>) -> Result<VotingOutput, FusionError> {
        let summary = inputs.validate()?;
        let (run, warnings) = self.resolve(inputs, &summary)?;
        debug!(
            "VotingEngine::fuse {} classifiers on {} grid, {} labels, weight={}, undecided label={}",
            summary.classifiers,
            summary.dims,
            summary.total_label_count,
            run.weight_type.name(),
            run.undecided_label
        );

        let labels = inputs.labels;
        let regions = partition(summary.dims.len(), self.params.max_regions);
        let parts = map_regions(regions, |region| vote_region(labels, &run, region));

        let voxels = summary.dims.len();
        let mut out = RegionVotes::with_capacity(voxels);
        for part in parts {
            out.labels.extend(part.labels);
            out.first_percentage.extend(part.first_percentage);
            out.percentage_difference.extend(part.percentage_difference);
            out.ratio.extend(part.ratio);
            out.pixel_entropy.extend(part.pixel_entropy);
            out.breakdown.merge(&part.breakdown);
        }

        let dims = summary.dims;
        let field = |data: Vec<f64>| ScalarVolume { dims, data };
        let decision = DecisionFields {
            first_percentage: field(out.first_percentage),
            percentage_difference: field(out.percentage_difference),
            ratio: field(out.ratio),
            pixel_entropy: field(out.pixel_entropy),
        };

        let undecided_count = out.breakdown.total();
        debug!("VotingEngine::fuse undecided voxels: {undecided_count}/{voxels}");
        Ok(VotingOutput {
            labels: LabelVolume {
                dims,
                data: out.labels,
            },
            decision,
            undecided_count,
            undecided_by_reason: out.breakdown,
            undecided_label: run.undecided_label,
            total_label_count: summary.total_label_count,
            weight_type: run.weight_type,
            warnings,
        })
    }

    fn resolve<'a>(
        &'a self,
        inputs: &FusionInputs<'a>,
        summary: &InputSummary,
    ) -> Result<(ResolvedVoting<'a>, Vec<ConfigWarning>), FusionError> {
        let params = &self.params;
        validate_maps(params, summary)?;

        let mut warnings = Vec::new();
        let probabilities = inputs.probability_stacks();
        let mut weight_type = params.weight_type;
        let mut max_pixel_entropy = params.max_pixel_entropy;
        if probabilities.is_none() {
            if max_pixel_entropy.take().is_some() {
                warnings.push(ConfigWarning::EntropyThresholdWithoutProbabilities);
            }
            if weight_type.needs_probabilities() {
                warnings.push(ConfigWarning::WeightingWithoutProbabilities {
                    requested: weight_type,
                });
                weight_type = WeightType::Equal;
            }
        }
        if weight_type == WeightType::LabelBased && params.label_weights.is_empty() {
            warnings.push(ConfigWarning::LabelWeightsMissing);
            weight_type = WeightType::Equal;
        }

        let undecided_label = match params.undecided_label {
            Some(label) => {
                if (label as usize) < summary.total_label_count {
                    warnings.push(ConfigWarning::UndecidedLabelCollides { label });
                }
                label
            }
            None => Label::try_from(summary.total_label_count).unwrap_or_else(|_| {
                warnings.push(ConfigWarning::NoUndecidedLabelLeft {
                    total_label_count: summary.total_label_count,
                });
                0
            }),
        };

        for w in &warnings {
            warn!("label voting: {w}");
        }

        let run = ResolvedVoting {
            params,
            weight_type,
            max_pixel_entropy,
            probabilities,
            undecided_label,
            total_label_count: summary.total_label_count,
            classifiers: summary.classifiers,
        };
        Ok((run, warnings))
    }
}

/// Map entries must name existing classifiers. Labels that never occur in
/// this run cannot match any voxel and are ignored.
fn validate_maps(params: &VotingParams, summary: &InputSummary) -> Result<(), FusionError> {
    let check = |map: &'static str, label: Label, classifier: usize| {
        if classifier < summary.classifiers {
            Ok(())
        } else {
            Err(FusionError::InvalidMapEntry {
                map,
                label,
                classifier,
                labels: summary.total_label_count,
                classifiers: summary.classifiers,
            })
        }
    };
    for &(label, classifier) in params.label_weights.keys() {
        check("label weight map", label, classifier)?;
    }
    if let Some(voters) = &params.voters {
        for &(label, classifier) in voters {
            check("voter set", label, classifier)?;
        }
    }
    Ok(())
}

fn vote_region(labels: &[LabelVolume], run: &ResolvedVoting<'_>, region: Region) -> RegionVotes {
    let mut out = RegionVotes::with_capacity(region.len());
    let mut votes = vec![0.0f64; run.total_label_count];
    for index in region.voxels {
        let vote = vote_voxel(labels, run, index, &mut votes);
        out.push(vote, run.undecided_label);
    }
    out
}

fn vote_voxel(
    labels: &[LabelVolume],
    run: &ResolvedVoting<'_>,
    index: usize,
    votes: &mut [f64],
) -> VoxelVote {
    votes.fill(0.0);
    let voters = run.params.voters.as_ref().filter(|v| !v.is_empty());
    let mut considered = 0usize;
    let mut entropy_sum = 0.0;

    for (i, volume) in labels.iter().enumerate() {
        let label = volume.at(index);
        if voters.is_some_and(|v| !v.contains(&(label, i))) {
            continue;
        }
        let stats = match run.probabilities {
            Some(stacks) if run.needs_stats() => {
                let stats = GuessStats::at_voxel(&stacks[i], index, 0, run.classifiers);
                entropy_sum += stats.entropy;
                if run.max_pixel_entropy.is_some_and(|max| stats.entropy > max) {
                    continue;
                }
                Some(stats)
            }
            _ => None,
        };
        considered += 1;
        let weight = run
            .weight_type
            .weight(i, label, stats.as_ref(), &run.params.label_weights);
        votes[label as usize] += weight;
    }

    if considered == 0 {
        return VoxelVote::without_voters();
    }

    let n = run.classifiers as f64;
    let tally = tally(votes);
    let first_percentage = tally.first_votes / n;
    let second_percentage = tally.second_votes / n;
    let decision = match rejection(run.params, &tally, first_percentage, second_percentage) {
        Some(reason) => Decision::Undecided(reason),
        None => Decision::Decided(tally.first_label),
    };

    VoxelVote {
        decision,
        first_percentage,
        percentage_difference: first_percentage - second_percentage,
        ratio: if tally.second_votes > 0.0 {
            tally.first_votes / tally.second_votes
        } else {
            n
        },
        pixel_entropy: entropy_sum / n,
    }
}

/// Scan the tally upward: the first strict maximum wins, a later label that
/// equals the running maximum marks a tie until a larger tally replaces it.
fn tally(votes: &[f64]) -> Tally {
    let mut first_label = 0usize;
    let mut first_votes = votes.first().copied().unwrap_or(0.0);
    let mut tied = false;
    for (l, &v) in votes.iter().enumerate().skip(1) {
        if v > first_votes {
            first_votes = v;
            first_label = l;
            tied = false;
        } else if v == first_votes {
            tied = true;
        }
    }
    let second_votes = votes
        .iter()
        .enumerate()
        .filter(|&(l, _)| l != first_label)
        .fold(0.0f64, |acc, (_, &v)| if v > acc { v } else { acc });
    Tally {
        first_label: first_label as Label,
        first_votes,
        second_votes,
        tied,
    }
}

/// First rejection rule that applies, if any.
fn rejection(
    params: &VotingParams,
    tally: &Tally,
    first_percentage: f64,
    second_percentage: f64,
) -> Option<UndecidedReason> {
    if tally.tied {
        return Some(UndecidedReason::Tie);
    }
    if params
        .absolute_min_percentage
        .is_some_and(|min| first_percentage < min)
    {
        return Some(UndecidedReason::AbsoluteMinPercentage);
    }
    if params
        .min_difference_percentage
        .is_some_and(|min| first_percentage - second_percentage < min)
    {
        return Some(UndecidedReason::MinDifference);
    }
    if params
        .min_ratio
        .is_some_and(|min| tally.second_votes > 0.0 && tally.first_votes / tally.second_votes < min)
    {
        return Some(UndecidedReason::MinRatio);
    }
    None
}

#[cfg(test)]
mod tally_tests {
    use super::*;

    #[test]
    fn plurality_winner() {
        let t = tally(&[0.0, 2.0, 1.0]);
        assert_eq!(t.first_label, 1);
        assert_eq!(t.first_votes, 2.0);
        assert_eq!(t.second_votes, 1.0);
        assert!(!t.tied);
    }

    #[test]
    fn equal_top_votes_tie() {
        assert!(tally(&[0.0, 1.0, 1.0]).tied);
    }

    #[test]
    fn larger_later_tally_clears_earlier_tie() {
        // labels 0 and 1 tie at zero, label 2 then takes the lead
        let t = tally(&[0.0, 0.0, 1.0]);
        assert_eq!(t.first_label, 2);
        assert!(!t.tied);
    }

    #[test]
    fn tie_below_the_leader_is_not_a_tie() {
        let t = tally(&[3.0, 1.0, 1.0]);
        assert_eq!(t.first_label, 0);
        assert!(!t.tied);
    }
}
