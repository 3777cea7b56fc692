//! Threshold sweep: how undecided share and Dice react to one parameter.
//!
//! Each [`SweepParameter`] is varied on its own over a fixed range while the
//! other rejection thresholds stay unset. Every sample runs a full vote and
//! compares the result against a ground-truth volume, ignoring undecided
//! voxels.
use crate::error::FusionError;
use crate::inputs::FusionInputs;
use crate::overlap::OverlapMeasures;
use crate::volume::LabelVolume;
use crate::voters::{label_weights, top_voters, LabelScores};
use crate::voting::{VotingEngine, VotingParams};
use crate::weighting::WeightType;
use log::debug;
use serde::{Deserialize, Serialize};

/// Voting parameter varied by a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    AbsoluteMinPercentage,
    MinDifferencePercentage,
    MinRatio,
    MaxPixelEntropy,
    /// Number of best-scoring classifiers allowed to vote for each label.
    LabelVoters,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 5] = [
        SweepParameter::AbsoluteMinPercentage,
        SweepParameter::MinDifferencePercentage,
        SweepParameter::MinRatio,
        SweepParameter::MaxPixelEntropy,
        SweepParameter::LabelVoters,
    ];

    /// Value range `[min, max]` for an ensemble of `classifiers` inputs
    /// over `label_count` labels.
    pub fn range(self, label_count: usize, classifiers: usize) -> (f64, f64) {
        let n = classifiers as f64;
        match self {
            SweepParameter::AbsoluteMinPercentage => (1.0 / label_count.max(1) as f64, 1.0),
            SweepParameter::MinDifferencePercentage | SweepParameter::MaxPixelEntropy => (0.0, 1.0),
            SweepParameter::MinRatio | SweepParameter::LabelVoters => (1.0, n),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::AbsoluteMinPercentage => "min. absolute percentage",
            SweepParameter::MinDifferencePercentage => "min. percentage difference",
            SweepParameter::MinRatio => "min. ratio",
            SweepParameter::MaxPixelEntropy => "max. pixel uncertainty",
            SweepParameter::LabelVoters => "max. label voters",
        }
    }

    fn apply(
        self,
        params: &mut VotingParams,
        value: f64,
        scores: Option<&LabelScores>,
    ) -> Result<(), FusionError> {
        match self {
            SweepParameter::AbsoluteMinPercentage => params.absolute_min_percentage = Some(value),
            SweepParameter::MinDifferencePercentage => {
                params.min_difference_percentage = Some(value)
            }
            SweepParameter::MinRatio => params.min_ratio = Some(value),
            SweepParameter::MaxPixelEntropy => params.max_pixel_entropy = Some(value),
            SweepParameter::LabelVoters => {
                let scores = scores.ok_or(FusionError::MissingLabelScores)?;
                params.voters = Some(top_voters(scores, value.round() as usize));
            }
        }
        Ok(())
    }
}

/// One point of a sweep curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepSample {
    pub value: f64,
    pub undecided_fraction: f64,
    /// Dice against ground truth; `None` without foreground overlap.
    pub mean_dice: Option<f64>,
}

/// Curve of one parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepSeries {
    pub parameter: SweepParameter,
    pub samples: Vec<SweepSample>,
}

#[derive(Clone, Debug)]
pub struct ThresholdSweep {
    /// Weighting, undecided label and region settings shared by all
    /// samples. Its thresholds and voter set are replaced per sample.
    pub base: VotingParams,
    pub samples: usize,
    pub parameters: Vec<SweepParameter>,
    /// Required for [`SweepParameter::LabelVoters`]; also fills missing
    /// label weights for label-based weighting.
    pub label_scores: Option<LabelScores>,
}

impl Default for ThresholdSweep {
    fn default() -> Self {
        Self {
            base: VotingParams::default(),
            samples: 10,
            parameters: SweepParameter::ALL.to_vec(),
            label_scores: None,
        }
    }
}

impl ThresholdSweep {
    /// Sample every parameter at `value = lerp(range, i / samples)` for
    /// `i in 0..samples`.
    pub fn run(
        &self,
        inputs: &FusionInputs<'_>,
        ground_truth: &LabelVolume,
    ) -> Result<Vec<SweepSeries>, FusionError> {
        let summary = inputs.validate()?;
        if ground_truth.dims != summary.dims {
            return Err(FusionError::DimensionMismatch {
                context: "ground truth".to_string(),
                expected: summary.dims,
                actual: ground_truth.dims,
            });
        }
        let scores = self.label_scores.as_ref();
        if scores.is_none() && self.parameters.contains(&SweepParameter::LabelVoters) {
            return Err(FusionError::MissingLabelScores);
        }

        let mut base = VotingParams {
            absolute_min_percentage: None,
            min_difference_percentage: None,
            min_ratio: None,
            max_pixel_entropy: None,
            voters: None,
            ..self.base.clone()
        };
        if base.weight_type == WeightType::LabelBased && base.label_weights.is_empty() {
            if let Some(scores) = scores {
                base.label_weights = label_weights(scores);
            }
        }

        let mut series = Vec::with_capacity(self.parameters.len());
        for &parameter in &self.parameters {
            let (lo, hi) = parameter.range(summary.total_label_count, summary.classifiers);
            let mut samples = Vec::with_capacity(self.samples);
            for i in 0..self.samples {
                let norm = i as f64 / self.samples as f64;
                let value = lo + (hi - lo) * norm;
                let mut params = base.clone();
                parameter.apply(&mut params, value, scores)?;
                let out = VotingEngine::new(params).fuse(inputs)?;
                let overlap =
                    OverlapMeasures::compute(ground_truth, &out.labels, Some(out.undecided_label))?;
                let sample = SweepSample {
                    value,
                    undecided_fraction: out.undecided_fraction(),
                    mean_dice: overlap.mean_overlap(),
                };
                debug!(
                    "ThresholdSweep {} = {:.4}: undecided {:.4}, dice {:?}",
                    parameter.name(),
                    value,
                    sample.undecided_fraction,
                    sample.mean_dice
                );
                samples.push(sample);
            }
            series.push(SweepSeries { parameter, samples });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{Dims, Label};

    fn ensemble() -> (Vec<LabelVolume>, LabelVolume) {
        let dims = Dims::new(6, 1, 1);
        let truth = LabelVolume::from_vec(dims, vec![1, 1, 1, 2, 2, 2]).unwrap();
        let rows: [[Label; 6]; 3] = [
            [1, 1, 1, 2, 2, 2],
            [1, 1, 2, 2, 2, 1],
            [1, 2, 1, 2, 1, 2],
        ];
        let labels = rows
            .iter()
            .map(|r| LabelVolume::from_vec(dims, r.to_vec()).unwrap())
            .collect();
        (labels, truth)
    }

    #[test]
    fn ranges_follow_ensemble_shape() {
        assert_eq!(SweepParameter::AbsoluteMinPercentage.range(4, 5), (0.25, 1.0));
        assert_eq!(SweepParameter::MinRatio.range(4, 5), (1.0, 5.0));
        assert_eq!(SweepParameter::LabelVoters.range(4, 5), (1.0, 5.0));
        assert_eq!(SweepParameter::MaxPixelEntropy.range(4, 5), (0.0, 1.0));
    }

    #[test]
    fn absolute_sweep_is_monotone() {
        let (labels, truth) = ensemble();
        let sweep = ThresholdSweep {
            samples: 5,
            parameters: vec![SweepParameter::AbsoluteMinPercentage],
            ..Default::default()
        };
        let series = sweep.run(&FusionInputs::new(&labels), &truth).unwrap();
        assert_eq!(series.len(), 1);
        let samples = &series[0].samples;
        assert_eq!(samples.len(), 5);
        assert!((samples[0].value - 1.0 / 3.0).abs() < 1e-12);
        for pair in samples.windows(2) {
            assert!(pair[1].undecided_fraction >= pair[0].undecided_fraction);
        }
        // majority of {1,1,1}/{1,1,2}/... matches the truth everywhere
        assert_eq!(samples[0].undecided_fraction, 0.0);
        assert_eq!(samples[0].mean_dice, Some(1.0));
    }

    #[test]
    fn label_voters_need_scores() {
        let (labels, truth) = ensemble();
        let sweep = ThresholdSweep {
            parameters: vec![SweepParameter::LabelVoters],
            ..Default::default()
        };
        assert!(matches!(
            sweep.run(&FusionInputs::new(&labels), &truth),
            Err(FusionError::MissingLabelScores)
        ));
    }

    #[test]
    fn single_best_voter_reproduces_best_classifier() {
        let (labels, truth) = ensemble();
        let scores = LabelScores::from_reference(&truth, &labels, 3).unwrap();
        let sweep = ThresholdSweep {
            samples: 1,
            parameters: vec![SweepParameter::LabelVoters],
            label_scores: Some(scores),
            ..Default::default()
        };
        let series = sweep.run(&FusionInputs::new(&labels), &truth).unwrap();
        let s = series[0].samples[0];
        assert_eq!(s.value, 1.0);
        assert_eq!(s.mean_dice, Some(1.0));
    }
}
