//! Voting configuration.
//!
//! Every threshold is optional; `VotingParams::default()` is a plain,
//! equally-weighted majority vote with an automatically chosen undecided
//! label.
use crate::volume::Label;
use crate::weighting::{LabelWeightMap, WeightType};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// `(label, classifier index)` pairs allowed to vote.
pub type VoterSet = HashSet<(Label, usize)>;

#[derive(Clone, Debug, Default)]
pub struct VotingParams {
    /// Minimum share of the ensemble (`votes / N`) the winner must reach.
    pub absolute_min_percentage: Option<f64>,
    /// Minimum gap between first and second best share.
    pub min_difference_percentage: Option<f64>,
    /// Minimum first/second vote ratio (only checked when second has votes).
    pub min_ratio: Option<f64>,
    /// Classifiers whose normalized pixel entropy exceeds this do not vote.
    pub max_pixel_entropy: Option<f64>,
    /// How individual votes are weighted.
    pub weight_type: WeightType,
    /// Weights for [`WeightType::LabelBased`].
    pub label_weights: LabelWeightMap,
    /// Restricts which classifier may vote for which label. An empty set
    /// imposes no restriction.
    pub voters: Option<VoterSet>,
    /// Explicit undecided label; defaults to the run's total label count.
    pub undecided_label: Option<Label>,
    /// Upper bound on the number of voxel regions processed concurrently.
    pub max_regions: Option<usize>,
}

/// Recoverable misconfiguration detected before voting starts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigWarning {
    /// Certainty/FirstSecondGuessDiff requested without probability fields.
    WeightingWithoutProbabilities { requested: WeightType },
    /// LabelBased requested with an empty weight map.
    LabelWeightsMissing,
    /// A maximum pixel entropy was set without probability fields.
    EntropyThresholdWithoutProbabilities,
    /// The total label count does not fit the label type; 0 is used.
    NoUndecidedLabelLeft { total_label_count: usize },
    /// The explicit undecided label is also a valid input label.
    UndecidedLabelCollides { label: Label },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::WeightingWithoutProbabilities { requested } => write!(
                f,
                "weight type {} requires probability fields, none given; using equal weights",
                requested.name()
            ),
            ConfigWarning::LabelWeightsMissing => write!(
                f,
                "weight type label_based requires a label/classifier weight map, none given; using equal weights"
            ),
            ConfigWarning::EntropyThresholdWithoutProbabilities => write!(
                f,
                "maximum pixel entropy set but no probability fields given; entropy threshold disabled"
            ),
            ConfigWarning::NoUndecidedLabelLeft { total_label_count } => write!(
                f,
                "no label left for undecided pixels ({total_label_count} labels in use), using zero"
            ),
            ConfigWarning::UndecidedLabelCollides { label } => write!(
                f,
                "undecided label {label} is also used as an input label"
            ),
        }
    }
}
