//! Vote weighting strategies.
//!
//! Each classifier's vote at a voxel is scaled by a weight derived from the
//! active [`WeightType`]:
//!
//! - `Equal`: every considered classifier counts 1.
//! - `LabelBased`: looked up per `(label, classifier)` in a [`LabelWeightMap`].
//! - `Certainty`: `1 - entropy` of the classifier's probability vector.
//! - `FirstSecondGuessDiff`: first-best minus second-best probability.
use crate::stats::GuessStats;
use crate::volume::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight per `(label, classifier index)` pair.
pub type LabelWeightMap = HashMap<(Label, usize), f64>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightType {
    #[default]
    Equal,
    LabelBased,
    Certainty,
    FirstSecondGuessDiff,
}

impl WeightType {
    /// True for modes that read per-voxel probability statistics.
    #[inline]
    pub fn needs_probabilities(self) -> bool {
        matches!(self, WeightType::Certainty | WeightType::FirstSecondGuessDiff)
    }

    pub fn name(self) -> &'static str {
        match self {
            WeightType::Equal => "equal",
            WeightType::LabelBased => "label_based",
            WeightType::Certainty => "certainty",
            WeightType::FirstSecondGuessDiff => "first_second_guess_diff",
        }
    }

    /// Vote weight of `classifier` voting for `label`.
    ///
    /// `stats` is only read by the probability-based modes; a missing map entry
    /// under `LabelBased` weighs 0.
    #[inline]
    pub fn weight(
        self,
        classifier: usize,
        label: Label,
        stats: Option<&GuessStats>,
        weights: &LabelWeightMap,
    ) -> f64 {
        match self {
            WeightType::Equal => 1.0,
            WeightType::LabelBased => weights.get(&(label, classifier)).copied().unwrap_or(0.0),
            WeightType::Certainty => stats.map_or(1.0, |s| 1.0 - s.entropy),
            WeightType::FirstSecondGuessDiff => {
                stats.map_or(1.0, |s| s.first_value() - s.second_value())
            }
        }
    }
}
