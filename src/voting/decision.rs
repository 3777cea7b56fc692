use super::params::ConfigWarning;
use crate::volume::{Label, LabelVolume, ScalarVolume};
use crate::weighting::WeightType;
use serde::Serialize;

/// Why a voxel was left undecided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndecidedReason {
    /// Every classifier was filtered out (eligibility or entropy).
    NoVoters,
    /// Two labels share the highest tally.
    Tie,
    AbsoluteMinPercentage,
    MinDifference,
    MinRatio,
}

/// Outcome of voting at one voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Decided(Label),
    Undecided(UndecidedReason),
}

impl Decision {
    /// Concrete output label, mapping undecided voxels to the sentinel.
    #[inline]
    pub fn label(self, undecided_label: Label) -> Label {
        match self {
            Decision::Decided(l) => l,
            Decision::Undecided(_) => undecided_label,
        }
    }
}

/// Undecided voxel counts per rejection rule (first failing rule wins).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UndecidedBreakdown {
    pub no_voters: usize,
    pub tie: usize,
    pub absolute_min_percentage: usize,
    pub min_difference: usize,
    pub min_ratio: usize,
}

impl UndecidedBreakdown {
    pub fn record(&mut self, reason: UndecidedReason) {
        match reason {
            UndecidedReason::NoVoters => self.no_voters += 1,
            UndecidedReason::Tie => self.tie += 1,
            UndecidedReason::AbsoluteMinPercentage => self.absolute_min_percentage += 1,
            UndecidedReason::MinDifference => self.min_difference += 1,
            UndecidedReason::MinRatio => self.min_ratio += 1,
        }
    }

    pub fn merge(&mut self, other: &UndecidedBreakdown) {
        self.no_voters += other.no_voters;
        self.tie += other.tie;
        self.absolute_min_percentage += other.absolute_min_percentage;
        self.min_difference += other.min_difference;
        self.min_ratio += other.min_ratio;
    }

    pub fn total(&self) -> usize {
        self.no_voters
            + self.tie
            + self.absolute_min_percentage
            + self.min_difference
            + self.min_ratio
    }
}

/// Selector for one of the four decision fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    FirstPercentage,
    PercentageDifference,
    Ratio,
    PixelEntropy,
}

/// Diagnostic "decision numbers" written for every voted voxel.
///
/// Voxels without any voter keep 0 in all four fields.
#[derive(Clone, Debug)]
pub struct DecisionFields {
    /// First-best votes divided by the ensemble size.
    pub first_percentage: ScalarVolume,
    /// First minus second best share.
    pub percentage_difference: ScalarVolume,
    /// First/second vote ratio, ensemble size when second has no votes.
    pub ratio: ScalarVolume,
    /// Mean normalized entropy over all classifiers.
    pub pixel_entropy: ScalarVolume,
}

impl DecisionFields {
    pub fn get(&self, kind: DecisionKind) -> &ScalarVolume {
        match kind {
            DecisionKind::FirstPercentage => &self.first_percentage,
            DecisionKind::PercentageDifference => &self.percentage_difference,
            DecisionKind::Ratio => &self.ratio,
            DecisionKind::PixelEntropy => &self.pixel_entropy,
        }
    }
}

/// Everything the voting stage produces.
#[derive(Clone, Debug)]
pub struct VotingOutput {
    /// Fused labels, undecided voxels carry `undecided_label`.
    pub labels: LabelVolume,
    pub decision: DecisionFields,
    pub undecided_count: usize,
    pub undecided_by_reason: UndecidedBreakdown,
    pub undecided_label: Label,
    pub total_label_count: usize,
    /// Weighting mode actually used after fallbacks.
    pub weight_type: WeightType,
    pub warnings: Vec<ConfigWarning>,
}

impl VotingOutput {
    /// Share of voxels left undecided.
    pub fn undecided_fraction(&self) -> f64 {
        let total = self.labels.dims.len();
        if total == 0 {
            0.0
        } else {
            self.undecided_count as f64 / total as f64
        }
    }
}
