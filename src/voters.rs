//! Voter selection and label weights derived from per-label classifier scores.
//!
//! Scores are usually per-label Dice coefficients of each classifier against
//! a reference segmentation (see [`LabelScores::from_reference`]). They feed
//! the [`WeightType::LabelBased`](crate::weighting::WeightType) weighting and
//! the voter restriction of [`VotingParams`](crate::voting::VotingParams).
use crate::error::FusionError;
use crate::overlap::OverlapMeasures;
use crate::volume::{Label, LabelVolume};
use crate::voting::VoterSet;
use crate::weighting::LabelWeightMap;
use serde::{Deserialize, Serialize};

/// Score matrix indexed `[classifier][label]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelScores {
    rows: Vec<Vec<f64>>,
}

impl LabelScores {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// Per-label Dice of every classifier against `reference`, for labels
    /// `0..label_count`. Labels absent from both volumes score 0.
    pub fn from_reference(
        reference: &LabelVolume,
        classifiers: &[LabelVolume],
        label_count: usize,
    ) -> Result<Self, FusionError> {
        let rows = classifiers
            .iter()
            .map(|c| {
                let m = OverlapMeasures::compute(reference, c, None)?;
                Ok((0..label_count)
                    .map(|l| m.mean_overlap_for(l as Label).unwrap_or(0.0))
                    .collect())
            })
            .collect::<Result<Vec<Vec<f64>>, FusionError>>()?;
        Ok(Self { rows })
    }

    pub fn classifier_count(&self) -> usize {
        self.rows.len()
    }

    /// Labels covered by every row.
    pub fn label_count(&self) -> usize {
        self.rows.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn score(&self, classifier: usize, label: Label) -> Option<f64> {
        self.rows.get(classifier)?.get(label as usize).copied()
    }
}

/// For each label, the `k` classifiers with the highest score.
///
/// Equal scores keep classifier order. `k` is clamped to the number of
/// classifiers; `k == 0` yields an empty set, which means no restriction.
pub fn top_voters(scores: &LabelScores, k: usize) -> VoterSet {
    let k = k.min(scores.classifier_count());
    let mut set = VoterSet::new();
    if k == 0 {
        return set;
    }
    let mut order: Vec<usize> = Vec::with_capacity(scores.classifier_count());
    for label in 0..scores.label_count() {
        order.clear();
        order.extend(0..scores.classifier_count());
        let at = |c: usize| scores.rows[c][label];
        order.sort_by(|&a, &b| at(b).total_cmp(&at(a)));
        set.extend(order.iter().take(k).map(|&c| (label as Label, c)));
    }
    set
}

/// Label weight map with one entry per `(label, classifier)` score.
pub fn label_weights(scores: &LabelScores) -> LabelWeightMap {
    let labels = scores.label_count();
    scores
        .rows
        .iter()
        .enumerate()
        .flat_map(|(c, row)| {
            row.iter()
                .take(labels)
                .enumerate()
                .map(move |(l, &s)| ((l as Label, c), s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Dims;

    fn scores() -> LabelScores {
        LabelScores::new(vec![
            vec![0.9, 0.2, 0.5],
            vec![0.8, 0.7, 0.5],
            vec![0.95, 0.1, 0.6],
        ])
    }

    #[test]
    fn picks_best_classifiers_per_label() {
        let set = top_voters(&scores(), 1);
        let expected: VoterSet = [(0, 2), (1, 1), (2, 2)].into_iter().collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn ties_keep_classifier_order() {
        let set = top_voters(&scores(), 2);
        assert!(set.contains(&(2, 2)));
        assert!(set.contains(&(2, 0)));
        assert!(!set.contains(&(2, 1)));
    }

    #[test]
    fn k_is_clamped() {
        assert_eq!(top_voters(&scores(), 10).len(), 9);
        assert!(top_voters(&scores(), 0).is_empty());
    }

    #[test]
    fn weights_cover_every_pair() {
        let w = label_weights(&scores());
        assert_eq!(w.len(), 9);
        assert_eq!(w[&(1, 1)], 0.7);
        assert_eq!(w[&(0, 2)], 0.95);
    }

    #[test]
    fn reference_scores_are_per_label_dice() {
        let dims = Dims::new(4, 1, 1);
        let truth = LabelVolume::from_vec(dims, vec![0, 1, 1, 2]).unwrap();
        let perfect = truth.clone();
        let off = LabelVolume::from_vec(dims, vec![0, 1, 2, 2]).unwrap();
        let s = LabelScores::from_reference(&truth, &[perfect, off], 3).unwrap();
        assert_eq!(s.score(0, 1), Some(1.0));
        // label 1: intersection 1, union 2 -> Jaccard 0.5 -> Dice 2/3
        assert!((s.score(1, 1).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.label_count(), 3);
    }
}
