//! Per-voxel, per-classifier rank and entropy statistics.
//!
//! A classifier's probability vector at one voxel is scanned once to extract
//! the first- and second-best guesses and the Shannon entropy. Entropy is
//! clamped to `[0, ln N]` and normalized by `ln N`, where `N` is the number of
//! classifiers in the ensemble (not the number of labels).
use crate::volume::{Label, ProbabilityStack};

/// First/second-best guesses and normalized entropy of one probability vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuessStats {
    pub first: Option<(Label, f64)>,
    pub second: Option<(Label, f64)>,
    /// Normalized entropy in `[0, 1]`.
    pub entropy: f64,
}

impl GuessStats {
    /// Scan `(label, probability)` pairs in order.
    ///
    /// A value strictly greater than the current first guess demotes it to
    /// second; otherwise a value strictly greater than the current second (or
    /// any value while second is unset) replaces the second guess.
    pub fn scan<I>(values: I, classifier_count: usize) -> Self
    where
        I: IntoIterator<Item = (Label, f64)>,
    {
        let mut first: Option<(Label, f64)> = None;
        let mut second: Option<(Label, f64)> = None;
        let mut sum = 0.0;
        for (label, p) in values {
            if p > 0.0 {
                sum += p * p.ln();
            }
            match first {
                Some((_, best)) if p <= best => {
                    if second.map_or(true, |(_, s)| p > s) {
                        second = Some((label, p));
                    }
                }
                _ => {
                    second = first;
                    first = Some((label, p));
                }
            }
        }
        Self {
            first,
            second,
            entropy: normalized_entropy(-sum, classifier_count),
        }
    }

    /// Statistics of `stack` at voxel `index`, considering labels `from..`.
    pub fn at_voxel(
        stack: &ProbabilityStack,
        index: usize,
        from: usize,
        classifier_count: usize,
    ) -> Self {
        Self::scan(stack.values_at(index, from), classifier_count)
    }

    #[inline]
    pub fn first_label(&self) -> Option<Label> {
        self.first.map(|(l, _)| l)
    }

    #[inline]
    pub fn second_label(&self) -> Option<Label> {
        self.second.map(|(l, _)| l)
    }

    /// First-best probability, 0 when nothing was scanned.
    #[inline]
    pub fn first_value(&self) -> f64 {
        self.first.map_or(0.0, |(_, v)| v)
    }

    /// Second-best probability, 0 when fewer than two labels were scanned.
    #[inline]
    pub fn second_value(&self) -> f64 {
        self.second.map_or(0.0, |(_, v)| v)
    }
}

/// Entropy of the probabilities at `index`, without ranking.
pub fn entropy_at(
    stack: &ProbabilityStack,
    index: usize,
    from: usize,
    classifier_count: usize,
) -> f64 {
    let raw: f64 = stack
        .values_at(index, from)
        .filter(|&(_, p)| p > 0.0)
        .map(|(_, p)| -p * p.ln())
        .sum();
    normalized_entropy(raw, classifier_count)
}

/// Clamp a raw entropy to `[0, ln n]` and divide by `ln n`.
///
/// With fewer than two classifiers `ln n` is zero and the result is 0.
pub fn normalized_entropy(raw: f64, classifier_count: usize) -> f64 {
    if classifier_count < 2 {
        return 0.0;
    }
    let limit = (classifier_count as f64).ln();
    raw.clamp(0.0, limit) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_first_and_second_guess() {
        let stats = GuessStats::scan([(0, 0.1), (1, 0.6), (2, 0.3)], 3);
        assert_eq!(stats.first, Some((1, 0.6)));
        assert_eq!(stats.second, Some((2, 0.3)));
    }

    #[test]
    fn demoted_first_becomes_second() {
        let stats = GuessStats::scan([(1, 0.2), (2, 0.7), (3, 0.1)], 2);
        assert_eq!(stats.first_label(), Some(2));
        assert_eq!(stats.second_label(), Some(1));
    }

    #[test]
    fn equal_values_keep_first_occurrence() {
        let stats = GuessStats::scan([(1, 0.5), (2, 0.5)], 2);
        assert_eq!(stats.first_label(), Some(1));
        assert_eq!(stats.second_label(), Some(2));
    }

    #[test]
    fn zero_probabilities_do_not_contribute_entropy() {
        let stats = GuessStats::scan([(0, 0.0), (1, 1.0)], 4);
        assert_eq!(stats.entropy, 0.0);
    }

    #[test]
    fn uniform_two_way_split_is_maximal_for_two_classifiers() {
        let stats = GuessStats::scan([(0, 0.5), (1, 0.5)], 2);
        assert!((stats.entropy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_is_clamped_to_classifier_limit() {
        // ln(4) > ln(2): a four-way split is clamped for a two-member ensemble.
        let stats = GuessStats::scan([(0, 0.25), (1, 0.25), (2, 0.25), (3, 0.25)], 2);
        assert_eq!(stats.entropy, 1.0);
    }

    #[test]
    fn single_classifier_has_zero_entropy() {
        assert_eq!(normalized_entropy(0.7, 1), 0.0);
    }
}
