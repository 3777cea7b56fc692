use super::histogram::{ClassifierGuess, GuessHistograms};
use crate::volume::Label;

/// At most three labels worth scoring at an undecided voxel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Shortlist {
    labels: Vec<Label>,
}

impl Shortlist {
    /// Most frequent first guess, runner-up first guess, then the most
    /// frequent neighbourhood label if it is not already listed. Zero
    /// frequencies never qualify; ties go to the lower label.
    pub fn build(hist: &GuessHistograms) -> Self {
        let mut labels = Vec::with_capacity(3);
        if let Some(fg) = argmax_nonzero(&hist.first, None) {
            labels.push(fg);
            if let Some(sg) = argmax_nonzero(&hist.first, Some(fg)) {
                labels.push(sg);
            }
        }
        if let Some(ne) = argmax_nonzero(&hist.neighbor, None) {
            if !labels.contains(&ne) {
                labels.push(ne);
            }
        }
        Self { labels }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn argmax_nonzero(freq: &[u32], skip: Option<Label>) -> Option<Label> {
    let mut best: Option<(Label, u32)> = None;
    for (l, &f) in freq.iter().enumerate() {
        let l = l as Label;
        if f == 0 || skip == Some(l) {
            continue;
        }
        if best.map_or(true, |(_, bf)| f > bf) {
            best = Some((l, f));
        }
    }
    best.map(|(l, _)| l)
}

/// Winners of the two scoring rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Scores {
    /// First + second + neighbour frequency. Authoritative.
    pub fsn: Label,
    /// First + neighbour frequency.
    pub fnb: Label,
}

impl Scores {
    #[inline]
    pub fn agree(&self) -> bool {
        self.fsn == self.fnb
    }
}

/// Score the shortlist; earlier candidates win equal scores.
pub(crate) fn score(shortlist: &Shortlist, hist: &GuessHistograms) -> Option<Scores> {
    let mut fsn: Option<(Label, u32)> = None;
    let mut fnb: Option<(Label, u32)> = None;
    for &l in shortlist.labels() {
        let i = l as usize;
        let fsn_count = hist.first[i] + hist.second[i] + hist.neighbor[i];
        let fn_count = hist.first[i] + hist.neighbor[i];
        if fsn_count > fsn.map_or(0, |(_, c)| c) {
            fsn = Some((l, fsn_count));
        }
        if fn_count > fnb.map_or(0, |(_, c)| c) {
            fnb = Some((l, fn_count));
        }
    }
    match (fsn, fnb) {
        (Some((fsn, _)), Some((fnb, _))) => Some(Scores { fsn, fnb }),
        (Some((l, _)), None) | (None, Some((l, _))) => Some(Scores { fsn: l, fnb: l }),
        (None, None) => None,
    }
}

/// Candidate whose supporting classifiers are least uncertain on average.
///
/// A classifier supports a candidate through its first guess (centre
/// uncertainty) and through its neighbourhood label (neighbour uncertainty).
/// Candidates without support are skipped; the first lowest mean wins.
pub(crate) fn least_uncertain(shortlist: &Shortlist, guesses: &[ClassifierGuess]) -> Option<Label> {
    let mut best: Option<(Label, f64)> = None;
    for &l in shortlist.labels() {
        let mut sum = 0.0;
        let mut count = 0usize;
        for g in guesses {
            if g.first == Some(l) {
                sum += g.center_uncertainty;
                count += 1;
            }
            if g.neighbor == Some(l) {
                sum += g.neighbor_uncertainty;
                count += 1;
            }
        }
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;
        if best.map_or(true, |(_, m)| mean < m) {
            best = Some((l, mean));
        }
    }
    best.map(|(l, _)| l)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(first: &[u32], second: &[u32], neighbor: &[u32]) -> GuessHistograms {
        GuessHistograms {
            first: first.to_vec(),
            second: second.to_vec(),
            neighbor: neighbor.to_vec(),
        }
    }

    #[test]
    fn two_classifier_split_resolves_towards_neighbourhood() {
        // A: first 1, second 2; B: first 2, second 1; neighbourhood says 1.
        let h = hist(&[0, 1, 1], &[0, 1, 1], &[0, 2, 0]);
        let shortlist = Shortlist::build(&h);
        assert_eq!(shortlist.labels(), &[1, 2]);
        let scores = score(&shortlist, &h).unwrap();
        assert_eq!(scores, Scores { fsn: 1, fnb: 1 });
        assert!(scores.agree());
    }

    #[test]
    fn neighbour_candidate_is_appended_once() {
        let h = hist(&[0, 3, 1, 0], &[0, 0, 0, 0], &[0, 0, 0, 4]);
        assert_eq!(Shortlist::build(&h).labels(), &[1, 2, 3]);
        let h = hist(&[0, 3, 1, 0], &[0, 0, 0, 0], &[0, 4, 0, 0]);
        assert_eq!(Shortlist::build(&h).labels(), &[1, 2]);
    }

    #[test]
    fn runner_up_needs_nonzero_frequency() {
        let h = hist(&[0, 2, 0], &[0, 0, 2], &[0, 2, 0]);
        assert_eq!(Shortlist::build(&h).labels(), &[1]);
    }

    #[test]
    fn rules_can_disagree() {
        // label 2 wins on first+second+neighbour, label 1 on first+neighbour
        let h = hist(&[0, 2, 1], &[0, 0, 3], &[0, 1, 1]);
        let scores = score(&Shortlist::build(&h), &h).unwrap();
        assert_eq!(scores.fsn, 2);
        assert_eq!(scores.fnb, 1);
        assert!(!scores.agree());
    }

    #[test]
    fn empty_histograms_have_no_candidates() {
        let h = hist(&[0, 0], &[0, 0], &[0, 0]);
        let shortlist = Shortlist::build(&h);
        assert!(shortlist.is_empty());
        assert_eq!(score(&shortlist, &h), None);
    }

    #[test]
    fn lowest_mean_uncertainty_wins() {
        let h = hist(&[0, 1, 1], &[0, 1, 1], &[0, 1, 1]);
        let shortlist = Shortlist::build(&h);
        let guesses = [
            ClassifierGuess {
                first: Some(1),
                neighbor: Some(1),
                center_uncertainty: 0.8,
                neighbor_uncertainty: 0.6,
            },
            ClassifierGuess {
                first: Some(2),
                neighbor: Some(2),
                center_uncertainty: 0.2,
                neighbor_uncertainty: 0.4,
            },
        ];
        assert_eq!(least_uncertain(&shortlist, &guesses), Some(2));
    }
}
