//! Guess histograms gathered at a single undecided voxel.
//!
//! Background (label 0) never becomes a candidate here: first/second guesses
//! and the neighbourhood maximum only consider labels `>= 1`.
use super::params::NeighborhoodRadius;
use crate::stats::{entropy_at, GuessStats};
use crate::volume::{Dims, Label, ProbabilityStack};
use log::debug;

/// First labels that may become candidates.
const FIRST_CANDIDATE_LABEL: usize = 1;

/// Frequency of each label across the ensemble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GuessHistograms {
    pub first: Vec<u32>,
    pub second: Vec<u32>,
    pub neighbor: Vec<u32>,
}

impl GuessHistograms {
    pub fn new(label_count: usize) -> Self {
        Self {
            first: vec![0; label_count],
            second: vec![0; label_count],
            neighbor: vec![0; label_count],
        }
    }
}

/// What one classifier contributed, kept for the uncertainty tie solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ClassifierGuess {
    pub first: Option<Label>,
    pub neighbor: Option<Label>,
    /// Normalized entropy at the centre voxel over candidate labels.
    pub center_uncertainty: f64,
    /// Normalized entropy at the selected neighbour over all labels.
    pub neighbor_uncertainty: f64,
}

/// Read-only view shared by all workers of a resolution pass.
pub(crate) struct NeighborhoodSampler<'a> {
    pub stacks: &'a [ProbabilityStack],
    pub dims: Dims,
    pub offsets: Vec<[isize; 3]>,
    pub label_count: usize,
}

impl<'a> NeighborhoodSampler<'a> {
    pub fn new(stacks: &'a [ProbabilityStack], dims: Dims, radius: NeighborhoodRadius) -> Self {
        Self {
            stacks,
            dims,
            offsets: radius.clamped(dims).offsets(),
            label_count: stacks.first().map_or(0, ProbabilityStack::label_count),
        }
    }

    /// Build the three histograms at `index`; per-classifier guesses are
    /// returned alongside for tie solving.
    pub fn sample(&self, index: usize) -> (GuessHistograms, Vec<ClassifierGuess>) {
        let classifiers = self.stacks.len();
        let mut hist = GuessHistograms::new(self.label_count);
        let mut guesses = Vec::with_capacity(classifiers);

        for stack in self.stacks {
            let stats = GuessStats::at_voxel(stack, index, FIRST_CANDIDATE_LABEL, classifiers);
            if let Some(l) = stats.first_label() {
                hist.first[l as usize] += 1;
            }
            if let Some(l) = stats.second_label() {
                hist.second[l as usize] += 1;
            }

            let neighbor = self.best_in_window(stack, index);
            match neighbor {
                Some((l, _)) => hist.neighbor[l as usize] += 1,
                None => {
                    let [x, y, z] = self.dims.coords(index);
                    debug!("no neighbour with probability above 0 at voxel ({x}, {y}, {z})");
                }
            }

            guesses.push(ClassifierGuess {
                first: stats.first_label(),
                neighbor: neighbor.map(|(l, _)| l),
                center_uncertainty: stats.entropy,
                neighbor_uncertainty: neighbor
                    .map_or(0.0, |(_, at)| entropy_at(stack, at, 0, classifiers)),
            });
        }
        (hist, guesses)
    }

    /// Label and voxel index of the highest probability in the window.
    ///
    /// Scans label-major, then offsets; the first strict maximum above zero
    /// wins. Offsets outside the grid are skipped.
    fn best_in_window(&self, stack: &ProbabilityStack, index: usize) -> Option<(Label, usize)> {
        let [x, y, z] = self.dims.coords(index);
        let (x, y, z) = (x as isize, y as isize, z as isize);
        let mut best: Option<(Label, usize)> = None;
        let mut best_p = 0.0;
        for (l, field) in stack.fields.iter().enumerate().skip(FIRST_CANDIDATE_LABEL) {
            for [dx, dy, dz] in &self.offsets {
                let Some(at) = self.dims.checked_index(x + dx, y + dy, z + dz) else {
                    continue;
                };
                let p = field.data[at];
                if p > best_p {
                    best_p = p;
                    best = Some((l as Label, at));
                }
            }
        }
        best
    }
}
