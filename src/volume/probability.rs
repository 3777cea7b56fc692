//! Per-classifier probability fields, indexed by label id.
use super::traits::VolumeView;
use super::{Dims, Label, ScalarVolume};

/// Probabilities of one classifier for every label of a run.
///
/// `fields[l]` holds the classifier's confidence that each voxel belongs to
/// label `l`. Callers are expected to supply vectors summing to roughly one
/// per voxel; the engine never renormalizes.
#[derive(Clone, Debug, Default)]
pub struct ProbabilityStack {
    pub fields: Vec<ScalarVolume>,
}

impl ProbabilityStack {
    pub fn new(fields: Vec<ScalarVolume>) -> Self {
        Self { fields }
    }

    /// Number of label fields (must equal the run's total label count).
    #[inline]
    pub fn label_count(&self) -> usize {
        self.fields.len()
    }

    /// Probability of `label` at linear voxel `index`.
    #[inline]
    pub fn value(&self, label: Label, index: usize) -> f64 {
        self.fields[label as usize].data[index]
    }

    /// `(label, probability)` pairs at `index` for labels `from..label_count`.
    pub fn values_at(&self, index: usize, from: usize) -> impl Iterator<Item = (Label, f64)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .skip(from)
            .map(move |(l, field)| (l as Label, field.data[index]))
    }
}

impl VolumeView for ProbabilityStack {
    /// Grid of the first field; [`crate::inputs::FusionInputs::validate`]
    /// checks the remaining ones individually.
    fn dims(&self) -> Dims {
        self.fields.first().map(|f| f.dims).unwrap_or_default()
    }
}
