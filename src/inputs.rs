//! Borrowed bundle of everything a fusion run reads.
//!
//! The engine never owns the classifier outputs: callers keep the label
//! volumes and probability stacks and lend them for the duration of a run.
//! [`FusionInputs::validate`] performs every grid/shape check up front so the
//! per-voxel code can index without further checks.
use crate::error::FusionError;
use crate::volume::{Dims, Label, LabelVolume, ProbabilityStack, VolumeView};

#[derive(Clone, Copy, Debug)]
pub struct FusionInputs<'a> {
    /// One segmentation per classifier, all on the same grid.
    pub labels: &'a [LabelVolume],
    /// Optional per-classifier probability fields (same order as `labels`).
    pub probabilities: Option<&'a [ProbabilityStack]>,
}

/// Shape facts derived once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSummary {
    pub dims: Dims,
    pub classifiers: usize,
    /// `1 + max label` over all label volumes.
    pub total_label_count: usize,
}

impl<'a> FusionInputs<'a> {
    pub fn new(labels: &'a [LabelVolume]) -> Self {
        Self {
            labels,
            probabilities: None,
        }
    }

    pub fn with_probabilities(mut self, probabilities: &'a [ProbabilityStack]) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    /// Number of classifiers (label volumes).
    #[inline]
    pub fn classifier_count(&self) -> usize {
        self.labels.len()
    }

    /// Probability stacks, treating an empty slice as absent.
    pub fn probability_stacks(&self) -> Option<&'a [ProbabilityStack]> {
        self.probabilities.filter(|p| !p.is_empty())
    }

    /// `1 + max label` over all label volumes (1 when every voxel is background).
    pub fn total_label_count(&self) -> usize {
        self.max_label().map_or(1, |max| max as usize + 1)
    }

    /// Largest label observed in any input.
    pub fn max_label(&self) -> Option<Label> {
        self.labels.iter().filter_map(LabelVolume::max_label).max()
    }

    /// Check grid agreement, buffer lengths and probability shapes; returns
    /// the derived shape facts.
    pub fn validate(&self) -> Result<InputSummary, FusionError> {
        let first = self.labels.first().ok_or(FusionError::EmptyInput)?;
        let dims = first.dims();
        for (i, vol) in self.labels.iter().enumerate() {
            vol.check_buffer()?;
            if !vol.same_grid(first) {
                return Err(FusionError::DimensionMismatch {
                    context: format!("label volume {i}"),
                    expected: dims,
                    actual: vol.dims(),
                });
            }
        }

        let total_label_count = self.total_label_count();
        if let Some(stacks) = self.probability_stacks() {
            if stacks.len() != self.labels.len() {
                return Err(FusionError::ClassifierCountMismatch {
                    labels: self.labels.len(),
                    probabilities: stacks.len(),
                });
            }
            for (i, stack) in stacks.iter().enumerate() {
                if stack.label_count() != total_label_count {
                    return Err(FusionError::LabelCountMismatch {
                        classifier: i,
                        expected: total_label_count,
                        actual: stack.label_count(),
                    });
                }
                for (l, field) in stack.fields.iter().enumerate() {
                    if !field.same_grid(first) {
                        return Err(FusionError::DimensionMismatch {
                            context: format!("probability field (classifier {i}, label {l})"),
                            expected: dims,
                            actual: field.dims(),
                        });
                    }
                    field.check_buffer()?;
                }
            }
        }

        Ok(InputSummary {
            dims,
            classifiers: self.labels.len(),
            total_label_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::ScalarVolume;

    #[test]
    fn rejects_mismatched_label_grids() {
        let labels = vec![
            LabelVolume::new(Dims::new(2, 2, 1)),
            LabelVolume::new(Dims::new(2, 1, 1)),
        ];
        let err = FusionInputs::new(&labels).validate().unwrap_err();
        assert!(matches!(err, FusionError::DimensionMismatch { .. }));
    }

    #[test]
    fn rejects_short_probability_stack() {
        let dims = Dims::new(1, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 2), LabelVolume::filled(dims, 1)];
        let stack = ProbabilityStack::new(vec![ScalarVolume::new(dims); 2]);
        let stacks = vec![stack.clone(), stack];
        let err = FusionInputs::new(&labels)
            .with_probabilities(&stacks)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            FusionError::LabelCountMismatch { expected: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn rejects_label_buffer_shorter_than_grid() {
        let dims = Dims::new(3, 1, 1);
        let labels = vec![
            LabelVolume::filled(dims, 1),
            LabelVolume { dims, data: vec![1] },
        ];
        let err = FusionInputs::new(&labels).validate().unwrap_err();
        assert!(matches!(
            err,
            FusionError::BufferLength { expected: 3, actual: 1, .. }
        ));
    }

    #[test]
    fn rejects_probability_field_buffer_shorter_than_grid() {
        let dims = Dims::new(2, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 1)];
        let short = ScalarVolume {
            dims,
            data: vec![0.5],
        };
        let stacks = vec![ProbabilityStack::new(vec![ScalarVolume::new(dims), short])];
        let err = FusionInputs::new(&labels)
            .with_probabilities(&stacks)
            .validate()
            .unwrap_err();
        assert!(matches!(err, FusionError::BufferLength { .. }));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            FusionInputs::new(&[]).validate(),
            Err(FusionError::EmptyInput)
        ));
    }
}
