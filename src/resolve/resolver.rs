use super::candidates::{least_uncertain, score, Shortlist};
use super::histogram::NeighborhoodSampler;
use super::params::ResolverParams;
use crate::error::FusionError;
use crate::inputs::FusionInputs;
use crate::parallel::{map_regions, partition, Region};
use crate::volume::{Label, LabelVolume};
use log::{debug, warn};
use serde::Serialize;

/// Minimum ensemble size for neighbourhood resolution.
const MIN_CLASSIFIERS: usize = 2;

/// Undecided voxel where the two scoring rules picked different labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AmbiguousVoxel {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub candidates: Vec<Label>,
    pub fsn_label: Label,
    pub fn_label: Label,
    /// Label written to the output.
    pub chosen: Label,
}

/// Output of [`UndecidedResolver::resolve`].
#[derive(Clone, Debug)]
pub struct Resolution {
    pub labels: LabelVolume,
    pub resolved_count: usize,
    /// Undecided voxels without any candidate label.
    pub remaining_undecided: usize,
    pub ambiguous: Vec<AmbiguousVoxel>,
}

/// Replaces undecided voxels of a fused volume using first/second guesses
/// and neighbourhood consensus of every classifier.
pub struct UndecidedResolver {
    params: ResolverParams,
}

#[derive(Default)]
struct RegionResolution {
    labels: Vec<Label>,
    resolved: usize,
    remaining: usize,
    ambiguous: Vec<AmbiguousVoxel>,
}

impl UndecidedResolver {
    pub fn new(params: ResolverParams) -> Self {
        Self { params }
    }

    /// Resolve every voxel of `fused` equal to `undecided_label`; all other
    /// voxels are copied unchanged.
    pub fn resolve(
        &self,
        inputs: &FusionInputs<'_>,
        fused: &LabelVolume,
        undecided_label: Label,
    ) -> Result<Resolution, FusionError> {
        let classifiers = inputs.classifier_count();
        if classifiers < MIN_CLASSIFIERS {
            return Err(FusionError::InsufficientClassifiers {
                found: classifiers,
                minimum: MIN_CLASSIFIERS,
            });
        }
        let stacks = inputs
            .probability_stacks()
            .ok_or(FusionError::MissingProbabilities("undecided pixel resolution"))?;
        let summary = inputs.validate()?;
        if fused.dims != summary.dims {
            return Err(FusionError::DimensionMismatch {
                context: "fused label volume".to_string(),
                expected: summary.dims,
                actual: fused.dims,
            });
        }
        fused.check_buffer()?;

        let sampler = NeighborhoodSampler::new(stacks, summary.dims, self.params.radius);
        debug!(
            "UndecidedResolver::resolve {} classifiers on {} grid, window={} voxels, tie solver={}",
            classifiers,
            summary.dims,
            sampler.offsets.len(),
            self.params.uncertainty_tie_solver
        );

        let regions = partition(summary.dims.len(), self.params.max_regions);
        let parts = map_regions(regions, |region| {
            self.resolve_region(&sampler, fused, undecided_label, region)
        });

        let mut labels = Vec::with_capacity(summary.dims.len());
        let mut resolved_count = 0;
        let mut remaining_undecided = 0;
        let mut ambiguous = Vec::new();
        for part in parts {
            labels.extend(part.labels);
            resolved_count += part.resolved;
            remaining_undecided += part.remaining;
            ambiguous.extend(part.ambiguous);
        }
        debug!(
            "UndecidedResolver::resolve resolved={} remaining={} ambiguous={}",
            resolved_count,
            remaining_undecided,
            ambiguous.len()
        );

        Ok(Resolution {
            labels: LabelVolume {
                dims: summary.dims,
                data: labels,
            },
            resolved_count,
            remaining_undecided,
            ambiguous,
        })
    }

    fn resolve_region(
        &self,
        sampler: &NeighborhoodSampler<'_>,
        fused: &LabelVolume,
        undecided_label: Label,
        region: Region,
    ) -> RegionResolution {
        let mut out = RegionResolution {
            labels: Vec::with_capacity(region.len()),
            ..Default::default()
        };
        for index in region.voxels {
            let current = fused.data[index];
            if current != undecided_label {
                out.labels.push(current);
                continue;
            }
            let (hist, guesses) = sampler.sample(index);
            let shortlist = Shortlist::build(&hist);
            let Some(scores) = score(&shortlist, &hist) else {
                out.labels.push(current);
                out.remaining += 1;
                continue;
            };

            let mut chosen = scores.fsn;
            if !scores.agree() {
                if self.params.uncertainty_tie_solver {
                    chosen = least_uncertain(&shortlist, &guesses).unwrap_or(scores.fsn);
                }
                let [x, y, z] = sampler.dims.coords(index);
                warn!(
                    "ambiguous result at voxel ({x}, {y}, {z}): first+second+neighbour picks {}, first+neighbour picks {}, using {chosen}",
                    scores.fsn, scores.fnb
                );
                out.ambiguous.push(AmbiguousVoxel {
                    x,
                    y,
                    z,
                    candidates: shortlist.labels().to_vec(),
                    fsn_label: scores.fsn,
                    fn_label: scores.fnb,
                    chosen,
                });
            }
            out.labels.push(chosen);
            out.resolved += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::NeighborhoodRadius;
    use crate::volume::{Dims, ProbabilityStack, ScalarVolume};

    fn stack(dims: Dims, fields: &[&[f64]]) -> ProbabilityStack {
        ProbabilityStack::new(
            fields
                .iter()
                .map(|f| ScalarVolume::from_vec(dims, f.to_vec()).unwrap())
                .collect(),
        )
    }

    #[test]
    fn split_voxel_follows_neighbourhood() {
        // Voxel 0 is undecided; label 1 dominates voxel 1 for both classifiers.
        let dims = Dims::new(2, 1, 1);
        let labels = vec![
            LabelVolume::from_vec(dims, vec![1, 1]).unwrap(),
            LabelVolume::from_vec(dims, vec![2, 1]).unwrap(),
        ];
        let stacks = vec![
            stack(dims, &[&[0.0, 0.0], &[0.6, 0.99], &[0.4, 0.01]]),
            stack(dims, &[&[0.0, 0.0], &[0.4, 0.99], &[0.6, 0.01]]),
        ];
        let fused = LabelVolume::from_vec(dims, vec![3, 1]).unwrap();
        let inputs = FusionInputs::new(&labels).with_probabilities(&stacks);
        let res = UndecidedResolver::new(ResolverParams::default())
            .resolve(&inputs, &fused, 3)
            .unwrap();
        assert_eq!(res.labels.data, vec![1, 1]);
        assert_eq!(res.resolved_count, 1);
        assert_eq!(res.remaining_undecided, 0);
        assert!(res.ambiguous.is_empty());
    }

    #[test]
    fn decided_voxels_pass_through() {
        let dims = Dims::new(3, 1, 1);
        let labels = vec![
            LabelVolume::from_vec(dims, vec![1, 2, 2]).unwrap(),
            LabelVolume::from_vec(dims, vec![1, 2, 1]).unwrap(),
        ];
        let p = stack(dims, &[&[0.0; 3], &[0.1, 0.1, 0.1], &[0.9, 0.9, 0.9]]);
        let stacks = vec![p.clone(), p];
        // fused disagrees with the probabilities on purpose
        let fused = LabelVolume::from_vec(dims, vec![1, 2, 1]).unwrap();
        let inputs = FusionInputs::new(&labels).with_probabilities(&stacks);
        let res = UndecidedResolver::new(ResolverParams::default())
            .resolve(&inputs, &fused, 3)
            .unwrap();
        assert_eq!(res.labels, fused);
        assert_eq!(res.resolved_count, 0);
    }

    #[test]
    fn voxel_without_candidates_stays_undecided() {
        let dims = Dims::new(1, 1, 1);
        // background only: nothing at or above label 1 can be a candidate
        let labels = vec![LabelVolume::filled(dims, 0), LabelVolume::filled(dims, 0)];
        let p = stack(dims, &[&[1.0]]);
        let stacks = vec![p.clone(), p];
        let fused = LabelVolume::filled(dims, 1);
        let inputs = FusionInputs::new(&labels).with_probabilities(&stacks);
        let res = UndecidedResolver::new(ResolverParams {
            radius: NeighborhoodRadius::uniform(0),
            ..Default::default()
        })
        .resolve(&inputs, &fused, 1)
        .unwrap();
        assert_eq!(res.labels.data, vec![1]);
        assert_eq!(res.remaining_undecided, 1);
    }

    #[test]
    fn one_classifier_is_rejected() {
        let dims = Dims::new(1, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 1)];
        let stacks = vec![stack(dims, &[&[0.0], &[1.0]])];
        let inputs = FusionInputs::new(&labels).with_probabilities(&stacks);
        let err = UndecidedResolver::new(ResolverParams::default())
            .resolve(&inputs, &labels[0], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            FusionError::InsufficientClassifiers { found: 1, minimum: 2 }
        ));
    }

    #[test]
    fn probabilities_are_required() {
        let dims = Dims::new(1, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 1), LabelVolume::filled(dims, 1)];
        let err = UndecidedResolver::new(ResolverParams::default())
            .resolve(&FusionInputs::new(&labels), &labels[0], 2)
            .unwrap_err();
        assert!(matches!(err, FusionError::MissingProbabilities(_)));
    }

    #[test]
    fn fused_grid_must_match() {
        let dims = Dims::new(2, 1, 1);
        let labels = vec![LabelVolume::filled(dims, 1), LabelVolume::filled(dims, 1)];
        let p = stack(dims, &[&[0.0, 0.0], &[1.0, 1.0]]);
        let stacks = vec![p.clone(), p];
        let fused = LabelVolume::filled(Dims::new(1, 2, 1), 1);
        let err = UndecidedResolver::new(ResolverParams::default())
            .resolve(
                &FusionInputs::new(&labels).with_probabilities(&stacks),
                &fused,
                2,
            )
            .unwrap_err();
        assert!(matches!(err, FusionError::DimensionMismatch { .. }));
    }
}
