//! Deterministic synthetic ensembles for demos, sweeps and tests.
//!
//! The ground truth is a set of concentric ellipsoidal shells around the
//! volume centre (label 1 innermost, background outside the outermost
//! shell). Each classifier copies the ground truth and relabels a share of
//! voxels at random; its probability fields put `confidence` on the label it
//! chose and spread the rest evenly over the other labels. Probability stacks
//! stop at the highest label any classifier produced.
use crate::volume::{Dims, Label, LabelVolume, ProbabilityStack, ScalarVolume};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticParams {
    pub dims: Dims,
    /// Labels including background; at least 2.
    pub label_count: usize,
    pub classifiers: usize,
    /// Relabelling probability of the first classifier.
    pub noise: f64,
    /// Added to the relabelling probability of each further classifier.
    pub noise_step: f64,
    /// Probability range assigned to the chosen label.
    pub min_confidence: f64,
    pub max_confidence: f64,
    pub seed: u64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            dims: Dims::new(32, 32, 16),
            label_count: 4,
            classifiers: 5,
            noise: 0.1,
            noise_step: 0.05,
            min_confidence: 0.5,
            max_confidence: 0.95,
            seed: 7,
        }
    }
}

/// Ground truth plus one label volume and probability stack per classifier.
#[derive(Clone, Debug)]
pub struct SyntheticEnsemble {
    pub ground_truth: LabelVolume,
    pub labels: Vec<LabelVolume>,
    pub probabilities: Vec<ProbabilityStack>,
}

impl SyntheticEnsemble {
    pub fn generate(params: &SyntheticParams) -> Self {
        let label_count = params.label_count.max(2);
        let ground_truth = shells(params.dims, label_count);
        let mut rng = StdRng::seed_from_u64(params.seed);

        let labels: Vec<LabelVolume> = (0..params.classifiers)
            .map(|c| {
                let noise = (params.noise + params.noise_step * c as f64).clamp(0.0, 1.0);
                let mut volume = ground_truth.clone();
                for label in volume.data.iter_mut() {
                    if rng.gen_bool(noise) {
                        *label = rng.gen_range(0..label_count) as Label;
                    }
                }
                volume
            })
            .collect();

        // Fusion derives the label count from the classifier volumes, so the
        // stacks only cover labels some classifier actually produced.
        let stack_labels = labels
            .iter()
            .filter_map(LabelVolume::max_label)
            .max()
            .map_or(1, |max| max as usize + 1);
        if stack_labels < label_count {
            debug!(
                "SyntheticEnsemble::generate labels {stack_labels}..{label_count} never drawn, \
                 probability stacks trimmed to {stack_labels} fields"
            );
        }
        let probabilities = labels
            .iter()
            .map(|volume| probability_stack(volume, stack_labels, params, &mut rng))
            .collect();

        Self {
            ground_truth,
            labels,
            probabilities,
        }
    }
}

/// `confidence` on the voxel's label, the remainder spread evenly over the
/// other `label_count - 1` fields.
fn probability_stack(
    volume: &LabelVolume,
    label_count: usize,
    params: &SyntheticParams,
    rng: &mut StdRng,
) -> ProbabilityStack {
    let (lo, hi) = confidence_range(params);
    let mut fields = vec![ScalarVolume::new(volume.dims); label_count];
    for (i, &label) in volume.data.iter().enumerate() {
        if label_count == 1 {
            fields[0].data[i] = 1.0;
            continue;
        }
        let confidence = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let rest = (1.0 - confidence) / (label_count - 1) as f64;
        for (l, field) in fields.iter_mut().enumerate() {
            field.data[i] = if l == label as usize { confidence } else { rest };
        }
    }
    ProbabilityStack::new(fields)
}

fn confidence_range(params: &SyntheticParams) -> (f64, f64) {
    let lo = params.min_confidence.clamp(0.0, 1.0);
    let hi = params.max_confidence.clamp(lo, 1.0);
    (lo, hi)
}

/// Concentric shells, label `1` at the centre.
pub fn shells(dims: Dims, label_count: usize) -> LabelVolume {
    let mut volume = LabelVolume::new(dims);
    let foreground = label_count.saturating_sub(1).max(1) as f64;
    let half = |n: usize| (n as f64 / 2.0).max(0.5);
    let (hx, hy, hz) = (half(dims.w), half(dims.h), half(dims.d));
    for (i, label) in volume.data.iter_mut().enumerate() {
        let [x, y, z] = dims.coords(i);
        let dx = (x as f64 + 0.5 - hx) / hx;
        let dy = (y as f64 + 0.5 - hy) / hy;
        let dz = (z as f64 + 0.5 - hz) / hz;
        let r = (dx * dx + dy * dy + dz * dz).sqrt();
        *label = if r >= 1.0 {
            0
        } else {
            (1 + (r * foreground) as usize).min(label_count - 1) as Label
        };
    }
    volume
}
