//! Set-overlap measures between a source and a target label volume.
//!
//! Counts are gathered per label over contiguous voxel regions and reduced
//! after the join. Aggregate measures skip label 0 (background); a ratio
//! whose denominator is zero is reported as `None`.
//!
//! Typical usage:
//! ```no_run
//! use label_fusion::overlap::OverlapMeasures;
//! use label_fusion::volume::LabelVolume;
//!
//! # fn example(truth: &LabelVolume, fused: &LabelVolume) -> Result<(), label_fusion::FusionError> {
//! let m = OverlapMeasures::compute(truth, fused, Some(3))?;
//! if let Some(dice) = m.mean_overlap() {
//!     println!("mean Dice {dice:.3}");
//! }
//! # Ok(())
//! # }
//! ```
use crate::error::FusionError;
use crate::parallel::{map_regions, partition};
use crate::volume::{Label, LabelVolume};
use serde::Serialize;
use std::collections::BTreeMap;

/// Voxel counts for one label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabelSetMeasures {
    pub source: usize,
    pub target: usize,
    pub union: usize,
    pub intersection: usize,
    /// Voxels labelled by the source but not by the target.
    pub source_complement: usize,
    /// Voxels labelled by the target but not by the source.
    pub target_complement: usize,
}

impl LabelSetMeasures {
    fn merge(&mut self, other: &LabelSetMeasures) {
        self.source += other.source;
        self.target += other.target;
        self.union += other.union;
        self.intersection += other.intersection;
        self.source_complement += other.source_complement;
        self.target_complement += other.target_complement;
    }
}

type MeasureMap = BTreeMap<Label, LabelSetMeasures>;

/// Per-label overlap counts of one source/target comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OverlapMeasures {
    labels: MeasureMap,
    /// Voxels skipped because the target carried the ignored label.
    ignored_voxels: usize,
}

impl OverlapMeasures {
    /// Compare `source` with `target` voxel by voxel. Voxels whose target
    /// label equals `ignored_label` do not contribute.
    pub fn compute(
        source: &LabelVolume,
        target: &LabelVolume,
        ignored_label: Option<Label>,
    ) -> Result<Self, FusionError> {
        if source.dims != target.dims {
            return Err(FusionError::DimensionMismatch {
                context: "overlap target".to_string(),
                expected: source.dims,
                actual: target.dims,
            });
        }
        let parts = map_regions(partition(source.dims.len(), None), |region| {
            let mut map = MeasureMap::new();
            let mut ignored = 0usize;
            for i in region.voxels {
                let (s, t) = (source.data[i], target.data[i]);
                if ignored_label == Some(t) {
                    ignored += 1;
                    continue;
                }
                map.entry(s).or_default().source += 1;
                map.entry(t).or_default().target += 1;
                if s == t {
                    let m = map.entry(s).or_default();
                    m.intersection += 1;
                    m.union += 1;
                } else {
                    let ms = map.entry(s).or_default();
                    ms.union += 1;
                    ms.source_complement += 1;
                    let mt = map.entry(t).or_default();
                    mt.union += 1;
                    mt.target_complement += 1;
                }
            }
            (map, ignored)
        });

        let mut out = Self::default();
        for (map, ignored) in parts {
            out.ignored_voxels += ignored;
            for (label, m) in map {
                out.labels.entry(label).or_default().merge(&m);
            }
        }
        Ok(out)
    }

    pub fn label_measures(&self) -> &BTreeMap<Label, LabelSetMeasures> {
        &self.labels
    }

    pub fn ignored_voxels(&self) -> usize {
        self.ignored_voxels
    }

    /// Intersection over target, summed over foreground labels.
    pub fn total_overlap(&self) -> Option<f64> {
        self.aggregate(|m| (m.intersection as f64, m.target as f64))
    }

    /// Jaccard index over foreground labels.
    pub fn union_overlap(&self) -> Option<f64> {
        self.aggregate(|m| (m.intersection as f64, m.union as f64))
    }

    /// Dice coefficient, derived from the Jaccard index.
    pub fn mean_overlap(&self) -> Option<f64> {
        self.union_overlap().map(jaccard_to_dice)
    }

    pub fn volume_similarity(&self) -> Option<f64> {
        self.aggregate(|m| {
            let (s, t) = (m.source as f64, m.target as f64);
            (s - t, s + t)
        })
        .map(|v| 2.0 * v)
    }

    pub fn false_negative_error(&self) -> Option<f64> {
        self.aggregate(|m| (m.target_complement as f64, m.target as f64))
    }

    pub fn false_positive_error(&self) -> Option<f64> {
        self.aggregate(|m| (m.source_complement as f64, m.source as f64))
    }

    pub fn target_overlap_for(&self, label: Label) -> Option<f64> {
        self.per_label(label, |m| (m.intersection as f64, m.target as f64))
    }

    pub fn union_overlap_for(&self, label: Label) -> Option<f64> {
        self.per_label(label, |m| (m.intersection as f64, m.union as f64))
    }

    pub fn mean_overlap_for(&self, label: Label) -> Option<f64> {
        self.union_overlap_for(label).map(jaccard_to_dice)
    }

    pub fn volume_similarity_for(&self, label: Label) -> Option<f64> {
        self.per_label(label, |m| {
            let (s, t) = (m.source as f64, m.target as f64);
            (s - t, s + t)
        })
        .map(|v| 2.0 * v)
    }

    pub fn false_negative_error_for(&self, label: Label) -> Option<f64> {
        self.per_label(label, |m| (m.target_complement as f64, m.target as f64))
    }

    pub fn false_positive_error_for(&self, label: Label) -> Option<f64> {
        self.per_label(label, |m| (m.source_complement as f64, m.source as f64))
    }

    fn aggregate<F>(&self, terms: F) -> Option<f64>
    where
        F: Fn(&LabelSetMeasures) -> (f64, f64),
    {
        let (num, den) = self
            .labels
            .iter()
            .filter(|(label, _)| **label != 0)
            .map(|(_, m)| terms(m))
            .fold((0.0, 0.0), |(n, d), (a, b)| (n + a, d + b));
        ratio(num, den)
    }

    fn per_label<F>(&self, label: Label, terms: F) -> Option<f64>
    where
        F: Fn(&LabelSetMeasures) -> (f64, f64),
    {
        let (num, den) = terms(self.labels.get(&label)?);
        ratio(num, den)
    }
}

#[inline]
fn ratio(num: f64, den: f64) -> Option<f64> {
    (den != 0.0).then(|| num / den)
}

#[inline]
fn jaccard_to_dice(u: f64) -> f64 {
    2.0 * u / (1.0 + u)
}
