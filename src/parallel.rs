//! Voxel-region partitioning and conditional parallel iteration.
//!
//! Both fusion stages are pure per-voxel functions, so the linear voxel range
//! is cut into contiguous [`Region`]s that are processed independently. With
//! the `parallel` feature the regions run on the rayon pool; otherwise they
//! run sequentially. Results come back in region order, so concatenating them
//! rebuilds the full volume and partial counters are reduced after the join.
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::ops::Range;

/// Smallest region worth scheduling on its own.
const MIN_REGION_VOXELS: usize = 1024;

/// Contiguous range of linear voxel indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub index: usize,
    pub voxels: Range<usize>,
}

impl Region {
    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

/// Split `total` voxels into at most `max_regions` contiguous regions.
///
/// `None` picks a count from the worker pool size. Regions never go below
/// [`MIN_REGION_VOXELS`] unless the whole volume is smaller.
pub fn partition(total: usize, max_regions: Option<usize>) -> Vec<Region> {
    if total == 0 {
        return Vec::new();
    }
    let wanted = max_regions.unwrap_or_else(default_region_count).max(1);
    let by_size = total.div_ceil(MIN_REGION_VOXELS).max(1);
    let count = match max_regions {
        Some(_) => wanted.min(total),
        None => wanted.min(by_size),
    };
    let chunk = total.div_ceil(count);
    (0..count)
        .map(|i| Region {
            index: i,
            voxels: (i * chunk).min(total)..((i + 1) * chunk).min(total),
        })
        .filter(|r| !r.is_empty())
        .collect()
}

#[cfg(feature = "parallel")]
fn default_region_count() -> usize {
    rayon::current_num_threads() * 4
}

#[cfg(not(feature = "parallel"))]
fn default_region_count() -> usize {
    1
}

/// Process regions in parallel (with `parallel`) or sequentially, keeping order.
#[cfg(feature = "parallel")]
pub fn map_regions<R, F>(regions: Vec<Region>, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(Region) -> R + Sync + Send,
{
    regions.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn map_regions<R, F>(regions: Vec<Region>, f: F) -> Vec<R>
where
    F: Fn(Region) -> R,
{
    regions.into_iter().map(f).collect()
}
