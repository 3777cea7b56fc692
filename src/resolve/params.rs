use crate::volume::Dims;
use serde::{Deserialize, Serialize};

/// Per-axis half-width of the neighbourhood window (centre included).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodRadius {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Default for NeighborhoodRadius {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl NeighborhoodRadius {
    pub const fn uniform(r: usize) -> Self {
        Self { x: r, y: r, z: r }
    }

    /// Number of offsets in the window, saturating at `usize::MAX`.
    pub fn window_len(&self) -> usize {
        let side = |r: usize| r.saturating_mul(2).saturating_add(1);
        side(self.x)
            .saturating_mul(side(self.y))
            .saturating_mul(side(self.z))
    }

    /// Radius limited per axis to the grid extent minus one; a wider window
    /// only adds offsets that fall outside the grid.
    pub fn clamped(&self, dims: Dims) -> Self {
        Self {
            x: self.x.min(dims.w.saturating_sub(1)),
            y: self.y.min(dims.h.saturating_sub(1)),
            z: self.z.min(dims.d.saturating_sub(1)),
        }
    }

    /// Window offsets, x varying fastest, then y, then z.
    pub(crate) fn offsets(&self) -> Vec<[isize; 3]> {
        let (rx, ry, rz) = (self.x as isize, self.y as isize, self.z as isize);
        let mut out = Vec::with_capacity(self.window_len());
        for dz in -rz..=rz {
            for dy in -ry..=ry {
                for dx in -rx..=rx {
                    out.push([dx, dy, dz]);
                }
            }
        }
        out
    }
}

/// Parameters of the undecided-voxel pass.
#[derive(Clone, Debug, Default)]
pub struct ResolverParams {
    pub radius: NeighborhoodRadius,
    /// When the two scores disagree, pick the candidate with the lowest mean
    /// classifier uncertainty instead of the first/second/neighbour winner.
    pub uncertainty_tie_solver: bool,
    /// Upper bound on the number of voxel regions processed concurrently.
    pub max_regions: Option<usize>,
}
