use serde::{Deserialize, Serialize};
use std::fmt;

/// Extent of a voxel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    /// Voxels along x
    pub w: usize,
    /// Voxels along y
    pub h: usize,
    /// Voxels along z (slices)
    pub d: usize,
}

impl Dims {
    pub const fn new(w: usize, h: usize, d: usize) -> Self {
        Self { w, h, d }
    }

    /// Total voxel count.
    #[inline]
    pub fn len(&self) -> usize {
        self.w * self.h * self.d
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of `(x, y, z)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.h + y) * self.w + x
    }

    /// Inverse of [`Dims::index`].
    #[inline]
    pub fn coords(&self, index: usize) -> [usize; 3] {
        let plane = self.w * self.h;
        let z = index / plane;
        let rem = index % plane;
        [rem % self.w, rem / self.w, z]
    }

    /// Linear index of a signed coordinate, `None` when it falls outside the grid.
    #[inline]
    pub fn checked_index(&self, x: isize, y: isize, z: isize) -> Option<usize> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        (x < self.w && y < self.h && z < self.d).then(|| self.index(x, y, z))
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.w, self.h, self.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_invert_index() {
        let dims = Dims::new(4, 3, 2);
        for i in 0..dims.len() {
            let [x, y, z] = dims.coords(i);
            assert_eq!(dims.index(x, y, z), i);
        }
    }

    #[test]
    fn checked_index_rejects_out_of_bounds() {
        let dims = Dims::new(2, 2, 2);
        assert_eq!(dims.checked_index(-1, 0, 0), None);
        assert_eq!(dims.checked_index(0, 2, 0), None);
        assert_eq!(dims.checked_index(1, 1, 1), Some(7));
    }
}
