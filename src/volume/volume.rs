//! Owned dense volume in row-major layout (x fastest, then y, then z).
use super::traits::VolumeView;
use super::{Dims, Label};
use crate::error::FusionError;

#[derive(Clone, Debug, PartialEq)]
pub struct Volume<T> {
    /// Grid extent
    pub dims: Dims,
    /// Backing storage, `dims.len()` values
    pub data: Vec<T>,
}

/// One classifier's segmentation, or the fused result.
pub type LabelVolume = Volume<Label>;
/// Floating-point field (probabilities, decision numbers).
pub type ScalarVolume = Volume<f64>;

impl<T: Copy + Default> Volume<T> {
    /// Construct a default-initialized volume (zeros for numeric types).
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            data: vec![T::default(); dims.len()],
        }
    }

    /// Construct a volume filled with `value`.
    pub fn filled(dims: Dims, value: T) -> Self {
        Self {
            dims,
            data: vec![value; dims.len()],
        }
    }
}

impl<T: Copy> Volume<T> {
    /// Wrap an existing buffer; fails when its length does not match `dims`.
    pub fn from_vec(dims: Dims, data: Vec<T>) -> Result<Self, FusionError> {
        if data.len() != dims.len() {
            return Err(FusionError::BufferLength {
                dims,
                expected: dims.len(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.data[self.dims.index(x, y, z)]
    }

    /// Fails when the buffer length disagrees with `dims`, e.g. after the
    /// public fields were assembled by hand.
    pub fn check_buffer(&self) -> Result<(), FusionError> {
        if self.data.len() != self.voxel_count() {
            return Err(FusionError::BufferLength {
                dims: self.dims,
                expected: self.voxel_count(),
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Value at a linear index.
    #[inline]
    pub fn at(&self, index: usize) -> T {
        self.data[index]
    }
}

impl LabelVolume {
    /// Largest label present, `None` for an empty grid.
    pub fn max_label(&self) -> Option<Label> {
        self.data.iter().copied().max()
    }

    /// Number of voxels carrying `label`.
    pub fn count_label(&self, label: Label) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }
}

impl<T> VolumeView for Volume<T> {
    #[inline]
    fn dims(&self) -> Dims {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        let dims = Dims::new(2, 2, 1);
        assert!(LabelVolume::from_vec(dims, vec![0, 1, 2, 3]).is_ok());
        assert!(matches!(
            LabelVolume::from_vec(dims, vec![0, 1, 2]),
            Err(FusionError::BufferLength { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn access_follows_layout() {
        let dims = Dims::new(3, 2, 2);
        let vol = LabelVolume::from_vec(dims, (0..12).collect()).unwrap();
        assert_eq!(vol.get(0, 1, 1), 9);
        assert_eq!(vol.get(2, 0, 1), 8);
        assert_eq!(vol.max_label(), Some(11));
    }

    #[test]
    fn hand_built_volume_with_short_buffer_is_rejected() {
        let vol = LabelVolume {
            dims: Dims::new(3, 1, 1),
            data: vec![1],
        };
        assert!(matches!(
            vol.check_buffer(),
            Err(FusionError::BufferLength { expected: 3, actual: 1, .. })
        ));
        assert!(LabelVolume::new(Dims::new(3, 1, 1)).check_buffer().is_ok());
    }
}
