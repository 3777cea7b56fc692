use super::Dims;

/// Anything laid out on a voxel grid.
pub trait VolumeView {
    fn dims(&self) -> Dims;

    fn voxel_count(&self) -> usize {
        self.dims().len()
    }

    fn same_grid<V: VolumeView + ?Sized>(&self, other: &V) -> bool {
        self.dims() == other.dims()
    }
}
