//! Dense 3D voxel buffers used as inputs and outputs of the fusion stages.
//!
//! - [`Volume`] owns a row-major buffer (x fastest, then y, then z).
//! - [`LabelVolume`] and [`ScalarVolume`] are the two concrete pixel types the
//!   engine works with.
//! - [`ProbabilityStack`] groups one classifier's per-label probability fields.
pub mod dims;
pub mod io;
pub mod probability;
pub mod traits;
pub mod volume;

pub use self::dims::Dims;
pub use self::probability::ProbabilityStack;
pub use self::traits::VolumeView;
pub use self::volume::{LabelVolume, ScalarVolume, Volume};

/// Integer class label stored in label volumes. `0` is background.
pub type Label = u32;
