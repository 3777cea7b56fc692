//! Second pass over voxels the voting stage left undecided.
//!
//! For each undecided voxel three frequency histograms are built from the
//! classifiers' probability fields: first-best guesses, second-best guesses
//! and the best label found anywhere in a small neighbourhood window. A
//! shortlist of at most three candidates is scored twice (first+second+
//! neighbour, and first+neighbour); the first score decides, disagreement
//! between the two is reported as an [`AmbiguousVoxel`].
//!
//! Modules
//! - [`params`] – neighbourhood radius and tie-solver switch.
//! - `histogram` – per-voxel guess histograms.
//! - `candidates` – shortlist construction and scoring.
//! - `resolver` – the [`UndecidedResolver`] driving the pass.

mod candidates;
mod histogram;
pub mod params;
mod resolver;

pub use params::{NeighborhoodRadius, ResolverParams};
pub use resolver::{AmbiguousVoxel, Resolution, UndecidedResolver};
