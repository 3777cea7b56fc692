#![doc = include_str!("../README.md")]

// Core stages
pub mod inputs;
pub mod pipeline;
pub mod resolve;
pub mod voting;

// Building blocks
pub mod overlap;
pub mod stats;
pub mod volume;
pub mod weighting;

// Tooling around the stages
pub mod config;
pub mod diagnostics;
pub mod sweep;
pub mod synthetic;
pub mod voters;

mod error;
mod parallel;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::FusionError;
pub use crate::inputs::FusionInputs;
pub use crate::pipeline::{FusionParams, FusionPipeline};
pub use crate::resolve::{ResolverParams, UndecidedResolver};
pub use crate::voting::{VotingEngine, VotingParams};

pub use crate::diagnostics::{FusionReport, TimingBreakdown};

// --- Prelude ---------------------------------------------------------------

/// Everything needed for a typical fusion run.
pub mod prelude {
    pub use crate::inputs::FusionInputs;
    pub use crate::pipeline::{FusionParams, FusionPipeline};
    pub use crate::volume::{Dims, Label, LabelVolume, ProbabilityStack, ScalarVolume};
    pub use crate::voting::VotingParams;
    pub use crate::weighting::WeightType;
    pub use crate::FusionError;
}
