//! Weighted label voting across an ensemble of segmentations.
//!
//! For every voxel the engine tallies weighted votes of all eligible
//! classifiers, picks the label with the most votes and rejects the decision
//! when the tally is tied or fails one of the configured thresholds. Rejected
//! voxels receive the undecided sentinel label and can be revisited by
//! [`crate::resolve`].
//!
//! Modules
//! - [`params`] – thresholds, weighting mode, weight/eligibility maps.
//! - [`decision`] – per-voxel decision type and the diagnostic fields.
//! - `engine` – the [`VotingEngine`] itself.

pub mod decision;
mod engine;
pub mod params;


pub use decision::{
    Decision, DecisionFields, DecisionKind, UndecidedBreakdown, UndecidedReason, VotingOutput,
};
pub use engine::VotingEngine;
pub use params::{ConfigWarning, VoterSet, VotingParams};
