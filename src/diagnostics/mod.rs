//! Serializable reports produced by the fusion pipeline and the tools.
//!
//! [`FusionReport`] is the main entry point: it carries the final label
//! volume together with a [`FusionTrace`] describing each stage that ran.

pub mod report;
pub mod stages;
pub mod timing;

pub use report::{FusionReport, FusionTrace, InputDescriptor};
pub use stages::{DecisionMean, ResolveStage, VotingStage};
pub use timing::{StageTiming, TimingBreakdown};
