//! Error type shared by every fusion stage.
//!
//! All variants are configuration errors: they are detected once, before any
//! voxel is processed, and no partial output is produced when one is raised.
//! Recoverable misconfiguration is reported through
//! [`ConfigWarning`](crate::voting::ConfigWarning) instead.
use crate::volume::Dims;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("no label volumes supplied")]
    EmptyInput,

    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: Dims,
        actual: Dims,
    },

    #[error("buffer of {actual} values does not fit a {dims} grid ({expected} voxels)")]
    BufferLength {
        dims: Dims,
        expected: usize,
        actual: usize,
    },

    #[error("probability stack {classifier} holds {actual} label fields, expected {expected}")]
    LabelCountMismatch {
        classifier: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{labels} label volumes but {probabilities} probability stacks")]
    ClassifierCountMismatch { labels: usize, probabilities: usize },

    #[error("undecided pixel resolution needs at least {minimum} classifiers, got {found}")]
    InsufficientClassifiers { found: usize, minimum: usize },

    #[error("{0} requires probability fields, but none were supplied")]
    MissingProbabilities(&'static str),

    #[error("{map} entry (label {label}, classifier {classifier}) is out of range ({labels} labels, {classifiers} classifiers)")]
    InvalidMapEntry {
        map: &'static str,
        label: u32,
        classifier: usize,
        labels: usize,
        classifiers: usize,
    },

    #[error("sweeping label voters requires per-label classifier scores")]
    MissingLabelScores,

    #[error("{0}")]
    Config(String),
}
