//! FRI low-degree verification: commit phase, query sampling, folding and
//! decommitment.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelError;
use crate::field::FieldError;
use crate::merkle::MerkleError;

pub mod folding;
pub mod proof;
mod verifier;

pub use proof::{FriLayerProof, FriProof};
pub use verifier::FriVerifier;

/// Log fold factor of the circle-to-line first fold.
pub const CIRCLE_TO_LINE_FOLD_STEP: u32 = 1;

/// Log fold factor of each inner line layer.
pub const FOLD_STEP: u32 = 1;

/// FRI protocol parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriConfig {
    /// Log ratio between evaluation domain size and degree bound.
    pub log_blowup_factor: u32,
    /// Log degree bound of the last layer polynomial.
    pub log_last_layer_degree_bound: u32,
    /// Number of verifier queries.
    pub n_queries: usize,
}

/// Degree bound of a circle polynomial, in log form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CirclePolyDegreeBound {
    /// Log of the degree bound.
    pub log_degree_bound: u32,
}

impl CirclePolyDegreeBound {
    /// Wraps a log degree bound.
    pub fn new(log_degree_bound: u32) -> Self {
        Self { log_degree_bound }
    }

    /// The bound after the circle-to-line fold.
    pub fn fold_to_line(&self) -> LinePolyDegreeBound {
        LinePolyDegreeBound {
            log_degree_bound: self.log_degree_bound - CIRCLE_TO_LINE_FOLD_STEP,
        }
    }
}

/// Degree bound of a line polynomial, in log form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinePolyDegreeBound {
    /// Log of the degree bound.
    pub log_degree_bound: u32,
}

impl LinePolyDegreeBound {
    /// The bound after `n_folds` line folds; `None` once it cannot halve.
    pub fn fold(&self, n_folds: u32) -> Option<Self> {
        if self.log_degree_bound < n_folds {
            return None;
        }
        Some(Self {
            log_degree_bound: self.log_degree_bound - n_folds,
        })
    }
}

/// Identifies a FRI layer in error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriLayerKind {
    /// The circle-column first layer.
    First,
    /// An inner line layer, by index.
    Inner(usize),
}

impl fmt::Display for FriLayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriLayerKind::First => write!(f, "first layer"),
            FriLayerKind::Inner(index) => write!(f, "inner layer {index}"),
        }
    }
}

/// Errors emitted by FRI verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriError {
    /// Proof structure does not match the configuration.
    InvalidProofShape(&'static str),
    /// A layer's Merkle decommitment failed against its root.
    CommitmentMismatch {
        /// The failing layer.
        layer: FriLayerKind,
        /// Underlying Merkle failure.
        source: MerkleError,
    },
    /// Folded evaluations disagree with the last layer polynomial.
    LastLayerMismatch,
    /// The last layer polynomial exceeds the configured degree bound.
    InsufficientDegree {
        /// Configured log degree bound.
        log_degree_bound: u32,
        /// Number of coefficients carried by the proof.
        coefficients: usize,
    },
    /// Channel sampling failed while drawing folding randomness.
    Channel(ChannelError),
    /// Field inversion failed while folding.
    Field(FieldError),
}

impl fmt::Display for FriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriError::InvalidProofShape(reason) => {
                write!(f, "invalid fri proof shape: {reason}")
            }
            FriError::CommitmentMismatch { layer, source } => {
                write!(f, "fri {layer} decommitment failed: {source}")
            }
            FriError::LastLayerMismatch => {
                write!(f, "last layer evaluation mismatch")
            }
            FriError::InsufficientDegree {
                log_degree_bound,
                coefficients,
            } => write!(
                f,
                "last layer polynomial has {coefficients} coefficients, bound is 2^{log_degree_bound}"
            ),
            FriError::Channel(error) => write!(f, "channel failure: {error}"),
            FriError::Field(error) => write!(f, "field failure: {error}"),
        }
    }
}

impl std::error::Error for FriError {}

impl From<ChannelError> for FriError {
    fn from(error: ChannelError) -> Self {
        FriError::Channel(error)
    }
}

impl From<FieldError> for FriError {
    fn from(error: FieldError) -> Self {
        FriError::Field(error)
    }
}
