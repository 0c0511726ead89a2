//! Polynomial commitment scheme state: registered commitment trees and the
//! DEEP quotient answers fed into FRI.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldError;
use crate::fri::FriConfig;

pub mod quotients;
mod verifier;

pub use quotients::{fri_answers, ColumnSampleBatch, PointSample};
pub use verifier::CommitmentSchemeVerifier;

/// Commitment scheme parameters: FRI configuration plus proof-of-work
/// difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcsConfig {
    /// Required trailing-zero bits of the proof-of-work digest.
    pub pow_bits: u32,
    /// FRI protocol parameters.
    pub fri_config: FriConfig,
}

/// Errors emitted while computing quotient answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcsError {
    /// Structural mismatch between proof containers and registered trees.
    Shape(&'static str),
    /// Field inversion failed while batching quotient denominators.
    Field(FieldError),
}

impl fmt::Display for PcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcsError::Shape(reason) => write!(f, "quotient shape mismatch: {reason}"),
            PcsError::Field(error) => write!(f, "field failure: {error}"),
        }
    }
}

impl std::error::Error for PcsError {}

impl From<FieldError> for PcsError {
    fn from(error: FieldError) -> Self {
        PcsError::Field(error)
    }
}
