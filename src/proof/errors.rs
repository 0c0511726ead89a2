//! The single error taxonomy surfaced by the verifier.

use core::fmt;

use crate::channel::ChannelError;
use crate::field::FieldError;
use crate::fri::{FriError, FriLayerKind};
use crate::merkle::MerkleError;
use crate::pcs::PcsError;

/// Terminal verification failure; the first failing stage wins and no
/// partial result is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Structural mismatch (tree counts, column counts, log sizes out of
    /// range), detected before cryptographic work.
    Shape(&'static str),
    /// A zero field element was inverted.
    Field(FieldError),
    /// Channel rejection sampling exceeded its retry budget.
    Channel(ChannelError),
    /// Composition polynomial evaluation disagrees with the sampled OODS
    /// value.
    OodsMismatch,
    /// The proof-of-work nonce fails the configured difficulty.
    PowFailed,
    /// Merkle witness shape mismatch for a commitment tree.
    MerkleShape {
        /// Index of the failing tree.
        tree: usize,
    },
    /// Recomputed root of a commitment tree disagrees with its commitment.
    MerkleMismatch {
        /// Index of the failing tree.
        tree: usize,
    },
    /// A query index exceeded a layer of a commitment tree.
    MerkleOob {
        /// Index of the failing tree.
        tree: usize,
    },
    /// A FRI layer's Merkle decommitment failed.
    FriCommitmentMismatch {
        /// The failing FRI layer.
        layer: FriLayerKind,
    },
    /// Folded FRI evaluations disagree with the last layer polynomial.
    FriLastLayerMismatch,
    /// The FRI proof structure does not match the configuration.
    FriInvalidProofShape(&'static str),
    /// The last layer polynomial exceeds its degree bound.
    FriInsufficientDegree {
        /// Configured log degree bound.
        log_degree_bound: u32,
        /// Number of coefficients carried by the proof.
        coefficients: usize,
    },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Shape(reason) => write!(f, "proof shape mismatch: {reason}"),
            VerifyError::Field(error) => write!(f, "field failure: {error}"),
            VerifyError::Channel(error) => write!(f, "channel failure: {error}"),
            VerifyError::OodsMismatch => {
                write!(f, "composition polynomial OODS evaluation mismatch")
            }
            VerifyError::PowFailed => write!(f, "proof of work nonce rejected"),
            VerifyError::MerkleShape { tree } => {
                write!(f, "merkle witness shape mismatch in tree {tree}")
            }
            VerifyError::MerkleMismatch { tree } => {
                write!(f, "merkle root mismatch in tree {tree}")
            }
            VerifyError::MerkleOob { tree } => {
                write!(f, "merkle query out of range in tree {tree}")
            }
            VerifyError::FriCommitmentMismatch { layer } => {
                write!(f, "fri {layer} commitment mismatch")
            }
            VerifyError::FriLastLayerMismatch => write!(f, "fri last layer mismatch"),
            VerifyError::FriInvalidProofShape(reason) => {
                write!(f, "invalid fri proof shape: {reason}")
            }
            VerifyError::FriInsufficientDegree {
                log_degree_bound,
                coefficients,
            } => write!(
                f,
                "fri last layer carries {coefficients} coefficients, bound is 2^{log_degree_bound}"
            ),
        }
    }
}

impl std::error::Error for VerifyError {}

impl From<FieldError> for VerifyError {
    fn from(error: FieldError) -> Self {
        VerifyError::Field(error)
    }
}

impl From<ChannelError> for VerifyError {
    fn from(error: ChannelError) -> Self {
        VerifyError::Channel(error)
    }
}

impl From<FriError> for VerifyError {
    fn from(error: FriError) -> Self {
        match error {
            FriError::InvalidProofShape(reason) => VerifyError::FriInvalidProofShape(reason),
            FriError::CommitmentMismatch { layer, .. } => {
                VerifyError::FriCommitmentMismatch { layer }
            }
            FriError::LastLayerMismatch => VerifyError::FriLastLayerMismatch,
            FriError::InsufficientDegree {
                log_degree_bound,
                coefficients,
            } => VerifyError::FriInsufficientDegree {
                log_degree_bound,
                coefficients,
            },
            FriError::Channel(error) => VerifyError::Channel(error),
            FriError::Field(error) => VerifyError::Field(error),
        }
    }
}

impl From<PcsError> for VerifyError {
    fn from(error: PcsError) -> Self {
        match error {
            PcsError::Shape(reason) => VerifyError::Shape(reason),
            PcsError::Field(error) => VerifyError::Field(error),
        }
    }
}

/// Maps a Merkle failure of a commitment tree to the verifier taxonomy.
pub(crate) fn map_merkle_error(error: MerkleError, tree: usize) -> VerifyError {
    match error {
        MerkleError::RootMismatch => VerifyError::MerkleMismatch { tree },
        MerkleError::IndexOutOfRange { .. } => VerifyError::MerkleOob { tree },
        MerkleError::WitnessTooShort
        | MerkleError::WitnessTooLong
        | MerkleError::ColumnValuesTooShort
        | MerkleError::ColumnValuesTooLong => VerifyError::MerkleShape { tree },
    }
}
