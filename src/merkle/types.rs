use core::fmt;

use serde::{Deserialize, Serialize};

use crate::field::M31;
use crate::hash::DIGEST_BYTES;

/// Witness accompanying queried column values.
///
/// `hash_witness` carries sibling subtree hashes the verifier cannot
/// recompute from the queries; `column_witness` carries column values at
/// decommitment positions that were not themselves queried.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleDecommitment {
    /// Sibling hashes, ordered by the verifier's traversal.
    pub hash_witness: Vec<[u8; DIGEST_BYTES]>,
    /// Column values at unqueried decommitment positions.
    pub column_witness: Vec<M31>,
}

/// Errors emitted by Merkle verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerkleError {
    /// The witness ran out of hashes or column values.
    WitnessTooShort,
    /// Witness entries remained after the root was computed.
    WitnessTooLong,
    /// The queried values ran out while hashing a node.
    ColumnValuesTooShort,
    /// Queried values remained after the root was computed.
    ColumnValuesTooLong,
    /// A query index does not fit the layer it addresses.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Log size of the addressed layer.
        log_size: u32,
    },
    /// The recomputed root disagrees with the commitment.
    RootMismatch,
}

impl fmt::Display for MerkleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerkleError::WitnessTooShort => write!(f, "decommitment witness too short"),
            MerkleError::WitnessTooLong => write!(f, "decommitment witness too long"),
            MerkleError::ColumnValuesTooShort => write!(f, "queried column values too short"),
            MerkleError::ColumnValuesTooLong => write!(f, "queried column values too long"),
            MerkleError::IndexOutOfRange { index, log_size } => {
                write!(f, "query index {index} out of range for log size {log_size}")
            }
            MerkleError::RootMismatch => write!(f, "root mismatch"),
        }
    }
}

impl std::error::Error for MerkleError {}
