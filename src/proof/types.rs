//! The parsed proof container.

use serde::{Deserialize, Serialize};

use crate::field::{M31, QM31};
use crate::fri::FriProof;
use crate::hash::DIGEST_BYTES;
use crate::merkle::MerkleDecommitment;
use crate::pcs::PcsConfig;
use crate::poly::SecureCirclePoly;

/// A parsed STARK proof.
///
/// Trees are ordered preprocessed, original, interaction (when present) and
/// composition last; `sampled_values` and `queried_values` follow the same
/// tree order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarkProof {
    /// Scheme parameters the proof was produced under.
    pub config: PcsConfig,
    /// Tree roots in commitment order.
    pub commitments: Vec<[u8; DIGEST_BYTES]>,
    /// Out-of-domain sampled values, `[tree][column][sample]`.
    pub sampled_values: Vec<Vec<Vec<QM31>>>,
    /// Merkle witnesses, one per tree.
    pub decommitments: Vec<MerkleDecommitment>,
    /// Queried column values, flat per tree.
    pub queried_values: Vec<Vec<M31>>,
    /// Proof-of-work nonce.
    pub proof_of_work: u64,
    /// FRI proof payload.
    pub fri_proof: FriProof,
    /// Composition polynomial coefficients, one vector per QM31 coordinate.
    pub composition_poly: SecureCirclePoly,
}
