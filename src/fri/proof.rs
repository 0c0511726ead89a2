use serde::{Deserialize, Serialize};

use crate::field::QM31;
use crate::hash::DIGEST_BYTES;
use crate::merkle::MerkleDecommitment;
use crate::poly::LinePoly;

/// Commitment, witness values and Merkle decommitment of one FRI layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriLayerProof {
    /// Evaluations at decommitment positions the verifier cannot derive from
    /// folded query answers.
    pub fri_witness: Vec<QM31>,
    /// Merkle witness for the layer tree.
    pub decommitment: MerkleDecommitment,
    /// The layer's committed root.
    pub commitment: [u8; DIGEST_BYTES],
}

/// The FRI proof payload: first layer, inner layers and the explicit last
/// layer polynomial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriProof {
    /// Commitment to the circle columns before the first fold.
    pub first_layer: FriLayerProof,
    /// Commitments to the folded line layers.
    pub inner_layers: Vec<FriLayerProof>,
    /// The final low-degree polynomial in coefficient form.
    pub last_layer_poly: LinePoly,
}
