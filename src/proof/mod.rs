//! Proof containers, verification parameters, the wire codec and the
//! verification pipeline.

pub mod errors;
pub mod params;
pub mod ser;
pub mod types;
pub mod verifier;

pub use errors::VerifyError;
pub use params::{ComponentInfo, ComponentParams, VerificationParams};
pub use types::StarkProof;
pub use verifier::{draw_random_circle_point, verify, PREPROCESSED_TREE_IDX};
