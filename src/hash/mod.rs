//! Keccak-256 hashing shared by the channel, the Merkle verifier and the
//! proof-of-work check.

mod keccak;

pub use keccak::{keccak256, Keccak256, DIGEST_BYTES};
