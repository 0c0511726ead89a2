//! Thin wrapper around the Keccak-256 permutation.
//!
//! All protocol hashing is funneled through this module so the hash function
//! is instantiated in exactly one place.

use tiny_keccak::{Hasher, Keccak};

/// Size of a Keccak-256 digest in bytes.
pub const DIGEST_BYTES: usize = 32;

/// Incremental Keccak-256 hasher.
#[derive(Clone)]
pub struct Keccak256 {
    inner: Keccak,
}

impl Keccak256 {
    /// Creates a fresh hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak::v256(),
        }
    }

    /// Absorbs bytes into the state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalizes the hash and returns the digest.
    pub fn finalize(self) -> [u8; DIGEST_BYTES] {
        let mut out = [0u8; DIGEST_BYTES];
        self.inner.finalize(&mut out);
        out
    }
}

impl Default for Keccak256 {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes a byte slice in one call.
pub fn keccak256(data: &[u8]) -> [u8; DIGEST_BYTES] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize()
}
