//! Keccak-based Fiat–Shamir channel.
//!
//! The channel is a strictly sequential state machine over
//! `(digest, n_draws)`: every mix folds prover data into the digest and
//! resets the draw counter, every draw derives deterministically from the
//! pair. Byte-exact transcript equivalence is required, so the exact byte
//! layouts below are load-bearing.

use core::fmt;

use crate::field::{M31, P, QM31};
use crate::hash::{Keccak256, DIGEST_BYTES};

/// Number of base felts produced by a single draw.
const FELTS_PER_DRAW: usize = 8;

/// Retry budget for rejection sampling of base felts.
///
/// Exceeding it has vanishing probability and is treated as a protocol bug
/// rather than silently looping.
const MAX_DRAW_RETRIES: usize = 100;

/// Fixed prefix word of the proof-of-work pre-image.
const POW_PREFIX: u32 = 0x12345678;

/// Errors emitted by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Rejection sampling exceeded its retry budget.
    ChannelExhausted,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::ChannelExhausted => {
                write!(f, "rejection sampling exhausted after {MAX_DRAW_RETRIES} retries")
            }
        }
    }
}

impl std::error::Error for ChannelError {}

/// The Fiat–Shamir transcript state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeccakChannel {
    digest: [u8; DIGEST_BYTES],
    n_draws: u32,
}

impl Default for KeccakChannel {
    fn default() -> Self {
        Self::new([0u8; DIGEST_BYTES], 0)
    }
}

impl KeccakChannel {
    /// Restores a channel from a previously captured state.
    pub fn new(digest: [u8; DIGEST_BYTES], n_draws: u32) -> Self {
        Self { digest, n_draws }
    }

    /// Current digest.
    pub fn digest(&self) -> [u8; DIGEST_BYTES] {
        self.digest
    }

    /// Number of draws since the last mix.
    pub fn n_draws(&self) -> u32 {
        self.n_draws
    }

    fn update_digest(&mut self, digest: [u8; DIGEST_BYTES]) {
        self.digest = digest;
        self.n_draws = 0;
    }

    /// Mixes little-endian words into the digest.
    pub fn mix_u32s(&mut self, data: &[u32]) {
        let mut hasher = Keccak256::new();
        hasher.update(&self.digest);
        for word in data {
            hasher.update(&word.to_le_bytes());
        }
        self.update_digest(hasher.finalize());
    }

    /// Mixes a `u64` as its two little-endian words.
    pub fn mix_u64(&mut self, value: u64) {
        self.mix_u32s(&[value as u32, (value >> 32) as u32]);
    }

    /// Mixes secure-field elements as 16 little-endian bytes each.
    pub fn mix_felts(&mut self, felts: &[QM31]) {
        let mut hasher = Keccak256::new();
        hasher.update(&self.digest);
        for felt in felts {
            for coordinate in felt.to_m31_coords() {
                hasher.update(&coordinate.value().to_le_bytes());
            }
        }
        self.update_digest(hasher.finalize());
    }

    /// Mixes a commitment root: `digest <- Keccak(digest || root)`.
    pub fn mix_root(&mut self, root: &[u8; DIGEST_BYTES]) {
        let mut hasher = Keccak256::new();
        hasher.update(&self.digest);
        hasher.update(root);
        self.update_digest(hasher.finalize());
    }

    /// Draws eight uniform words from `Keccak(digest || LE(n_draws) || 0x00)`.
    pub fn draw_u32s(&mut self) -> [u32; FELTS_PER_DRAW] {
        let mut hasher = Keccak256::new();
        hasher.update(&self.digest);
        hasher.update(&self.n_draws.to_le_bytes());
        hasher.update(&[0u8]);
        let hash = hasher.finalize();
        self.n_draws += 1;

        let mut words = [0u32; FELTS_PER_DRAW];
        for (word, chunk) in words.iter_mut().zip(hash.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        words
    }

    /// Draws eight base felts by rejection sampling: a draw is accepted only
    /// if all eight words are below `2P`, then each is partially reduced.
    pub fn draw_base_felts(&mut self) -> Result<[M31; FELTS_PER_DRAW], ChannelError> {
        for _ in 0..MAX_DRAW_RETRIES {
            let words = self.draw_u32s();
            if words.iter().all(|&word| word < 2 * P) {
                let mut felts = [M31::ZERO; FELTS_PER_DRAW];
                for (felt, word) in felts.iter_mut().zip(words) {
                    *felt = M31::partial_reduce(word);
                }
                return Ok(felts);
            }
        }
        Err(ChannelError::ChannelExhausted)
    }

    /// Draws one secure felt from the first four base felts of a batch.
    pub fn draw_secure_felt(&mut self) -> Result<QM31, ChannelError> {
        let felts = self.draw_base_felts()?;
        Ok(QM31::from_m31_coords([felts[0], felts[1], felts[2], felts[3]]))
    }

    /// Draws `n` secure felts, packing base-felt batches four coordinates at
    /// a time and starting a new batch once fewer than four remain.
    pub fn draw_secure_felts(&mut self, n: usize) -> Result<Vec<QM31>, ChannelError> {
        let mut out = Vec::with_capacity(n);
        let mut buffered: Vec<M31> = Vec::new();
        while out.len() < n {
            if buffered.len() < 4 {
                buffered = self.draw_base_felts()?.to_vec();
            }
            out.push(QM31::from_m31_coords([
                buffered[0],
                buffered[1],
                buffered[2],
                buffered[3],
            ]));
            buffered.drain(..4);
        }
        Ok(out)
    }

    /// Checks a proof-of-work nonce against the current digest.
    ///
    /// The pre-image prefix is `LE(0x12345678) || 0^24 || digest || LE(n_bits)`;
    /// the nonce digest must end in at least `n_bits` zero bits when read as a
    /// little-endian 256-bit integer.
    pub fn verify_pow(&self, n_bits: u32, nonce: u64) -> bool {
        let mut hasher = Keccak256::new();
        hasher.update(&POW_PREFIX.to_le_bytes());
        hasher.update(&[0u8; 24]);
        hasher.update(&self.digest);
        hasher.update(&n_bits.to_le_bytes());
        let prefix_digest = hasher.finalize();

        let mut hasher = Keccak256::new();
        hasher.update(&prefix_digest);
        hasher.update(&nonce.to_le_bytes());
        let nonce_digest = hasher.finalize();

        trailing_zero_bits(&nonce_digest) >= n_bits
    }
}

/// Trailing zero bits of a digest interpreted as a little-endian integer.
fn trailing_zero_bits(digest: &[u8; DIGEST_BYTES]) -> u32 {
    let mut count = 0;
    for &byte in digest {
        if byte == 0 {
            count += 8;
        } else {
            return count + byte.trailing_zeros();
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_are_counted_and_mixes_reset() {
        let mut channel = KeccakChannel::default();
        let _ = channel.draw_u32s();
        let _ = channel.draw_u32s();
        assert_eq!(channel.n_draws(), 2);
        channel.mix_u64(7);
        assert_eq!(channel.n_draws(), 0);
    }

    #[test]
    fn consecutive_draws_differ() {
        let mut channel = KeccakChannel::default();
        assert_ne!(channel.draw_u32s(), channel.draw_u32s());
    }

    #[test]
    fn base_felts_are_reduced() {
        let mut channel = KeccakChannel::default();
        for felt in channel.draw_base_felts().unwrap() {
            assert!(felt.value() < P);
        }
    }

    #[test]
    fn secure_felt_packs_first_four_coordinates() {
        let mut reference = KeccakChannel::default();
        let expected = reference.draw_base_felts().unwrap();

        let mut channel = KeccakChannel::default();
        let felt = channel.draw_secure_felt().unwrap();
        assert_eq!(
            felt.to_m31_coords(),
            [expected[0], expected[1], expected[2], expected[3]]
        );
    }

    #[test]
    fn secure_felt_batches_pack_two_per_draw() {
        let mut reference = KeccakChannel::default();
        let batch = reference.draw_base_felts().unwrap();

        let mut channel = KeccakChannel::default();
        let felts = channel.draw_secure_felts(2).unwrap();
        assert_eq!(channel.n_draws(), 1, "two secure felts fit in one draw");
        assert_eq!(
            felts[1].to_m31_coords(),
            [batch[4], batch[5], batch[6], batch[7]]
        );
    }

    #[test]
    fn trailing_zero_bit_count() {
        let mut digest = [0u8; DIGEST_BYTES];
        assert_eq!(trailing_zero_bits(&digest), 256);
        digest[0] = 0b1000_0000;
        assert_eq!(trailing_zero_bits(&digest), 7);
        digest[0] = 0;
        digest[2] = 1;
        assert_eq!(trailing_zero_bits(&digest), 16);
    }

    #[test]
    fn pow_difficulty_zero_always_accepts() {
        let channel = KeccakChannel::default();
        assert!(channel.verify_pow(0, 0));
    }
}
