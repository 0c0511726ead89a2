//! The registry of committed trees.

use crate::channel::KeccakChannel;
use crate::fri::CirclePolyDegreeBound;
use crate::hash::DIGEST_BYTES;
use crate::merkle::MerkleVerifier;

use super::PcsConfig;

/// Holds the roots and column layouts of every committed tree, in
/// commitment order.
pub struct CommitmentSchemeVerifier {
    /// One Merkle verifier per committed tree.
    pub trees: Vec<MerkleVerifier>,
    /// Scheme parameters.
    pub config: PcsConfig,
}

impl CommitmentSchemeVerifier {
    /// Creates an empty registry.
    pub fn new(config: PcsConfig) -> Self {
        Self {
            trees: Vec::new(),
            config,
        }
    }

    /// Registers a committed tree: mixes the root into the channel and
    /// records the blown-up column log sizes.
    pub fn commit(
        &mut self,
        root: [u8; DIGEST_BYTES],
        column_log_sizes: &[u32],
        channel: &mut KeccakChannel,
    ) {
        channel.mix_root(&root);
        let extended_log_sizes = column_log_sizes
            .iter()
            .map(|log_size| log_size + self.config.fri_config.log_blowup_factor)
            .collect();
        self.trees.push(MerkleVerifier::new(root, extended_log_sizes));
    }

    /// The committed (blown-up) column log sizes, per tree.
    pub fn column_log_sizes(&self) -> Vec<Vec<u32>> {
        self.trees
            .iter()
            .map(|tree| tree.column_log_sizes.clone())
            .collect()
    }

    /// Degree bounds of all committed columns: flattened, sorted descending,
    /// deduplicated and stripped of the blowup.
    pub fn calculate_bounds(&self) -> Vec<CirclePolyDegreeBound> {
        let mut log_sizes: Vec<u32> = self
            .trees
            .iter()
            .flat_map(|tree| tree.column_log_sizes.iter().copied())
            .collect();
        log_sizes.sort_unstable_by(|a, b| b.cmp(a));
        log_sizes.dedup();
        log_sizes
            .into_iter()
            .map(|log_size| {
                CirclePolyDegreeBound::new(log_size - self.config.fri_config.log_blowup_factor)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fri::FriConfig;

    fn scheme() -> CommitmentSchemeVerifier {
        CommitmentSchemeVerifier::new(PcsConfig {
            pow_bits: 5,
            fri_config: FriConfig {
                log_blowup_factor: 2,
                log_last_layer_degree_bound: 0,
                n_queries: 4,
            },
        })
    }

    #[test]
    fn commit_extends_column_log_sizes_and_mixes_the_root() {
        let mut scheme = scheme();
        let mut channel = KeccakChannel::default();
        let before = channel.digest();
        scheme.commit([1u8; 32], &[3, 4], &mut channel);
        assert_ne!(channel.digest(), before);
        assert_eq!(scheme.trees[0].column_log_sizes, vec![5, 6]);
    }

    #[test]
    fn bounds_are_descending_unique_and_unblown() {
        let mut scheme = scheme();
        let mut channel = KeccakChannel::default();
        scheme.commit([1u8; 32], &[3, 4], &mut channel);
        scheme.commit([2u8; 32], &[4, 6], &mut channel);
        let bounds = scheme.calculate_bounds();
        let log_bounds: Vec<u32> = bounds.iter().map(|b| b.log_degree_bound).collect();
        assert_eq!(log_bounds, vec![6, 4, 3]);
    }
}
