//! Query position sampling and folding.

use std::collections::BTreeSet;

use crate::channel::KeccakChannel;

/// Sorted unique query positions over a domain of size `2^log_domain_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Queries {
    /// Positions in ascending order.
    pub positions: Vec<usize>,
    /// Log size of the addressed domain.
    pub log_domain_size: u32,
}

impl Queries {
    /// Draws `n_queries` uniform positions from the channel.
    ///
    /// Power-of-two domain sizes let each channel word be masked directly;
    /// positions are deduplicated and sorted ascending.
    pub fn generate(channel: &mut KeccakChannel, log_domain_size: u32, n_queries: usize) -> Self {
        let mut positions = BTreeSet::new();
        let max_query = (1usize << log_domain_size) - 1;
        'drawing: while positions.len() < n_queries {
            for word in channel.draw_u32s() {
                positions.insert(word as usize & max_query);
                if positions.len() == n_queries {
                    break 'drawing;
                }
            }
        }
        Self {
            positions: positions.into_iter().collect(),
            log_domain_size,
        }
    }

    /// Number of query positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no positions are held.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Maps the positions to the `n_folds`-times-halved domain.
    pub fn fold(&self, n_folds: u32) -> Self {
        debug_assert!(n_folds <= self.log_domain_size);
        let mut positions: Vec<usize> =
            self.positions.iter().map(|q| q >> n_folds).collect();
        positions.dedup();
        Self {
            positions,
            log_domain_size: self.log_domain_size - n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_positions_are_sorted_unique_and_in_range() {
        let mut channel = KeccakChannel::default();
        let queries = Queries::generate(&mut channel, 10, 20);
        assert_eq!(queries.len(), 20);
        for window in queries.positions.windows(2) {
            assert!(window[0] < window[1]);
        }
        assert!(queries.positions.iter().all(|&q| q < 1 << 10));
    }

    #[test]
    fn folding_halves_and_dedups() {
        let queries = Queries {
            positions: vec![2, 3, 9, 14],
            log_domain_size: 4,
        };
        let folded = queries.fold(1);
        assert_eq!(folded.positions, vec![1, 4, 7]);
        assert_eq!(folded.log_domain_size, 3);
    }

    #[test]
    fn generation_is_deterministic() {
        let mut a = KeccakChannel::default();
        let mut b = KeccakChannel::default();
        assert_eq!(
            Queries::generate(&mut a, 16, 8),
            Queries::generate(&mut b, 16, 8)
        );
    }
}
