#![allow(dead_code)]

//! Shared test fixtures: an honest Merkle committer/decommitter matching the
//! verifier's tree layout, used by the Merkle fail matrix and the FRI
//! pipeline tests.

use std::collections::BTreeMap;

use stwo_verifier_core::field::{M31, QM31};
use stwo_verifier_core::fri::folding::SparseEvaluation;
use stwo_verifier_core::hash::Keccak256;
use stwo_verifier_core::merkle::MerkleDecommitment;
use stwo_verifier_core::utils::bit_reverse_index;

pub type Hash = [u8; 32];

/// Commits a secure column as its four base coordinate columns at the given
/// log size, the layout used by every FRI layer tree.
pub fn commit_secure_column(storage: &[QM31], log_size: u32) -> CommittedTree {
    let columns: Vec<Vec<M31>> = (0..4)
        .map(|coordinate| {
            storage
                .iter()
                .map(|value| value.to_m31_coords()[coordinate])
                .collect()
        })
        .collect();
    CommittedTree::commit(BTreeMap::from([(log_size, columns)]))
}

/// Full-coverage sparse evaluation over a layer in storage order.
pub fn full_coverage_sparse(storage: &[QM31], log_size: u32) -> SparseEvaluation {
    SparseEvaluation {
        subset_evals: (0..storage.len() / 2)
            .map(|i| [storage[2 * i], storage[2 * i + 1]])
            .collect(),
        subset_domain_initial_indexes: (0..storage.len() / 2)
            .map(|i| bit_reverse_index(2 * i, log_size))
            .collect(),
    }
}

/// Hashes one node the way the verifier does: child hashes first, then the
/// little-endian column values.
pub fn hash_node(children: Option<(Hash, Hash)>, values: &[M31]) -> Hash {
    let mut hasher = Keccak256::new();
    if let Some((left, right)) = children {
        hasher.update(&left);
        hasher.update(&right);
    }
    for value in values {
        hasher.update(&value.value().to_le_bytes());
    }
    hasher.finalize()
}

/// An honestly committed tree over columns of heterogeneous log sizes.
pub struct CommittedTree {
    /// Columns grouped by log size; each column at log size `L` holds `2^L`
    /// values.
    pub columns_by_log_size: BTreeMap<u32, Vec<Vec<M31>>>,
    /// Node hashes per layer log size, `levels[log_size][node_index]`.
    pub levels: BTreeMap<u32, Vec<Hash>>,
    /// The committed root.
    pub root: Hash,
    /// Column log sizes in commitment order (descending by log size).
    pub column_log_sizes: Vec<u32>,
}

impl CommittedTree {
    /// Commits to the given columns.
    pub fn commit(columns_by_log_size: BTreeMap<u32, Vec<Vec<M31>>>) -> Self {
        let max_log_size = *columns_by_log_size
            .keys()
            .next_back()
            .expect("at least one column");
        for (log_size, columns) in &columns_by_log_size {
            for column in columns {
                assert_eq!(column.len(), 1 << log_size);
            }
        }

        let mut levels: BTreeMap<u32, Vec<Hash>> = BTreeMap::new();
        for layer_log_size in (0..=max_log_size).rev() {
            let empty = Vec::new();
            let layer_columns = columns_by_log_size.get(&layer_log_size).unwrap_or(&empty);
            let mut layer = Vec::with_capacity(1 << layer_log_size);
            for node_index in 0..1usize << layer_log_size {
                let children = levels
                    .get(&(layer_log_size + 1))
                    .map(|child_layer| {
                        (child_layer[2 * node_index], child_layer[2 * node_index + 1])
                    });
                let values: Vec<M31> = layer_columns
                    .iter()
                    .map(|column| column[node_index])
                    .collect();
                layer.push(hash_node(children, &values));
            }
            levels.insert(layer_log_size, layer);
        }

        let root = levels[&0][0];
        let column_log_sizes = columns_by_log_size
            .iter()
            .rev()
            .flat_map(|(log_size, columns)| std::iter::repeat(*log_size).take(columns.len()))
            .collect();
        Self {
            columns_by_log_size,
            levels,
            root,
            column_log_sizes,
        }
    }

    /// Produces the queried values and the decommitment witness for the
    /// given query positions, mirroring the verifier's traversal order.
    pub fn decommit(
        &self,
        queries_per_log_size: &BTreeMap<u32, Vec<usize>>,
    ) -> (Vec<M31>, MerkleDecommitment) {
        let max_log_size = *self.levels.keys().next_back().expect("committed");
        let mut queried_values = Vec::new();
        let mut hash_witness = Vec::new();
        let mut column_witness = Vec::new();

        let empty_columns = Vec::new();
        let empty_queries = Vec::new();
        let mut last_layer_nodes: Option<Vec<usize>> = None;
        for layer_log_size in (0..=max_log_size).rev() {
            let layer_columns = self
                .columns_by_log_size
                .get(&layer_log_size)
                .unwrap_or(&empty_columns);
            let column_queries = queries_per_log_size
                .get(&layer_log_size)
                .unwrap_or(&empty_queries);

            let prev_nodes = last_layer_nodes.take().unwrap_or_default();
            let mut prev_cursor = 0usize;
            let mut column_cursor = 0usize;
            let mut layer_nodes = Vec::new();

            loop {
                let from_children = prev_nodes.get(prev_cursor).map(|index| index >> 1);
                let from_columns = column_queries.get(column_cursor).copied();
                let node_index = match (from_children, from_columns) {
                    (None, None) => break,
                    (Some(child), None) => child,
                    (None, Some(column)) => column,
                    (Some(child), Some(column)) => child.min(column),
                };

                if layer_log_size < max_log_size {
                    for child_index in [2 * node_index, 2 * node_index + 1] {
                        if prev_nodes.get(prev_cursor) == Some(&child_index) {
                            prev_cursor += 1;
                        } else {
                            hash_witness.push(self.levels[&(layer_log_size + 1)][child_index]);
                        }
                    }
                }

                if column_queries.get(column_cursor) == Some(&node_index) {
                    column_cursor += 1;
                    for column in layer_columns {
                        queried_values.push(column[node_index]);
                    }
                } else {
                    for column in layer_columns {
                        column_witness.push(column[node_index]);
                    }
                }

                layer_nodes.push(node_index);
            }

            last_layer_nodes = Some(layer_nodes);
        }

        (
            queried_values,
            MerkleDecommitment {
                hash_witness,
                column_witness,
            },
        )
    }
}
