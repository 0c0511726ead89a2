//! Decommitment verification for trees committing to columns of multiple
//! log sizes.
//!
//! Columns are grouped by log size; the subtree layer at depth `L` packs the
//! values of every column of log size `L` into its nodes, on top of the two
//! child hashes when deeper layers exist. Verification walks from the
//! largest log size to the root, merging query-derived nodes with witness
//! hashes, and finally compares the surviving hash with the commitment.

use std::collections::BTreeMap;

use crate::field::M31;
use crate::hash::{Keccak256, DIGEST_BYTES};

use super::types::{MerkleDecommitment, MerkleError};

type Hash = [u8; DIGEST_BYTES];

/// Verifier state for one committed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleVerifier {
    /// The committed root.
    pub root: Hash,
    /// Log sizes of the committed columns, in commitment order.
    pub column_log_sizes: Vec<u32>,
    n_columns_per_log_size: BTreeMap<u32, usize>,
}

impl MerkleVerifier {
    /// Builds a verifier for a committed root and its column layout.
    pub fn new(root: Hash, column_log_sizes: Vec<u32>) -> Self {
        let mut n_columns_per_log_size = BTreeMap::new();
        for &log_size in &column_log_sizes {
            *n_columns_per_log_size.entry(log_size).or_insert(0) += 1;
        }
        Self {
            root,
            column_log_sizes,
            n_columns_per_log_size,
        }
    }

    /// Number of columns committed at each log size.
    pub fn n_columns_per_log_size(&self) -> &BTreeMap<u32, usize> {
        &self.n_columns_per_log_size
    }

    /// Verifies the decommitment against the root.
    ///
    /// * `queries_per_log_size` - sorted unique query indices per column log
    ///   size; entries for log sizes above this tree's largest are ignored.
    /// * `queried_values` - column values at the queried positions, ordered
    ///   layer-major (descending log size), then position, then column.
    /// * `decommitment` - sibling hashes and unqueried column values.
    pub fn verify(
        &self,
        queries_per_log_size: &BTreeMap<u32, Vec<usize>>,
        queried_values: &[M31],
        decommitment: &MerkleDecommitment,
    ) -> Result<(), MerkleError> {
        let Some(&max_log_size) = self.column_log_sizes.iter().max() else {
            return Ok(());
        };

        let mut queried_values = queried_values.iter().copied();
        let mut hash_witness = decommitment.hash_witness.iter();
        let mut column_witness = decommitment.column_witness.iter().copied();

        let mut last_layer: Option<Vec<(usize, Hash)>> = None;
        for layer_log_size in (0..=max_log_size).rev() {
            let n_columns_in_layer = self
                .n_columns_per_log_size
                .get(&layer_log_size)
                .copied()
                .unwrap_or(0);
            let column_queries = queries_per_log_size
                .get(&layer_log_size)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for &query in column_queries {
                if query >= 1 << layer_log_size {
                    return Err(MerkleError::IndexOutOfRange {
                        index: query,
                        log_size: layer_log_size,
                    });
                }
            }

            let prev_layer = last_layer.take();
            let mut prev_cursor = 0usize;
            let mut column_cursor = 0usize;
            let mut layer_nodes: Vec<(usize, Hash)> = Vec::new();

            loop {
                // The next node comes from whichever source queries first.
                let from_children = prev_layer
                    .as_ref()
                    .and_then(|nodes| nodes.get(prev_cursor))
                    .map(|(index, _)| index >> 1);
                let from_columns = column_queries.get(column_cursor).copied();
                let node_index = match (from_children, from_columns) {
                    (None, None) => break,
                    (Some(child), None) => child,
                    (None, Some(column)) => column,
                    (Some(child), Some(column)) => child.min(column),
                };

                let node_hashes = match prev_layer.as_ref() {
                    None => None,
                    Some(nodes) => {
                        let mut child_hash = |child_index: usize| match nodes.get(prev_cursor) {
                            Some(&(index, hash)) if index == child_index => {
                                prev_cursor += 1;
                                Ok(hash)
                            }
                            _ => hash_witness
                                .next()
                                .copied()
                                .ok_or(MerkleError::WitnessTooShort),
                        };
                        let left = child_hash(2 * node_index)?;
                        let right = child_hash(2 * node_index + 1)?;
                        Some((left, right))
                    }
                };

                let mut node_values = Vec::with_capacity(n_columns_in_layer);
                if column_queries.get(column_cursor) == Some(&node_index) {
                    column_cursor += 1;
                    for _ in 0..n_columns_in_layer {
                        node_values.push(
                            queried_values
                                .next()
                                .ok_or(MerkleError::ColumnValuesTooShort)?,
                        );
                    }
                } else {
                    for _ in 0..n_columns_in_layer {
                        node_values.push(
                            column_witness
                                .next()
                                .ok_or(MerkleError::WitnessTooShort)?,
                        );
                    }
                }

                layer_nodes.push((node_index, hash_node(node_hashes, &node_values)));
            }

            last_layer = Some(layer_nodes);
        }

        if hash_witness.next().is_some() || column_witness.next().is_some() {
            return Err(MerkleError::WitnessTooLong);
        }
        if queried_values.next().is_some() {
            return Err(MerkleError::ColumnValuesTooLong);
        }

        match last_layer.as_deref() {
            Some(&[(_, computed_root)]) if computed_root == self.root => Ok(()),
            _ => Err(MerkleError::RootMismatch),
        }
    }
}

/// Hashes one node: the child hashes (when present) followed by the
/// little-endian column values at the node.
pub(crate) fn hash_node(children: Option<(Hash, Hash)>, values: &[M31]) -> Hash {
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
