//! The FRI verifier: commit phase, query sampling and decommitment.

use std::collections::{BTreeMap, BTreeSet};

use crate::channel::KeccakChannel;
use crate::circle::{CanonicCoset, CircleDomain, Coset, LineDomain, MAX_CIRCLE_DOMAIN_LOG_SIZE};
use crate::field::{M31, QM31, SECURE_EXTENSION_DEGREE};
use crate::merkle::MerkleVerifier;
use crate::poly::LinePoly;
use crate::queries::Queries;
use crate::utils::bit_reverse_index;

use super::folding::{
    compute_decommitment_positions_and_rebuild_evals, SparseEvaluation,
};
use super::proof::{FriLayerProof, FriProof};
use super::{
    CirclePolyDegreeBound, FriConfig, FriError, FriLayerKind, LinePolyDegreeBound,
    CIRCLE_TO_LINE_FOLD_STEP, FOLD_STEP,
};

/// Verifier state produced by the commit phase.
pub struct FriVerifier {
    config: FriConfig,
    first_layer: FriFirstLayerVerifier,
    inner_layers: Vec<FriInnerLayerVerifier>,
    last_layer_domain: LineDomain,
    last_layer_poly: LinePoly,
    queries: Option<Queries>,
}

struct FriFirstLayerVerifier {
    column_bounds: Vec<CirclePolyDegreeBound>,
    column_commitment_domains: Vec<CircleDomain>,
    folding_alpha: QM31,
    proof: FriLayerProof,
}

struct FriInnerLayerVerifier {
    degree_bound: LinePolyDegreeBound,
    domain: LineDomain,
    folding_alpha: QM31,
    layer_index: usize,
    proof: FriLayerProof,
}

impl FriVerifier {
    /// Runs the commit phase.
    ///
    /// Mixes the first-layer root and draws the circle-to-line folding
    /// alpha, then walks the inner layers (mix root, draw alpha, halve the
    /// degree bound) and validates that the walk ends exactly at the
    /// configured last-layer bound before mixing the last-layer
    /// coefficients. `column_bounds` must be sorted descending without
    /// duplicates.
    pub fn commit(
        channel: &mut KeccakChannel,
        config: FriConfig,
        proof: FriProof,
        column_bounds: Vec<CirclePolyDegreeBound>,
    ) -> Result<Self, FriError> {
        if column_bounds.is_empty() {
            return Err(FriError::InvalidProofShape("no column bounds"));
        }
        if !column_bounds
            .windows(2)
            .all(|pair| pair[0].log_degree_bound > pair[1].log_degree_bound)
        {
            return Err(FriError::InvalidProofShape(
                "column bounds not sorted descending",
            ));
        }
        if column_bounds[column_bounds.len() - 1].log_degree_bound == 0 {
            return Err(FriError::InvalidProofShape("zero column bound"));
        }
        let max_column_bound = column_bounds[0];
        if max_column_bound.log_degree_bound + config.log_blowup_factor
            > MAX_CIRCLE_DOMAIN_LOG_SIZE
        {
            return Err(FriError::InvalidProofShape("first layer domain too large"));
        }
        if max_column_bound.log_degree_bound <= config.log_last_layer_degree_bound {
            return Err(FriError::InvalidProofShape(
                "last layer bound above column bounds",
            ));
        }

        let column_commitment_domains: Vec<CircleDomain> = column_bounds
            .iter()
            .map(|bound| {
                CanonicCoset::new(bound.log_degree_bound + config.log_blowup_factor)
                    .circle_domain()
            })
            .collect();

        channel.mix_root(&proof.first_layer.commitment);
        let first_layer_folding_alpha = channel.draw_secure_felt()?;
        let first_layer = FriFirstLayerVerifier {
            column_bounds,
            column_commitment_domains,
            folding_alpha: first_layer_folding_alpha,
            proof: proof.first_layer,
        };

        let mut layer_bound = max_column_bound.fold_to_line();
        let mut layer_domain = LineDomain::new(Coset::half_odds(
            layer_bound.log_degree_bound + config.log_blowup_factor,
        ));
        let mut inner_layers = Vec::with_capacity(proof.inner_layers.len());
        for (layer_index, layer_proof) in proof.inner_layers.into_iter().enumerate() {
            channel.mix_root(&layer_proof.commitment);
            let folding_alpha = channel.draw_secure_felt()?;
            inner_layers.push(FriInnerLayerVerifier {
                degree_bound: layer_bound,
                domain: layer_domain,
                folding_alpha,
                layer_index,
                proof: layer_proof,
            });
            layer_bound = layer_bound
                .fold(FOLD_STEP)
                .ok_or(FriError::InvalidProofShape("too many fri layers"))?;
            layer_domain = layer_domain.double();
        }

        if layer_bound.log_degree_bound != config.log_last_layer_degree_bound {
            return Err(FriError::InvalidProofShape(
                "inner layer count does not reach the last layer bound",
            ));
        }
        let last_layer_domain = layer_domain;

        if proof.last_layer_poly.len() != 1 << config.log_last_layer_degree_bound {
            return Err(FriError::InsufficientDegree {
                log_degree_bound: config.log_last_layer_degree_bound,
                coefficients: proof.last_layer_poly.len(),
            });
        }
        channel.mix_felts(proof.last_layer_poly.coeffs());

        Ok(Self {
            config,
            first_layer,
            inner_layers,
            last_layer_domain,
            last_layer_poly: proof.last_layer_poly,
            queries: None,
        })
    }

    /// Draws query positions at the largest column domain and folds them
    /// down to every unique column log size.
    pub fn sample_query_positions(
        &mut self,
        channel: &mut KeccakChannel,
    ) -> BTreeMap<u32, Vec<usize>> {
        let column_log_sizes: BTreeSet<u32> = self
            .first_layer
            .column_commitment_domains
            .iter()
            .map(CircleDomain::log_size)
            .collect();
        // The set is nonempty: commit rejects empty column bounds.
        let max_column_log_size = column_log_sizes.iter().next_back().copied().unwrap_or(0);
        let queries = Queries::generate(channel, max_column_log_size, self.config.n_queries);
        let positions = column_log_sizes
            .into_iter()
            .map(|log_size| {
                (
                    log_size,
                    queries.fold(max_column_log_size - log_size).positions,
                )
            })
            .collect();
        self.queries = Some(queries);
        positions
    }

    /// Verifies the layer decommitments against the DEEP quotient answers of
    /// the first-layer columns, ordered by descending column bound.
    pub fn decommit(mut self, first_layer_query_evals: Vec<Vec<QM31>>) -> Result<(), FriError> {
        let queries = self
            .queries
            .take()
            .ok_or(FriError::InvalidProofShape("query positions not sampled"))?;
        let (last_layer_queries, last_layer_query_evals) =
            self.decommit_inner_layers(&queries, first_layer_query_evals)?;
        self.decommit_last_layer(last_layer_queries, last_layer_query_evals)
    }

    fn decommit_inner_layers(
        &self,
        queries: &Queries,
        first_layer_query_evals: Vec<Vec<QM31>>,
    ) -> Result<(Queries, Vec<QM31>), FriError> {
        let first_layer_sparse_evals = self
            .first_layer
            .verify_and_rebuild(queries, first_layer_query_evals)?;
        let first_layer_alpha = self.first_layer.folding_alpha;
        let first_layer_alpha_squared = first_layer_alpha.square();

        let mut layer_queries = queries.fold(CIRCLE_TO_LINE_FOLD_STEP);
        let mut layer_query_evals = vec![QM31::ZERO; layer_queries.len()];

        let mut sparse_evals = first_layer_sparse_evals.into_iter();
        let mut column_bounds = self.first_layer.column_bounds.iter().peekable();
        let mut column_domains = self.first_layer.column_commitment_domains.iter();

        for layer in &self.inner_layers {
            // Fold in every first-layer column whose line bound matches this
            // layer before folding the layer itself.
            while column_bounds
                .next_if(|bound| bound.fold_to_line() == layer.degree_bound)
                .is_some()
            {
                let column_domain = column_domains
                    .next()
                    .ok_or(FriError::InvalidProofShape("missing column domain"))?;
                let sparse = sparse_evals
                    .next()
                    .ok_or(FriError::InvalidProofShape("missing first layer evals"))?;
                let folded_column_evals = sparse.fold_circle(first_layer_alpha, *column_domain)?;
                if folded_column_evals.len() != layer_query_evals.len() {
                    return Err(FriError::InvalidProofShape(
                        "folded column eval count mismatch",
                    ));
                }
                for (layer_eval, folded_eval) in
                    layer_query_evals.iter_mut().zip(folded_column_evals)
                {
                    *layer_eval = *layer_eval * first_layer_alpha_squared + folded_eval;
                }
            }

            let (folded_queries, folded_evals) =
                layer.verify_and_fold(layer_queries, layer_query_evals)?;
            layer_queries = folded_queries;
            layer_query_evals = folded_evals;
        }

        if column_bounds.next().is_some() {
            return Err(FriError::InvalidProofShape(
                "first layer columns left unfolded",
            ));
        }
        Ok((layer_queries, layer_query_evals))
    }

    fn decommit_last_layer(
        self,
        queries: Queries,
        query_evals: Vec<QM31>,
    ) -> Result<(), FriError> {
        if queries.len() != query_evals.len() {
            return Err(FriError::InvalidProofShape("last layer eval count mismatch"));
        }
        let domain = self.last_layer_domain;
        for (&query, query_eval) in queries.positions.iter().zip(query_evals) {
            let x = domain.at(bit_reverse_index(query, domain.log_size()));
            if query_eval != self.last_layer_poly.eval_at_point(x.into()) {
                return Err(FriError::LastLayerMismatch);
            }
        }
        Ok(())
    }
}

impl FriFirstLayerVerifier {
    /// Verifies the first-layer Merkle commitment over all columns and
    /// returns the rebuilt coset evaluations per column.
    fn verify_and_rebuild(
        &self,
        queries: &Queries,
        query_evals_by_column: Vec<Vec<QM31>>,
    ) -> Result<Vec<SparseEvaluation>, FriError> {
        if query_evals_by_column.len() != self.column_commitment_domains.len() {
            return Err(FriError::InvalidProofShape("first layer column count"));
        }
        // Columns are sorted by descending bound, so the first domain is the
        // largest and must match the sampled query domain.
        let max_column_log_size = self.column_commitment_domains[0].log_size();
        if queries.log_domain_size != max_column_log_size {
            return Err(FriError::InvalidProofShape("query domain size mismatch"));
        }

        let mut fri_witness = self.proof.fri_witness.iter().copied();
        let mut decommitment_positions_by_log_size = BTreeMap::new();
        let mut decommitted_values: Vec<M31> = Vec::new();
        let mut sparse_evals_by_column = Vec::with_capacity(query_evals_by_column.len());

        for (column_domain, column_query_evals) in self
            .column_commitment_domains
            .iter()
            .zip(&query_evals_by_column)
        {
            let column_queries = queries.fold(queries.log_domain_size - column_domain.log_size());
            let (column_decommitment_positions, sparse_evaluation) =
                compute_decommitment_positions_and_rebuild_evals(
                    &column_queries,
                    column_query_evals,
                    &mut fri_witness,
                    CIRCLE_TO_LINE_FOLD_STEP,
                )
                .map_err(|_| FriError::InvalidProofShape("first layer witness too short"))?;

            decommitment_positions_by_log_size
                .insert(column_domain.log_size(), column_decommitment_positions);
            for pair in &sparse_evaluation.subset_evals {
                for eval in pair {
                    decommitted_values.extend(eval.to_m31_coords());
                }
            }
            sparse_evals_by_column.push(sparse_evaluation);
        }

        if fri_witness.next().is_some() {
            return Err(FriError::InvalidProofShape("first layer witness too long"));
        }

        let column_log_sizes: Vec<u32> = self
            .column_commitment_domains
            .iter()
            .flat_map(|domain| [domain.log_size(); SECURE_EXTENSION_DEGREE])
            .collect();
        let merkle_verifier = MerkleVerifier::new(self.proof.commitment, column_log_sizes);
        merkle_verifier
            .verify(
                &decommitment_positions_by_log_size,
                &decommitted_values,
                &self.proof.decommitment,
            )
            .map_err(|source| FriError::CommitmentMismatch {
                layer: FriLayerKind::First,
                source,
            })?;

        Ok(sparse_evals_by_column)
    }
}

impl FriInnerLayerVerifier {
    /// Verifies the layer's Merkle commitment at the queried cosets and
    /// folds the rebuilt evaluations to the next layer.
    fn verify_and_fold(
        &self,
        queries: Queries,
        evals_at_queries: Vec<QM31>,
    ) -> Result<(Queries, Vec<QM31>), FriError> {
        if queries.log_domain_size != self.domain.log_size() {
            return Err(FriError::InvalidProofShape("inner layer domain mismatch"));
        }

        let mut fri_witness = self.proof.fri_witness.iter().copied();
        let (decommitment_positions, sparse_evaluation) =
            compute_decommitment_positions_and_rebuild_evals(
                &queries,
                &evals_at_queries,
                &mut fri_witness,
                FOLD_STEP,
            )
            .map_err(|_| FriError::InvalidProofShape("inner layer witness too short"))?;
        if fri_witness.next().is_some() {
            return Err(FriError::InvalidProofShape("inner layer witness too long"));
        }

        let mut decommitted_values: Vec<M31> = Vec::new();
        for pair in &sparse_evaluation.subset_evals {
            for eval in pair {
                decommitted_values.extend(eval.to_m31_coords());
            }
        }

        let merkle_verifier = MerkleVerifier::new(
            self.proof.commitment,
            vec![self.domain.log_size(); SECURE_EXTENSION_DEGREE],
        );
        merkle_verifier
            .verify(
                &BTreeMap::from([(self.domain.log_size(), decommitment_positions)]),
                &decommitted_values,
                &self.proof.decommitment,
            )
            .map_err(|source| FriError::CommitmentMismatch {
                layer: FriLayerKind::Inner(self.layer_index),
                source,
            })?;

        let folded_queries = queries.fold(FOLD_STEP);
        let folded_evals = sparse_evaluation.fold_line(self.folding_alpha, self.domain)?;
        debug_assert_eq!(folded_queries.len(), folded_evals.len());
        Ok((folded_queries, folded_evals))
    }
}
