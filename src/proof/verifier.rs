//! The verification pipeline.
//!
//! Replays the prover's transcript over the Keccak channel: tree
//! registration, the OODS consistency check of the composition polynomial,
//! FRI commitment, proof of work, query sampling, Merkle decommitments,
//! DEEP quotient answers and the FRI decommitment. Every stage must succeed;
//! the first failure is returned and all state is discarded.

use crate::channel::KeccakChannel;
use crate::circle::{CanonicCoset, CirclePoint, MAX_CIRCLE_DOMAIN_LOG_SIZE};
use crate::field::{QM31, SECURE_EXTENSION_DEGREE};
use crate::fri::FriVerifier;
use crate::hash::DIGEST_BYTES;
use crate::pcs::{fri_answers, CommitmentSchemeVerifier, PointSample};

use super::errors::{map_merkle_error, VerifyError};
use super::params::VerificationParams;
use super::types::StarkProof;

/// Index of the preprocessed-columns tree.
pub const PREPROCESSED_TREE_IDX: usize = 0;

/// Verifies a proof against the statement parameters and the pre-registered
/// tree layout.
///
/// `tree_roots` and `tree_column_log_sizes` describe the statement trees
/// (preprocessed, original and, when present, interaction) in commitment
/// order, with unextended column log sizes; the composition tree root is the
/// last entry of `proof.commitments`. `initial_digest` and `initial_n_draws`
/// restore the channel to the state agreed with the proof producer before
/// any tree is registered.
pub fn verify(
    proof: &StarkProof,
    params: &VerificationParams,
    tree_roots: &[[u8; DIGEST_BYTES]],
    tree_column_log_sizes: &[Vec<u32>],
    initial_digest: [u8; DIGEST_BYTES],
    initial_n_draws: u32,
) -> Result<(), VerifyError> {
    validate_shape(proof, params, tree_roots, tree_column_log_sizes)?;

    let mut channel = KeccakChannel::new(initial_digest, initial_n_draws);
    let mut commitment_scheme = CommitmentSchemeVerifier::new(proof.config);

    // Statement trees, mixed in commitment order.
    for (root, column_log_sizes) in tree_roots.iter().zip(tree_column_log_sizes) {
        commitment_scheme.commit(*root, column_log_sizes, &mut channel);
    }

    // Transcript-only draw separating the statement commitments from the
    // composition commitment.
    let _constraint_coeff = channel.draw_secure_felt()?;

    let composition_root = proof.commitments[proof.commitments.len() - 1];
    let composition_log_sizes =
        vec![params.composition_log_degree_bound; SECURE_EXTENSION_DEGREE];
    commitment_scheme.commit(composition_root, &composition_log_sizes, &mut channel);

    let oods_point = draw_random_circle_point(&mut channel)?;

    let sample_points = compute_sample_points(params, oods_point, tree_roots.len());
    validate_samples_shape(&sample_points, &proof.sampled_values)?;

    let composition_oods_eval = extract_composition_oods_eval(&proof.sampled_values)?;
    if proof.composition_poly.eval_at_point(oods_point) != composition_oods_eval {
        return Err(VerifyError::OodsMismatch);
    }

    // Sampled values enter the transcript flattened tree-major.
    let flattened: Vec<QM31> = proof
        .sampled_values
        .iter()
        .flat_map(|tree| tree.iter().flat_map(|column| column.iter().copied()))
        .collect();
    channel.mix_felts(&flattened);

    let random_coeff = channel.draw_secure_felt()?;

    let bounds = commitment_scheme.calculate_bounds();
    let mut fri_verifier = FriVerifier::commit(
        &mut channel,
        proof.config.fri_config,
        proof.fri_proof.clone(),
        bounds,
    )?;

    if !channel.verify_pow(proof.config.pow_bits, proof.proof_of_work) {
        return Err(VerifyError::PowFailed);
    }
    channel.mix_u64(proof.proof_of_work);

    let query_positions_per_log_size = fri_verifier.sample_query_positions(&mut channel);

    for (tree_index, tree) in commitment_scheme.trees.iter().enumerate() {
        tree.verify(
            &query_positions_per_log_size,
            &proof.queried_values[tree_index],
            &proof.decommitments[tree_index],
        )
        .map_err(|error| map_merkle_error(error, tree_index))?;
    }

    let samples = pair_samples(&sample_points, &proof.sampled_values);
    let answers = fri_answers(
        &commitment_scheme.column_log_sizes(),
        &samples,
        random_coeff,
        &query_positions_per_log_size,
        &proof.queried_values,
    )?;

    fri_verifier.decommit(answers)?;
    Ok(())
}

/// Structural checks, all performed before any cryptographic work.
fn validate_shape(
    proof: &StarkProof,
    params: &VerificationParams,
    tree_roots: &[[u8; DIGEST_BYTES]],
    tree_column_log_sizes: &[Vec<u32>],
) -> Result<(), VerifyError> {
    if tree_roots.is_empty() {
        return Err(VerifyError::Shape("no statement trees"));
    }
    if tree_roots.len() != tree_column_log_sizes.len() {
        return Err(VerifyError::Shape("tree root and layout count mismatch"));
    }
    if proof.commitments.len() != tree_roots.len() + 1 {
        return Err(VerifyError::Shape("commitment count"));
    }
    for (commitment, root) in proof.commitments.iter().zip(tree_roots) {
        if commitment != root {
            return Err(VerifyError::Shape("statement tree root mismatch"));
        }
    }

    let n_trees = tree_roots.len() + 1;
    if proof.sampled_values.len() != n_trees {
        return Err(VerifyError::Shape("sampled values tree count"));
    }
    if proof.decommitments.len() != n_trees {
        return Err(VerifyError::Shape("decommitment tree count"));
    }
    if proof.queried_values.len() != n_trees {
        return Err(VerifyError::Shape("queried values tree count"));
    }

    let blowup = proof.config.fri_config.log_blowup_factor;
    if blowup == 0 || blowup > 16 {
        return Err(VerifyError::Shape("log blowup factor out of range"));
    }
    let n_queries = proof.config.fri_config.n_queries;
    if n_queries == 0 || n_queries > 1 << 12 {
        return Err(VerifyError::Shape("query count out of range"));
    }
    for column_log_sizes in tree_column_log_sizes {
        for &log_size in column_log_sizes {
            if log_size == 0 || log_size + blowup > MAX_CIRCLE_DOMAIN_LOG_SIZE {
                return Err(VerifyError::Shape("column log size out of range"));
            }
        }
    }
    let composition_bound = params.composition_log_degree_bound;
    if composition_bound == 0 || composition_bound + blowup > MAX_CIRCLE_DOMAIN_LOG_SIZE {
        return Err(VerifyError::Shape("composition log size out of range"));
    }
    for coeffs in &proof.composition_poly.0 {
        if coeffs.len() != 1 << composition_bound {
            return Err(VerifyError::Shape("composition coefficient count"));
        }
    }

    if params.n_preprocessed_columns != tree_column_log_sizes[PREPROCESSED_TREE_IDX].len() {
        return Err(VerifyError::Shape("preprocessed column count"));
    }

    // The trace location allocation restarts per component, so column
    // layouts of multiple components would alias the same tree positions.
    if params.components.len() != 1 {
        return Err(VerifyError::Shape("exactly one component is supported"));
    }
    let component = &params.components[0];
    if component.log_size == 0 || component.info.mask_offsets.len() > tree_roots.len() {
        return Err(VerifyError::Shape("component mask tree count"));
    }

    Ok(())
}

/// Draws a uniform circle point over the secure field: two secure felts are
/// drawn and projected onto the circle through the chord-slope map
/// `t = y / (1 + x)` composed with `t -> ((1 - t^2)/(1 + t^2), 2t/(1 + t^2))`.
///
/// Exposed so proof producers can replay the transcript.
pub fn draw_random_circle_point(
    channel: &mut KeccakChannel,
) -> Result<CirclePoint<QM31>, VerifyError> {
    let felts = channel.draw_secure_felts(2)?;
    let (x, y) = (felts[0], felts[1]);
    let t = y * (x + QM31::ONE).inverse()?;
    let t_squared = t.square();
    let denominator_inverse = (t_squared + QM31::ONE).inverse()?;
    Ok(CirclePoint {
        x: (QM31::ONE - t_squared) * denominator_inverse,
        y: t.double() * denominator_inverse,
    })
}

/// Materializes every mask sample point into a `[tree][column][sample]`
/// ragged array: mask offsets walk the component trace step from the OODS
/// point, preprocessed columns and the composition tree sample the OODS
/// point itself.
fn compute_sample_points(
    params: &VerificationParams,
    oods_point: CirclePoint<QM31>,
    n_statement_trees: usize,
) -> Vec<Vec<Vec<CirclePoint<QM31>>>> {
    let component = &params.components[0];
    let trace_step = CanonicCoset::new(component.log_size).step().into_ef();

    let mut sample_points: Vec<Vec<Vec<CirclePoint<QM31>>>> = component
        .info
        .mask_offsets
        .iter()
        .map(|tree_offsets| {
            tree_offsets
                .iter()
                .map(|column_offsets| {
                    column_offsets
                        .iter()
                        .map(|&offset| oods_point + trace_step.mul_signed(i64::from(offset)))
                        .collect()
                })
                .collect()
        })
        .collect();

    // The mask may omit trailing trees; the composition entries always sit
    // right after the registered statement trees.
    sample_points.resize(n_statement_trees, Vec::new());
    sample_points[PREPROCESSED_TREE_IDX] =
        vec![vec![oods_point]; params.n_preprocessed_columns];
    sample_points.push(vec![vec![oods_point]; SECURE_EXTENSION_DEGREE]);
    sample_points
}

/// The sampled values of every tree must mirror the sample point shape.
fn validate_samples_shape(
    sample_points: &[Vec<Vec<CirclePoint<QM31>>>],
    sampled_values: &[Vec<Vec<QM31>>],
) -> Result<(), VerifyError> {
    if sample_points.len() != sampled_values.len() {
        return Err(VerifyError::Shape("sampled values tree count"));
    }
    for (tree_points, tree_values) in sample_points.iter().zip(sampled_values) {
        if tree_points.len() != tree_values.len() {
            return Err(VerifyError::Shape("sampled values column count"));
        }
        for (column_points, column_values) in tree_points.iter().zip(tree_values) {
            if column_points.len() != column_values.len() {
                return Err(VerifyError::Shape("sampled values sample count"));
            }
        }
    }
    Ok(())
}

/// Reads the composition polynomial's OODS evaluation out of the sampled
/// values: the four columns of the composition tree, one sample each.
fn extract_composition_oods_eval(
    sampled_values: &[Vec<Vec<QM31>>],
) -> Result<QM31, VerifyError> {
    let composition_columns = match sampled_values.last() {
        Some(columns) => columns,
        None => return Err(VerifyError::Shape("missing composition samples")),
    };
    if composition_columns.len() != SECURE_EXTENSION_DEGREE {
        return Err(VerifyError::Shape("composition column count"));
    }
    let mut partial_evals = [QM31::ZERO; SECURE_EXTENSION_DEGREE];
    for (partial_eval, column) in partial_evals.iter_mut().zip(composition_columns) {
        match column.as_slice() {
            [eval] => *partial_eval = *eval,
            _ => return Err(VerifyError::Shape("composition sample count")),
        }
    }
    Ok(QM31::from_partial_evals(partial_evals))
}

/// Pairs every sample point with its sampled value.
fn pair_samples(
    sample_points: &[Vec<Vec<CirclePoint<QM31>>>],
    sampled_values: &[Vec<Vec<QM31>>],
) -> Vec<Vec<Vec<PointSample>>> {
    sample_points
        .iter()
        .zip(sampled_values)
        .map(|(tree_points, tree_values)| {
            tree_points
                .iter()
                .zip(tree_values)
                .map(|(column_points, column_values)| {
                    column_points
                        .iter()
                        .zip(column_values)
                        .map(|(point, value)| PointSample {
                            point: *point,
                            value: *value,
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}
