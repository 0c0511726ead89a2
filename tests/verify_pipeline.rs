//! End-to-end pipeline verification against an honestly constructed proof,
//! plus the stage-by-stage mutation matrix.

use std::collections::BTreeMap;

use stwo_verifier_core::channel::KeccakChannel;
use stwo_verifier_core::circle::{CanonicCoset, Coset, LineDomain};
use stwo_verifier_core::field::{M31, QM31};
use stwo_verifier_core::fri::{FriConfig, FriLayerProof, FriProof};
use stwo_verifier_core::merkle::MerkleDecommitment;
use stwo_verifier_core::pcs::{fri_answers, PcsConfig, PointSample};
use stwo_verifier_core::poly::{LinePoly, SecureCirclePoly};
use stwo_verifier_core::proof::draw_random_circle_point;
use stwo_verifier_core::utils::bit_reverse_index;
use stwo_verifier_core::{
    verify, ComponentInfo, ComponentParams, StarkProof, VerificationParams, VerifyError,
};

#[path = "_fixtures.rs"]
mod fixtures;
use fixtures::{commit_secure_column, full_coverage_sparse, CommittedTree};

const TRACE_LOG_SIZE: u32 = 3;
const LOG_BLOWUP: u32 = 1;
const BLOWN_LOG_SIZE: u32 = TRACE_LOG_SIZE + LOG_BLOWUP;
const COMPOSITION_LOG_BOUND: u32 = 3;
const N_QUERIES: usize = 1 << BLOWN_LOG_SIZE;

/// A base-field circle polynomial wrapped for secure-field evaluation.
fn base_poly(coeffs: Vec<M31>) -> SecureCirclePoly {
    let len = coeffs.len();
    SecureCirclePoly([
        coeffs,
        vec![M31::ZERO; len],
        vec![M31::ZERO; len],
        vec![M31::ZERO; len],
    ])
}

/// Evaluations on the blown-up domain in bit-reversed storage order,
/// projected to the base field.
fn base_storage(poly: &SecureCirclePoly) -> Vec<M31> {
    let domain = CanonicCoset::new(BLOWN_LOG_SIZE).circle_domain();
    (0..domain.size())
        .map(|i| {
            let point = domain.at(bit_reverse_index(i, domain.log_size())).into_ef();
            poly.eval_at_point(point).to_m31_coords()[0]
        })
        .collect()
}

struct HonestArtifacts {
    proof: StarkProof,
    params: VerificationParams,
    tree_roots: Vec<[u8; 32]>,
    tree_column_log_sizes: Vec<Vec<u32>>,
}

/// Builds a complete honest proof for one trace column and a random
/// composition polynomial, replaying the verifier's transcript.
fn honest_artifacts() -> HonestArtifacts {
    let config = PcsConfig {
        pow_bits: 0,
        fri_config: FriConfig {
            log_blowup_factor: LOG_BLOWUP,
            log_last_layer_degree_bound: 0,
            n_queries: N_QUERIES,
        },
    };

    let trace_poly = base_poly((0..8u32).map(|i| M31::from(100 + 3 * i * i)).collect());
    let composition_coeffs: [Vec<M31>; 4] = std::array::from_fn(|coordinate| {
        (0..1u32 << COMPOSITION_LOG_BOUND)
            .map(|i| M31::from(1 + i * 17 + 31 * coordinate as u32))
            .collect()
    });
    let composition_poly = SecureCirclePoly(composition_coeffs.clone());

    let trace_storage = base_storage(&trace_poly);
    let composition_storage: Vec<Vec<M31>> = composition_coeffs
        .iter()
        .map(|coeffs| base_storage(&base_poly(coeffs.clone())))
        .collect();

    let preprocessed_root = [0xAAu8; 32];
    let trace_tree = CommittedTree::commit(BTreeMap::from([(
        BLOWN_LOG_SIZE,
        vec![trace_storage.clone()],
    )]));
    let composition_tree = CommittedTree::commit(BTreeMap::from([(
        BLOWN_LOG_SIZE,
        composition_storage.clone(),
    )]));

    // Replay the pipeline transcript.
    let mut channel = KeccakChannel::default();
    channel.mix_root(&preprocessed_root);
    channel.mix_root(&trace_tree.root);
    let _constraint_coeff = channel.draw_secure_felt().unwrap();
    channel.mix_root(&composition_tree.root);
    let oods_point = draw_random_circle_point(&mut channel).unwrap();

    let trace_step = CanonicCoset::new(TRACE_LOG_SIZE).step().into_ef();
    let mask_points = [oods_point, oods_point + trace_step];
    let sampled_values: Vec<Vec<Vec<QM31>>> = vec![
        vec![],
        vec![mask_points
            .iter()
            .map(|point| trace_poly.eval_at_point(*point))
            .collect()],
        composition_coeffs
            .iter()
            .map(|coeffs| vec![base_poly(coeffs.clone()).eval_at_point(oods_point)])
            .collect(),
    ];

    let flattened: Vec<QM31> = sampled_values
        .iter()
        .flat_map(|tree| tree.iter().flat_map(|column| column.iter().copied()))
        .collect();
    channel.mix_felts(&flattened);
    let random_coeff = channel.draw_secure_felt().unwrap();

    // DEEP quotients at every domain position make up the FRI first layer.
    let all_positions: BTreeMap<u32, Vec<usize>> =
        BTreeMap::from([(BLOWN_LOG_SIZE, (0..N_QUERIES).collect())]);
    let column_log_sizes = vec![
        vec![],
        vec![BLOWN_LOG_SIZE],
        vec![BLOWN_LOG_SIZE; 4],
    ];
    let samples: Vec<Vec<Vec<PointSample>>> = vec![
        vec![],
        vec![mask_points
            .iter()
            .zip(&sampled_values[1][0])
            .map(|(point, value)| PointSample {
                point: *point,
                value: *value,
            })
            .collect()],
        sampled_values[2]
            .iter()
            .map(|column| {
                vec![PointSample {
                    point: oods_point,
                    value: column[0],
                }]
            })
            .collect(),
    ];
    let queried_values = vec![
        vec![],
        trace_storage.clone(),
        (0..1usize << BLOWN_LOG_SIZE)
            .flat_map(|row| composition_storage.iter().map(move |column| column[row]))
            .collect(),
    ];
    let answers = fri_answers(
        &column_log_sizes,
        &samples,
        random_coeff,
        &all_positions,
        &queried_values,
    )
    .unwrap();
    let first_layer_storage = answers[0].clone();

    // Honest FRI layers over the quotient column.
    let first_tree = commit_secure_column(&first_layer_storage, BLOWN_LOG_SIZE);
    channel.mix_root(&first_tree.root);
    let first_alpha = channel.draw_secure_felt().unwrap();
    let commitment_domain = CanonicCoset::new(BLOWN_LOG_SIZE).circle_domain();
    let folded_once = full_coverage_sparse(&first_layer_storage, BLOWN_LOG_SIZE)
        .fold_circle(first_alpha, commitment_domain)
        .unwrap();

    let line_domain = LineDomain::new(Coset::half_odds(BLOWN_LOG_SIZE - 1));
    let inner_tree_a = commit_secure_column(&folded_once, BLOWN_LOG_SIZE - 1);
    channel.mix_root(&inner_tree_a.root);
    let alpha_a = channel.draw_secure_felt().unwrap();
    let folded_twice = full_coverage_sparse(&folded_once, BLOWN_LOG_SIZE - 1)
        .fold_line(alpha_a, line_domain)
        .unwrap();

    let inner_tree_b = commit_secure_column(&folded_twice, BLOWN_LOG_SIZE - 2);
    channel.mix_root(&inner_tree_b.root);
    let alpha_b = channel.draw_secure_felt().unwrap();
    let folded_last = full_coverage_sparse(&folded_twice, BLOWN_LOG_SIZE - 2)
        .fold_line(alpha_b, line_domain.double())
        .unwrap();
    assert!(
        folded_last.iter().all(|value| *value == folded_last[0]),
        "honest quotients fold to a constant"
    );

    let full_decommitment = |tree: &CommittedTree, log_size: u32| {
        let all: Vec<usize> = (0..1usize << log_size).collect();
        tree.decommit(&BTreeMap::from([(log_size, all)])).1
    };

    let fri_proof = FriProof {
        first_layer: FriLayerProof {
            fri_witness: vec![],
            decommitment: full_decommitment(&first_tree, BLOWN_LOG_SIZE),
            commitment: first_tree.root,
        },
        inner_layers: vec![
            FriLayerProof {
                fri_witness: vec![],
                decommitment: full_decommitment(&inner_tree_a, BLOWN_LOG_SIZE - 1),
                commitment: inner_tree_a.root,
            },
            FriLayerProof {
                fri_witness: vec![],
                decommitment: full_decommitment(&inner_tree_b, BLOWN_LOG_SIZE - 2),
                commitment: inner_tree_b.root,
            },
        ],
        last_layer_poly: LinePoly::new(vec![folded_last[0]]),
    };

    let proof = StarkProof {
        config,
        commitments: vec![preprocessed_root, trace_tree.root, composition_tree.root],
        sampled_values,
        decommitments: vec![
            MerkleDecommitment::default(),
            full_decommitment(&trace_tree, BLOWN_LOG_SIZE),
            full_decommitment(&composition_tree, BLOWN_LOG_SIZE),
        ],
        queried_values,
        proof_of_work: 0,
        fri_proof,
        composition_poly,
    };

    let params = VerificationParams {
        components: vec![ComponentParams {
            log_size: TRACE_LOG_SIZE,
            claimed_sum: QM31::ZERO,
            info: ComponentInfo {
                max_constraint_log_degree_bound: BLOWN_LOG_SIZE,
                log_size: TRACE_LOG_SIZE,
                mask_offsets: vec![vec![], vec![vec![0, 1]]],
                preprocessed_columns: vec![],
            },
        }],
        n_preprocessed_columns: 0,
        composition_log_degree_bound: COMPOSITION_LOG_BOUND,
    };

    HonestArtifacts {
        proof,
        params,
        tree_roots: vec![preprocessed_root, trace_tree.root],
        tree_column_log_sizes: vec![vec![], vec![TRACE_LOG_SIZE]],
    }
}

fn run(artifacts: &HonestArtifacts) -> Result<(), VerifyError> {
    verify(
        &artifacts.proof,
        &artifacts.params,
        &artifacts.tree_roots,
        &artifacts.tree_column_log_sizes,
        [0u8; 32],
        0,
    )
}

#[test]
fn honest_proof_verifies() {
    let artifacts = honest_artifacts();
    assert_eq!(run(&artifacts), Ok(()));
}

#[test]
fn tampered_queried_value_is_a_merkle_mismatch() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.queried_values[1][0] = artifacts.proof.queried_values[1][0] + M31::ONE;
    assert_eq!(run(&artifacts), Err(VerifyError::MerkleMismatch { tree: 1 }));
}

#[test]
fn tampered_sampled_composition_value_is_an_oods_mismatch() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.sampled_values[2][0][0] += QM31::ONE;
    assert_eq!(run(&artifacts), Err(VerifyError::OodsMismatch));
}

#[test]
fn tampered_composition_coefficient_is_an_oods_mismatch() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.composition_poly.0[0][0] = artifacts.proof.composition_poly.0[0][0] + M31::ONE;
    assert_eq!(run(&artifacts), Err(VerifyError::OodsMismatch));
}

#[test]
fn unreachable_pow_difficulty_fails() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.config.pow_bits = 64;
    assert_eq!(run(&artifacts), Err(VerifyError::PowFailed));
}

#[test]
fn tampered_fri_commitment_fails_the_first_layer() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.fri_proof.first_layer.commitment[0] ^= 0x01;
    assert!(matches!(
        run(&artifacts),
        Err(VerifyError::FriCommitmentMismatch { .. })
    ));
}

#[test]
fn inconsistent_statement_roots_are_a_shape_error() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.commitments[1][0] ^= 0x01;
    assert_eq!(
        run(&artifacts),
        Err(VerifyError::Shape("statement tree root mismatch"))
    );
}

#[test]
fn missing_commitment_is_a_shape_error() {
    let mut artifacts = honest_artifacts();
    artifacts.proof.commitments.pop();
    assert_eq!(run(&artifacts), Err(VerifyError::Shape("commitment count")));
}

#[test]
fn multiple_components_are_rejected() {
    let mut artifacts = honest_artifacts();
    let duplicate = artifacts.params.components[0].clone();
    artifacts.params.components.push(duplicate);
    assert_eq!(
        run(&artifacts),
        Err(VerifyError::Shape("exactly one component is supported"))
    );
}

#[test]
fn wire_round_trip_preserves_the_verdict() {
    let artifacts = honest_artifacts();
    let bytes = artifacts.proof.to_bytes();
    let decoded = StarkProof::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, artifacts.proof);
    let roundtripped = HonestArtifacts {
        proof: decoded,
        params: artifacts.params.clone(),
        tree_roots: artifacts.tree_roots.clone(),
        tree_column_log_sizes: artifacts.tree_column_log_sizes.clone(),
    };
    assert_eq!(run(&roundtripped), Ok(()));
}
