//! Folding of sparse layer evaluations rebuilt from query answers and
//! witness values.

use crate::circle::{CircleDomain, LineDomain};
use crate::field::{FieldError, M31, QM31};
use crate::queries::Queries;
use crate::utils::bit_reverse_index;

/// The inverse FFT butterfly: maps evaluations at a point pair to the even
/// and odd half-polynomial evaluations (up to a factor of two).
pub fn ibutterfly(v0: &mut QM31, v1: &mut QM31, inverse_twiddle: M31) {
    let tmp = *v0;
    *v0 = tmp + *v1;
    *v1 = (tmp - *v1) * inverse_twiddle;
}

/// Marker for a witness stream that ran dry while rebuilding a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientWitness;

/// Evaluations over two-element cosets of a layer domain, in bit-reversed
/// storage order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseEvaluation {
    /// One pair of evaluations per queried coset.
    pub subset_evals: Vec<[QM31; 2]>,
    /// Natural domain index of each coset's first element.
    pub subset_domain_initial_indexes: Vec<usize>,
}

impl SparseEvaluation {
    /// Folds each coset along the line: evaluations at `±x` become one
    /// evaluation of the half-degree polynomial at `x^2`'s domain.
    pub fn fold_line(
        self,
        fold_alpha: QM31,
        source_domain: LineDomain,
    ) -> Result<Vec<QM31>, FieldError> {
        self.subset_evals
            .into_iter()
            .zip(self.subset_domain_initial_indexes)
            .map(|([eval_at_x, eval_at_neg_x], initial_index)| {
                let x = source_domain.at(initial_index);
                let mut f0 = eval_at_x;
                let mut f1 = eval_at_neg_x;
                ibutterfly(&mut f0, &mut f1, x.inverse()?);
                Ok(f0 + fold_alpha * f1)
            })
            .collect()
    }

    /// Folds each coset from the circle to the line: evaluations at a
    /// conjugate point pair become one line evaluation, twiddled by `1/y`.
    pub fn fold_circle(
        self,
        fold_alpha: QM31,
        source_domain: CircleDomain,
    ) -> Result<Vec<QM31>, FieldError> {
        self.subset_evals
            .into_iter()
            .zip(self.subset_domain_initial_indexes)
            .map(|([eval_at_p, eval_at_neg_p], initial_index)| {
                let point = source_domain.at(initial_index);
                let mut f0 = eval_at_p;
                let mut f1 = eval_at_neg_p;
                ibutterfly(&mut f0, &mut f1, point.y.inverse()?);
                Ok(f0 + fold_alpha * f1)
            })
            .collect()
    }
}

/// Groups queries into fold cosets and rebuilds the full coset evaluations,
/// reading unqueried positions from the witness stream.
///
/// Returns the decommitment positions (every position of every touched
/// coset, ascending) together with the rebuilt sparse evaluation.
pub fn compute_decommitment_positions_and_rebuild_evals(
    queries: &Queries,
    query_evals: &[QM31],
    witness_evals: &mut impl Iterator<Item = QM31>,
    fold_step: u32,
) -> Result<(Vec<usize>, SparseEvaluation), InsufficientWitness> {
    // Pair cosets only: both the circle-to-line and the line folds halve.
    debug_assert_eq!(1 << fold_step, 2);
    let mut query_evals = query_evals.iter().copied();
    let mut decommitment_positions = Vec::new();
    let mut subset_evals = Vec::new();
    let mut subset_domain_initial_indexes = Vec::new();

    let positions = &queries.positions;
    let mut i = 0;
    while i < positions.len() {
        let subset_start = (positions[i] >> fold_step) << fold_step;
        let subset_end = subset_start + (1 << fold_step);

        let mut pair = [QM31::ZERO; 2];
        for (slot, position) in (subset_start..subset_end).enumerate() {
            decommitment_positions.push(position);
            if positions.get(i) == Some(&position) {
                i += 1;
                pair[slot] = query_evals.next().ok_or(InsufficientWitness)?;
            } else {
                pair[slot] = witness_evals.next().ok_or(InsufficientWitness)?;
            }
        }
        subset_evals.push(pair);
        subset_domain_initial_indexes
            .push(bit_reverse_index(subset_start, queries.log_domain_size));
    }

    Ok((
        decommitment_positions,
        SparseEvaluation {
            subset_evals,
            subset_domain_initial_indexes,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::Coset;
    use crate::field::M31;
    use crate::fri::FOLD_STEP;

    fn q(value: u32) -> QM31 {
        QM31::from(M31::from(value))
    }

    #[test]
    fn rebuild_pairs_queries_with_witness_values() {
        let queries = Queries {
            positions: vec![0, 3, 6, 7],
            log_domain_size: 3,
        };
        let query_evals = [q(10), q(13), q(16), q(17)];
        let mut witness = [q(101), q(102)].into_iter();
        let (positions, sparse) = compute_decommitment_positions_and_rebuild_evals(
            &queries,
            &query_evals,
            &mut witness,
            FOLD_STEP,
        )
        .unwrap();

        assert_eq!(positions, vec![0, 1, 2, 3, 6, 7]);
        assert_eq!(
            sparse.subset_evals,
            vec![[q(10), q(101)], [q(102), q(13)], [q(16), q(17)]]
        );
        assert_eq!(
            sparse.subset_domain_initial_indexes,
            vec![
                bit_reverse_index(0, 3),
                bit_reverse_index(2, 3),
                bit_reverse_index(6, 3)
            ]
        );
        assert!(witness.next().is_none());
    }

    #[test]
    fn rebuild_fails_on_missing_witness() {
        let queries = Queries {
            positions: vec![0],
            log_domain_size: 2,
        };
        let mut witness = std::iter::empty();
        assert_eq!(
            compute_decommitment_positions_and_rebuild_evals(
                &queries,
                &[q(1)],
                &mut witness,
                FOLD_STEP,
            ),
            Err(InsufficientWitness)
        );
    }

    #[test]
    fn ibutterfly_splits_even_and_odd_parts() {
        // f(x) = a + b*x sampled at x and -x.
        let a = q(5);
        let b = q(9);
        let x = M31::from(1234u32);
        let mut v0 = a + b * x;
        let mut v1 = a - QM31::from(x) * b;
        ibutterfly(&mut v0, &mut v1, x.inverse().unwrap());
        assert_eq!(v0, a.double());
        assert_eq!(v1, b.double());
    }

    #[test]
    fn fold_line_agrees_with_polynomial_folding() {
        // f(x) = c0 + c1*x folded with alpha gives 2*(c0 + alpha*c1).
        let c0 = q(3);
        let c1 = q(8);
        let alpha = q(21);
        let domain = LineDomain::new(Coset::half_odds(2));
        let x = domain.at(0);
        let sparse = SparseEvaluation {
            subset_evals: vec![[c0 + c1 * x, c0 - QM31::from(x) * c1]],
            subset_domain_initial_indexes: vec![0],
        };
        let folded = sparse.fold_line(alpha, domain).unwrap();
        assert_eq!(folded, vec![(c0 + alpha * c1).double()]);
    }

    #[test]
    fn fold_circle_uses_the_y_twiddle() {
        // f(p) = g0 + y*g1 over a conjugate pair folds to 2*(g0 + alpha*g1).
        let g0 = q(4);
        let g1 = q(6);
        let alpha = q(11);
        let domain = CircleDomain::new(Coset::half_odds(1));
        let point = domain.at(0);
        let value_at = |p: crate::circle::CirclePoint<M31>| g0 + QM31::from(p.y) * g1;
        let sparse = SparseEvaluation {
            subset_evals: vec![[value_at(point), value_at(point.conjugate())]],
            subset_domain_initial_indexes: vec![0],
        };
        let folded = sparse.fold_circle(alpha, domain).unwrap();
        assert_eq!(folded, vec![(g0 + alpha * g1).double()]);
    }
}
