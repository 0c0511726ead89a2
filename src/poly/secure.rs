//! The composition polynomial as four coordinate circle polynomials.

use serde::{Deserialize, Serialize};

use crate::circle::CirclePoint;
use crate::field::{M31, QM31, SECURE_EXTENSION_DEGREE};
use crate::utils::fold;

/// A secure-field circle polynomial stored as one base-field coefficient
/// vector per QM31 basis component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureCirclePoly(pub [Vec<M31>; SECURE_EXTENSION_DEGREE]);

impl SecureCirclePoly {
    /// Number of coefficients per coordinate polynomial.
    pub fn len(&self) -> usize {
        self.0[0].len()
    }

    /// Whether the coordinate polynomials are empty.
    pub fn is_empty(&self) -> bool {
        self.0[0].is_empty()
    }

    /// Evaluates the polynomial at a secure-field circle point by evaluating
    /// each coordinate polynomial and recomposing the partial evaluations.
    pub fn eval_at_point(&self, point: CirclePoint<QM31>) -> QM31 {
        QM31::from_partial_evals([
            eval_circle_poly_at_point(&self.0[0], point),
            eval_circle_poly_at_point(&self.0[1], point),
            eval_circle_poly_at_point(&self.0[2], point),
            eval_circle_poly_at_point(&self.0[3], point),
        ])
    }
}

/// Evaluates a base-field circle polynomial at a secure-field point.
///
/// The monomial basis pairs the lowest coefficient bit with `y`, the next
/// with `x` and the remaining bits with the doubled x chain.
fn eval_circle_poly_at_point(coeffs: &[M31], point: CirclePoint<QM31>) -> QM31 {
    match coeffs.len() {
        0 => QM31::ZERO,
        1 => coeffs[0].into(),
        2 => QM31::from(coeffs[0]) + point.y * coeffs[1],
        _ => {
            let log_size = coeffs.len().trailing_zeros();
            let mut mappings = vec![point.y, point.x];
            let mut x = point.x;
            for _ in 2..log_size {
                x = CirclePoint::double_x(x);
                mappings.push(x);
            }
            mappings.reverse();
            fold(coeffs, &mappings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::M31_CIRCLE_GEN;

    fn m(value: u32) -> M31 {
        M31::from(value)
    }

    #[test]
    fn four_coefficients_match_the_monomial_basis() {
        // Basis for log size 2: {1, y, x, x*y}.
        let coeffs = vec![m(7), m(5), m(3), m(2)];
        let point = M31_CIRCLE_GEN.mul(99).into_ef();
        let expected = QM31::from(coeffs[0])
            + point.y * coeffs[1]
            + point.x * coeffs[2]
            + point.x * point.y * coeffs[3];
        let poly = SecureCirclePoly([coeffs, vec![m(0); 4], vec![m(0); 4], vec![m(0); 4]]);
        assert_eq!(poly.eval_at_point(point), expected);
    }

    #[test]
    fn partial_evaluations_recompose() {
        let point = M31_CIRCLE_GEN.mul(12345).into_ef();
        let constant = |value: u32| vec![m(value)];
        let poly = SecureCirclePoly([constant(1), constant(2), constant(3), constant(4)]);
        assert_eq!(
            poly.eval_at_point(point),
            QM31::from_partial_evals([
                QM31::from(m(1)),
                QM31::from(m(2)),
                QM31::from(m(3)),
                QM31::from(m(4)),
            ])
        );
    }
}
