//! Univariate polynomials over the line FFT basis.

use serde::{Deserialize, Serialize};

use crate::circle::CirclePoint;
use crate::field::QM31;
use crate::utils::fold;

/// A polynomial of degree below `2^log_size` in the line FFT basis.
///
/// The basis at index `i` is the product of the folding factors
/// `x, 2x^2 - 1, 2(2x^2 - 1)^2 - 1, ...` selected by the bits of `i`, with
/// the first factor keyed to the highest bit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePoly {
    coeffs: Vec<QM31>,
    log_size: u32,
}

impl LinePoly {
    /// Wraps a coefficient vector; the length must be a power of two.
    pub fn new(coeffs: Vec<QM31>) -> Self {
        debug_assert!(coeffs.len().is_power_of_two());
        let log_size = coeffs.len().trailing_zeros();
        Self { coeffs, log_size }
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Whether the polynomial has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// The stored coefficients.
    pub fn coeffs(&self) -> &[QM31] {
        &self.coeffs
    }

    /// Evaluates the polynomial at `x`.
    pub fn eval_at_point(&self, x: QM31) -> QM31 {
        let mut doublings = Vec::with_capacity(self.log_size as usize);
        let mut point = x;
        for _ in 0..self.log_size {
            doublings.push(point);
            point = CirclePoint::double_x(point);
        }
        fold(&self.coeffs, &doublings)
    }
}
