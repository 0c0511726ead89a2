//! The circle group over M31, its index arithmetic, cosets and evaluation
//! domains.

pub mod coset;
pub mod domain;
pub mod index;
pub mod point;

pub use coset::{CanonicCoset, Coset};
pub use domain::{CircleDomain, LineDomain, MAX_CIRCLE_DOMAIN_LOG_SIZE};
pub use index::{CirclePointIndex, M31_CIRCLE_LOG_ORDER};
pub use point::{CirclePoint, M31_CIRCLE_GEN};
