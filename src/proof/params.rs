//! Verification parameters describing the committed trace layout.

use serde::{Deserialize, Serialize};

use crate::field::QM31;

/// Mask and layout description of one AIR component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Largest constraint degree bound, in log form.
    pub max_constraint_log_degree_bound: u32,
    /// Trace log size of the component.
    pub log_size: u32,
    /// Signed row offsets per tree and column: `mask_offsets[tree][column]`
    /// lists the offsets at which that column is opened.
    pub mask_offsets: Vec<Vec<Vec<i32>>>,
    /// Indices of the preprocessed columns referenced by the component.
    pub preprocessed_columns: Vec<u32>,
}

/// Per-component verification parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentParams {
    /// Trace log size.
    pub log_size: u32,
    /// Claimed interaction sum carried for wire compatibility; the pipeline
    /// checks the composition polynomial from its coefficients instead of
    /// re-evaluating constraints.
    pub claimed_sum: QM31,
    /// Mask and layout description.
    pub info: ComponentInfo,
}

/// Everything the verifier needs to know about the statement besides the
/// proof itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationParams {
    /// Component descriptors.
    pub components: Vec<ComponentParams>,
    /// Number of committed preprocessed columns.
    pub n_preprocessed_columns: usize,
    /// Log degree bound of the composition polynomial.
    pub composition_log_degree_bound: u32,
}
