//! DEEP quotient answers: reduces sampled-value consistency claims to the
//! low-degree claims checked by FRI.

use std::collections::BTreeMap;

use crate::circle::{CanonicCoset, CirclePoint};
use crate::field::{batch_inverse, FieldError, CM31, M31, QM31};
use crate::utils::bit_reverse_index;

use super::PcsError;

/// A sampled evaluation of one column at one secure-field point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointSample {
    /// The sample point.
    pub point: CirclePoint<QM31>,
    /// The sampled value.
    pub value: QM31,
}

/// All column samples sharing one sample point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSampleBatch {
    /// The common sample point.
    pub point: CirclePoint<QM31>,
    /// Column indices (into the per-log-size column list) and their sampled
    /// values.
    pub columns_and_values: Vec<(usize, QM31)>,
}

impl ColumnSampleBatch {
    /// Groups samples by their point, preserving order of first appearance.
    pub fn new_vec(samples: &[&Vec<PointSample>]) -> Vec<Self> {
        let mut batches: Vec<ColumnSampleBatch> = Vec::new();
        for (column_index, column_samples) in samples.iter().enumerate() {
            for sample in column_samples.iter() {
                match batches.iter_mut().find(|batch| batch.point == sample.point) {
                    Some(batch) => batch.columns_and_values.push((column_index, sample.value)),
                    None => batches.push(ColumnSampleBatch {
                        point: sample.point,
                        columns_and_values: vec![(column_index, sample.value)],
                    }),
                }
            }
        }
        batches
    }
}

/// Line coefficients `(a, b, c)` per column of each batch, pre-scaled by the
/// running powers of the random coefficient.
struct QuotientConstants {
    line_coeffs: Vec<Vec<(QM31, QM31, QM31)>>,
    batch_random_coeffs: Vec<QM31>,
}

fn quotient_constants(sample_batches: &[ColumnSampleBatch], random_coeff: QM31) -> QuotientConstants {
    let line_coeffs = sample_batches
        .iter()
        .map(|batch| {
            let mut alpha = QM31::ONE;
            batch
                .columns_and_values
                .iter()
                .map(|(_, value)| {
                    alpha *= random_coeff;
                    complex_conjugate_line_coeffs(batch.point, *value, alpha)
                })
                .collect()
        })
        .collect();
    let batch_random_coeffs = sample_batches
        .iter()
        .map(|batch| random_coeff.pow(batch.columns_and_values.len() as u128))
        .collect();
    QuotientConstants {
        line_coeffs,
        batch_random_coeffs,
    }
}

/// Coefficients of the line through a sample and its complex conjugate,
/// scaled by `alpha`: `a*y + b` interpolates the conjugate value pair and
/// `c` normalizes the sampled value.
fn complex_conjugate_line_coeffs(
    point: CirclePoint<QM31>,
    value: QM31,
    alpha: QM31,
) -> (QM31, QM31, QM31) {
    let a = value.complex_conjugate() - value;
    let c = point.complex_conjugate().y - point.y;
    let b = value * c - a * point.y;
    (alpha * a, alpha * b, alpha * c)
}

/// The conjugation-aware vanishing denominator of each batch at a domain
/// point, batch-inverted.
fn denominator_inverses(
    sample_batches: &[ColumnSampleBatch],
    domain_point: CirclePoint<M31>,
) -> Result<Vec<CM31>, FieldError> {
    let denominators: Vec<CM31> = sample_batches
        .iter()
        .map(|batch| {
            let real_x = batch.point.x.first;
            let imag_x = batch.point.x.second;
            let real_y = batch.point.y.first;
            let imag_y = batch.point.y.second;
            (real_x - domain_point.x) * imag_y - (real_y - domain_point.y) * imag_x
        })
        .collect();
    batch_inverse(&denominators)
}

/// Accumulates the quotient contributions of every batch at one domain row.
fn accumulate_row_quotients(
    sample_batches: &[ColumnSampleBatch],
    queried_values_at_row: &[M31],
    quotient_constants: &QuotientConstants,
    domain_point: CirclePoint<M31>,
) -> Result<QM31, PcsError> {
    let denominator_inverses = denominator_inverses(sample_batches, domain_point)?;
    let mut row_accumulator = QM31::ZERO;
    for (((batch, line_coeffs), batch_coeff), denominator_inverse) in sample_batches
        .iter()
        .zip(&quotient_constants.line_coeffs)
        .zip(&quotient_constants.batch_random_coeffs)
        .zip(denominator_inverses)
    {
        let mut numerator = QM31::ZERO;
        for ((column_index, _), (a, b, c)) in batch.columns_and_values.iter().zip(line_coeffs) {
            let queried_value = *queried_values_at_row
                .get(*column_index)
                .ok_or(PcsError::Shape("column index out of range"))?;
            let value = *c * queried_value;
            let linear_term = *a * domain_point.y + *b;
            numerator += value - linear_term;
        }
        row_accumulator = row_accumulator * *batch_coeff + numerator * denominator_inverse;
    }
    Ok(row_accumulator)
}

/// Computes the FRI input: one quotient evaluation per query position for
/// every unique column log size, in descending log-size order.
///
/// * `column_log_sizes` - blown-up column log sizes per tree.
/// * `samples` - sampled values paired with their points, per tree and
///   column (same shape as `column_log_sizes`).
/// * `queried_values` - per-tree flat queried column values, consumed
///   row-major within each log size group.
pub fn fri_answers(
    column_log_sizes: &[Vec<u32>],
    samples: &[Vec<Vec<PointSample>>],
    random_coeff: QM31,
    query_positions_per_log_size: &BTreeMap<u32, Vec<usize>>,
    queried_values: &[Vec<M31>],
) -> Result<Vec<Vec<QM31>>, PcsError> {
    if samples.len() != column_log_sizes.len() {
        return Err(PcsError::Shape("sample tree count"));
    }
    if queried_values.len() != column_log_sizes.len() {
        return Err(PcsError::Shape("queried values tree count"));
    }
    for (tree_log_sizes, tree_samples) in column_log_sizes.iter().zip(samples) {
        if tree_log_sizes.len() != tree_samples.len() {
            return Err(PcsError::Shape("sample column count"));
        }
    }

    let mut unique_log_sizes: Vec<u32> = column_log_sizes
        .iter()
        .flat_map(|tree| tree.iter().copied())
        .collect();
    unique_log_sizes.sort_unstable_by(|a, b| b.cmp(a));
    unique_log_sizes.dedup();

    let mut queried_values_by_tree: Vec<_> = queried_values
        .iter()
        .map(|values| values.iter().copied())
        .collect();

    let mut answers = Vec::with_capacity(unique_log_sizes.len());
    for log_size in unique_log_sizes {
        // Columns of this log size, flattened tree-major.
        let mut columns: Vec<&Vec<PointSample>> = Vec::new();
        let mut n_columns_per_tree = Vec::with_capacity(column_log_sizes.len());
        for (tree_log_sizes, tree_samples) in column_log_sizes.iter().zip(samples) {
            let mut n_columns = 0;
            for (column_log_size, column_samples) in tree_log_sizes.iter().zip(tree_samples) {
                if *column_log_size == log_size {
                    columns.push(column_samples);
                    n_columns += 1;
                }
            }
            n_columns_per_tree.push(n_columns);
        }

        let query_positions = query_positions_per_log_size
            .get(&log_size)
            .ok_or(PcsError::Shape("missing query positions"))?;
        answers.push(fri_answers_for_log_size(
            log_size,
            &columns,
            random_coeff,
            query_positions,
            &mut queried_values_by_tree,
            &n_columns_per_tree,
        )?);
    }
    Ok(answers)
}

fn fri_answers_for_log_size(
    log_size: u32,
    samples: &[&Vec<PointSample>],
    random_coeff: QM31,
    query_positions: &[usize],
    queried_values_by_tree: &mut [impl Iterator<Item = M31>],
    n_columns_per_tree: &[usize],
) -> Result<Vec<QM31>, PcsError> {
    let sample_batches = ColumnSampleBatch::new_vec(samples);
    let quotient_constants = quotient_constants(&sample_batches, random_coeff);
    let commitment_domain = CanonicCoset::new(log_size).circle_domain();

    let mut quotient_evals_at_queries = Vec::with_capacity(query_positions.len());
    for &query_position in query_positions {
        let domain_point = commitment_domain.at(bit_reverse_index(query_position, log_size));
        let mut queried_values_at_row = Vec::new();
        for (tree_values, n_columns) in queried_values_by_tree.iter_mut().zip(n_columns_per_tree)
        {
            for _ in 0..*n_columns {
                queried_values_at_row.push(
                    tree_values
                        .next()
                        .ok_or(PcsError::Shape("queried values exhausted"))?,
                );
            }
        }
        quotient_evals_at_queries.push(accumulate_row_quotients(
            &sample_batches,
            &queried_values_at_row,
            &quotient_constants,
            domain_point,
        )?);
    }
    Ok(quotient_evals_at_queries)
}
