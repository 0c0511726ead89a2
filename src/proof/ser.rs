//! Wire codec for the proof container.
//!
//! All integers are little-endian; lists carry a `u32` length prefix. Field
//! elements are rejected unless fully reduced, so a decoded proof always
//! satisfies the canonical-representation invariant.

use crate::field::{M31, P, QM31, SECURE_EXTENSION_DEGREE};
use crate::fri::{FriConfig, FriLayerProof, FriProof};
use crate::hash::DIGEST_BYTES;
use crate::merkle::MerkleDecommitment;
use crate::pcs::PcsConfig;
use crate::poly::{LinePoly, SecureCirclePoly};
use crate::ser::{
    read_length_prefix, read_u32, read_u64, write_length_prefix, write_u32, write_u64,
    ByteReader, SerError, SerKind, SerResult,
};

use super::types::StarkProof;

const QM31_BYTES: usize = 16;

impl StarkProof {
    /// Decodes a proof from its wire representation, rejecting trailing
    /// bytes and non-canonical field elements.
    pub fn from_bytes(bytes: &[u8]) -> SerResult<Self> {
        let mut reader = ByteReader::new(bytes);

        let n_commitments =
            read_length_prefix(&mut reader, DIGEST_BYTES, SerKind::Commitments, "roots")?;
        let mut commitments = Vec::with_capacity(n_commitments);
        for _ in 0..n_commitments {
            commitments.push(reader.read_array::<DIGEST_BYTES>(SerKind::Commitments, "root")?);
        }

        let n_trees = read_length_prefix(&mut reader, 4, SerKind::SampledValues, "trees")?;
        let mut sampled_values = Vec::with_capacity(n_trees);
        for _ in 0..n_trees {
            let n_columns = read_length_prefix(&mut reader, 4, SerKind::SampledValues, "columns")?;
            let mut columns = Vec::with_capacity(n_columns);
            for _ in 0..n_columns {
                let n_samples =
                    read_length_prefix(&mut reader, QM31_BYTES, SerKind::SampledValues, "samples")?;
                let mut samples = Vec::with_capacity(n_samples);
                for _ in 0..n_samples {
                    samples.push(read_qm31(&mut reader, SerKind::SampledValues, "sample")?);
                }
                columns.push(samples);
            }
            sampled_values.push(columns);
        }

        let n_decommitments =
            read_length_prefix(&mut reader, 8, SerKind::Decommitments, "trees")?;
        let mut decommitments = Vec::with_capacity(n_decommitments);
        for _ in 0..n_decommitments {
            decommitments.push(read_decommitment(&mut reader)?);
        }

        let n_queried_trees =
            read_length_prefix(&mut reader, 4, SerKind::QueriedValues, "trees")?;
        let mut queried_values = Vec::with_capacity(n_queried_trees);
        for _ in 0..n_queried_trees {
            let n_values = read_length_prefix(&mut reader, 4, SerKind::QueriedValues, "values")?;
            let mut values = Vec::with_capacity(n_values);
            for _ in 0..n_values {
                values.push(read_m31(&mut reader, SerKind::QueriedValues, "value")?);
            }
            queried_values.push(values);
        }

        let proof_of_work = read_u64(&mut reader, SerKind::Proof, "proof of work")?;

        let first_layer = read_fri_layer(&mut reader)?;
        let n_inner_layers = read_length_prefix(&mut reader, 36, SerKind::Fri, "inner layers")?;
        let mut inner_layers = Vec::with_capacity(n_inner_layers);
        for _ in 0..n_inner_layers {
            inner_layers.push(read_fri_layer(&mut reader)?);
        }
        let n_coeffs = read_length_prefix(&mut reader, QM31_BYTES, SerKind::Fri, "last layer")?;
        if n_coeffs == 0 || !n_coeffs.is_power_of_two() {
            return Err(SerError::invalid_length(SerKind::Fri, "last layer"));
        }
        let mut last_layer_coeffs = Vec::with_capacity(n_coeffs);
        for _ in 0..n_coeffs {
            last_layer_coeffs.push(read_qm31(&mut reader, SerKind::Fri, "coefficient")?);
        }
        let fri_proof = FriProof {
            first_layer,
            inner_layers,
            last_layer_poly: LinePoly::new(last_layer_coeffs),
        };

        let mut coordinate_polys = Vec::with_capacity(SECURE_EXTENSION_DEGREE);
        for _ in 0..SECURE_EXTENSION_DEGREE {
            let n = read_length_prefix(&mut reader, 4, SerKind::CompositionPoly, "coefficients")?;
            let mut coeffs = Vec::with_capacity(n);
            for _ in 0..n {
                coeffs.push(read_m31(&mut reader, SerKind::CompositionPoly, "coefficient")?);
            }
            coordinate_polys.push(coeffs);
        }
        let composition_poly = SecureCirclePoly(match coordinate_polys.try_into() {
            Ok(polys) => polys,
            Err(_) => return Err(SerError::invalid_value(SerKind::CompositionPoly, "arity")),
        });

        let config = PcsConfig {
            fri_config: FriConfig {
                log_blowup_factor: read_u32(&mut reader, SerKind::Config, "log blowup")?,
                log_last_layer_degree_bound: read_u32(
                    &mut reader,
                    SerKind::Config,
                    "log last layer bound",
                )?,
                n_queries: read_u32(&mut reader, SerKind::Config, "n queries")? as usize,
            },
            pow_bits: read_u32(&mut reader, SerKind::Config, "pow bits")?,
        };

        reader.ensure_consumed()?;

        Ok(Self {
            config,
            commitments,
            sampled_values,
            decommitments,
            queried_values,
            proof_of_work,
            fri_proof,
            composition_poly,
        })
    }

    /// Encodes the proof into its wire representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        write_length_prefix(&mut out, self.commitments.len());
        for root in &self.commitments {
            out.extend_from_slice(root);
        }

        write_length_prefix(&mut out, self.sampled_values.len());
        for tree in &self.sampled_values {
            write_length_prefix(&mut out, tree.len());
            for column in tree {
                write_length_prefix(&mut out, column.len());
                for sample in column {
                    write_qm31(&mut out, *sample);
                }
            }
        }

        write_length_prefix(&mut out, self.decommitments.len());
        for decommitment in &self.decommitments {
            write_decommitment(&mut out, decommitment);
        }

        write_length_prefix(&mut out, self.queried_values.len());
        for values in &self.queried_values {
            write_length_prefix(&mut out, values.len());
            for value in values {
                write_u32(&mut out, value.value());
            }
        }

        write_u64(&mut out, self.proof_of_work);

        write_fri_layer(&mut out, &self.fri_proof.first_layer);
        write_length_prefix(&mut out, self.fri_proof.inner_layers.len());
        for layer in &self.fri_proof.inner_layers {
            write_fri_layer(&mut out, layer);
        }
        write_length_prefix(&mut out, self.fri_proof.last_layer_poly.len());
        for coeff in self.fri_proof.last_layer_poly.coeffs() {
            write_qm31(&mut out, *coeff);
        }

        for coeffs in &self.composition_poly.0 {
            write_length_prefix(&mut out, coeffs.len());
            for coeff in coeffs {
                write_u32(&mut out, coeff.value());
            }
        }

        write_u32(&mut out, self.config.fri_config.log_blowup_factor);
        write_u32(&mut out, self.config.fri_config.log_last_layer_degree_bound);
        write_u32(&mut out, self.config.fri_config.n_queries as u32);
        write_u32(&mut out, self.config.pow_bits);

        out
    }
}

fn read_m31(reader: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<M31> {
    let raw = read_u32(reader, kind, field)?;
    if raw >= P {
        return Err(SerError::invalid_value(kind, field));
    }
    Ok(M31::from_u32_unchecked(raw))
}

fn read_qm31(reader: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<QM31> {
    let a = read_m31(reader, kind, field)?;
    let b = read_m31(reader, kind, field)?;
    let c = read_m31(reader, kind, field)?;
    let d = read_m31(reader, kind, field)?;
    Ok(QM31::from_m31_coords([a, b, c, d]))
}

fn write_qm31(out: &mut Vec<u8>, value: QM31) {
    for coordinate in value.to_m31_coords() {
        write_u32(out, coordinate.value());
    }
}

fn read_decommitment(reader: &mut ByteReader<'_>) -> SerResult<MerkleDecommitment> {
    let n_hashes =
        read_length_prefix(reader, DIGEST_BYTES, SerKind::Decommitments, "hash witness")?;
    let mut hash_witness = Vec::with_capacity(n_hashes);
    for _ in 0..n_hashes {
        hash_witness.push(reader.read_array::<DIGEST_BYTES>(SerKind::Decommitments, "hash")?);
    }
    let n_values = read_length_prefix(reader, 4, SerKind::Decommitments, "column witness")?;
    let mut column_witness = Vec::with_capacity(n_values);
    for _ in 0..n_values {
        column_witness.push(read_m31(reader, SerKind::Decommitments, "column value")?);
    }
    Ok(MerkleDecommitment {
        hash_witness,
        column_witness,
    })
}

fn write_decommitment(out: &mut Vec<u8>, decommitment: &MerkleDecommitment) {
    write_length_prefix(out, decommitment.hash_witness.len());
    for hash in &decommitment.hash_witness {
        out.extend_from_slice(hash);
    }
    write_length_prefix(out, decommitment.column_witness.len());
    for value in &decommitment.column_witness {
        write_u32(out, value.value());
    }
}

fn read_fri_layer(reader: &mut ByteReader<'_>) -> SerResult<FriLayerProof> {
    let n_witness = read_length_prefix(reader, QM31_BYTES, SerKind::Fri, "witness")?;
    let mut fri_witness = Vec::with_capacity(n_witness);
    for _ in 0..n_witness {
        fri_witness.push(read_qm31(reader, SerKind::Fri, "witness value")?);
    }
    let decommitment = read_decommitment(reader)?;
    let commitment = reader.read_array::<DIGEST_BYTES>(SerKind::Fri, "commitment")?;
    Ok(FriLayerProof {
        fri_witness,
        decommitment,
        commitment,
    })
}

fn write_fri_layer(out: &mut Vec<u8>, layer: &FriLayerProof) {
    write_length_prefix(out, layer.fri_witness.len());
    for value in &layer.fri_witness {
        write_qm31(out, *value);
    }
    write_decommitment(out, &layer.decommitment);
    out.extend_from_slice(&layer.commitment);
}
