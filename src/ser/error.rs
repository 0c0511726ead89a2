use core::fmt;
use serde::{Deserialize, Serialize};

/// Context markers used when reporting wire decoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerKind {
    /// Top-level proof framing.
    Proof,
    /// Commitment root list.
    Commitments,
    /// Sampled out-of-domain values.
    SampledValues,
    /// Merkle decommitment witnesses.
    Decommitments,
    /// Queried column values.
    QueriedValues,
    /// Embedded FRI proof payload.
    Fri,
    /// Composition polynomial coefficient vectors.
    CompositionPoly,
    /// Trailing PCS configuration.
    Config,
}

impl fmt::Display for SerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerKind::Proof => write!(f, "proof"),
            SerKind::Commitments => write!(f, "commitments"),
            SerKind::SampledValues => write!(f, "sampled values"),
            SerKind::Decommitments => write!(f, "decommitments"),
            SerKind::QueriedValues => write!(f, "queried values"),
            SerKind::Fri => write!(f, "fri proof"),
            SerKind::CompositionPoly => write!(f, "composition polynomial"),
            SerKind::Config => write!(f, "config"),
        }
    }
}

/// Canonical decoding error surfaced while parsing proof bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerError {
    /// Input ended before the expected number of bytes were read.
    UnexpectedEnd {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// A length prefix exceeded the configured bounds or remaining buffer.
    InvalidLength {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// Encountered a non-canonical value (e.g. an unreduced field element).
    InvalidValue {
        /// Section that failed to decode.
        kind: SerKind,
        /// Field that was being processed.
        field: &'static str,
    },
    /// Additional bytes remained after consuming the expected payload.
    TrailingBytes {
        /// Position reached by the decoder.
        consumed: usize,
        /// Number of remaining bytes.
        remaining: usize,
    },
}

impl SerError {
    /// Creates an unexpected-end error helper.
    pub fn unexpected_end(kind: SerKind, field: &'static str) -> Self {
        SerError::UnexpectedEnd { kind, field }
    }

    /// Creates an invalid-length error helper.
    pub fn invalid_length(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidLength { kind, field }
    }

    /// Creates an invalid-value error helper.
    pub fn invalid_value(kind: SerKind, field: &'static str) -> Self {
        SerError::InvalidValue { kind, field }
    }
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::UnexpectedEnd { kind, field } => {
                write!(f, "unexpected end of input in {kind} ({field})")
            }
            SerError::InvalidLength { kind, field } => {
                write!(f, "invalid length prefix in {kind} ({field})")
            }
            SerError::InvalidValue { kind, field } => {
                write!(f, "non-canonical value in {kind} ({field})")
            }
            SerError::TrailingBytes { consumed, remaining } => {
                write!(f, "{remaining} trailing bytes after offset {consumed}")
            }
        }
    }
}

impl std::error::Error for SerError {}

/// Convenient alias for decoding results.
pub type SerResult<T> = core::result::Result<T, SerError>;
