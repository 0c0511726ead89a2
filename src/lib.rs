#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Core verifier for STWO Circle-STARK proofs.
//!
//! Given a parsed proof, the statement parameters and the pre-registered
//! tree layout, [`verify`] replays the Fiat–Shamir transcript over a
//! Keccak-256 channel and returns accept or a single terminal
//! [`VerifyError`]. The crate is strictly single-threaded and
//! deterministic: all state is owned by the `verify` invocation and nothing
//! survives across calls.
//!
//! The pipeline spans the Mersenne31 field tower ([`field`]), the circle
//! group and its evaluation domains ([`circle`]), the transcript channel
//! ([`channel`]), multi-column Merkle decommitment verification
//! ([`merkle`]), the commitment-scheme registry with its DEEP quotient
//! answers ([`pcs`]) and FRI low-degree verification ([`fri`]).

pub mod channel;
pub mod circle;
pub mod field;
pub mod fri;
pub mod hash;
pub mod merkle;
pub mod pcs;
pub mod poly;
pub mod proof;
pub mod queries;
pub mod ser;
pub mod utils;

pub use channel::{ChannelError, KeccakChannel};
pub use field::{FieldError, CM31, M31, QM31};
pub use fri::FriConfig;
pub use pcs::PcsConfig;
pub use proof::{
    verify, ComponentInfo, ComponentParams, StarkProof, VerificationParams, VerifyError,
};
