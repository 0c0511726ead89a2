//! Canonical little-endian decoding helpers for the proof wire format.
//!
//! The helpers provide a shared vocabulary for reading primitive values out
//! of a proof byte stream with `(section, field)` error context. All integers
//! on the wire are little-endian.

mod cursor;
mod error;
mod ints;

pub use cursor::ByteReader;
pub use error::{SerError, SerKind, SerResult};
pub use ints::{
    read_length_prefix, read_u32, read_u64, write_length_prefix, write_u32, write_u64,
    MAX_LENGTH_PREFIX,
};
