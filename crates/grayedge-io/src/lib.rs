#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, header parsing and
/// truncated pixel data.
pub mod error;

/// PGM image decoding and encoding.
///
/// Reads P2 (ASCII) and P5 (binary) grayscale maps, writes P2.
pub mod pgm;

pub use crate::error::IoError;
