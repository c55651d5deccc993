#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the kernels module.
pub mod error;

/// module containing the scalar reference and dispatched kernels.
pub mod ops;

/// Hardware specific implementations.
mod simd;

pub use crate::error::KernelError;
pub use crate::simd::SimdBackend;
