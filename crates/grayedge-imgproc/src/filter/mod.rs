//! Filter operations
//!
//! This module provides the fixed Gaussian and Sobel filters of the edge
//! detection pipeline.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
