use thiserror::Error;

/// An error type for the kernel operations.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// Length mismatch for vector operations
    #[error("Length mismatch: expected equal length vectors, got {0} and {1}")]
    LengthMismatch(usize, usize),

    /// A result differs from the reference by more than the tolerance.
    #[error("Mismatch at index {index}: got {actual}, expected {expected}")]
    ToleranceExceeded {
        /// First index where the results disagree.
        index: usize,
        /// Value produced by the kernel under test.
        actual: f64,
        /// Value produced by the reference.
        expected: f64,
    },
}
