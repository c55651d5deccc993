use grayedge_image::{ImageError, ImageSize};

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The magic number is not one of the supported PGM variants.
    #[error("Unsupported image format: {0:?}, expected P2 or P5")]
    UnsupportedFormat(String),

    /// The header is malformed.
    #[error("Invalid PGM header. {0}")]
    InvalidHeader(String),

    /// An ASCII sample is not a decimal integer.
    #[error("Invalid sample {token:?} at index {index}")]
    InvalidSample {
        /// Index of the sample in row-major order.
        index: usize,
        /// The offending token.
        token: String,
    },

    /// The pixel stream ended before `width * height` samples were read.
    #[error("Truncated pixel data: expected {expected} samples, found {found}")]
    TruncatedData {
        /// Number of samples announced by the header.
        expected: usize,
        /// Number of samples actually present.
        found: usize,
    },

    /// The destination image does not match the size in the header.
    #[error("Image size mismatch: header has {0}, buffer has {1}")]
    SizeMismatch(ImageSize, ImageSize),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] ImageError),
}
