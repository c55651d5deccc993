#![deny(missing_docs)]
//! Image types for generating and manipulating grayscale raster buffers

/// raster buffer representation with runtime width and height.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
