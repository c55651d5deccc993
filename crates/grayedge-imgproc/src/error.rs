use grayedge_image::ImageError;

use crate::parallel::ParallelError;

/// An error type for the filter operations.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// The source and destination images are not compatible.
    #[error("Invalid image for filtering. {0}")]
    ImageError(#[from] ImageError),

    /// The execution strategy could not be applied.
    #[error("Failed to schedule the filter. {0}")]
    ParallelError(#[from] ParallelError),
}
