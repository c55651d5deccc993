use std::path::{Path, PathBuf};

use grayedge_image::{Image, ImageError, ImageSize};
use grayedge_imgproc::{
    filter::{self, MagnitudeNarrowing},
    parallel::ExecutionStrategy,
    FilterError,
};
use grayedge_io::{pgm, IoError};

/// Settings shared by every image a pipeline processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How both filter passes are scheduled.
    pub strategy: ExecutionStrategy,
    /// How gradient magnitudes above 255 are stored.
    pub narrowing: MagnitudeNarrowing,
}

impl PipelineConfig {
    /// Serial execution with wrapping magnitudes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the magnitude narrowing policy.
    pub fn with_narrowing(mut self, narrowing: MagnitudeNarrowing) -> Self {
        self.narrowing = narrowing;
        self
    }
}

/// An error type for the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The input file could not be opened or read.
    #[error("Could not open {}. {source}", path.display())]
    Open {
        /// The input path.
        path: PathBuf,
        /// The underlying error.
        source: IoError,
    },

    /// The input file is not a supported or well formed PGM image.
    #[error("Could not decode {}. {source}", path.display())]
    Decode {
        /// The input path.
        path: PathBuf,
        /// The underlying error.
        source: IoError,
    },

    /// The working buffers could not be allocated.
    #[error("Could not allocate the buffers for {}. {source}", path.display())]
    Allocation {
        /// The input path.
        path: PathBuf,
        /// The underlying error.
        source: ImageError,
    },

    /// A filter pass failed.
    #[error("Filtering failed. {0}")]
    Filter(#[from] FilterError),

    /// An output file could not be written.
    #[error("Could not write {}. {source}", path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying error.
        source: IoError,
    },
}

/// The three buffers of one processing run, all of the same size.
pub struct FrameBuffers {
    /// The decoded input.
    pub source: Image<u8>,
    /// The Gaussian blurred input.
    pub blurred: Image<u8>,
    /// The Sobel gradient magnitude of the blurred image.
    pub gradient: Image<u8>,
}

impl FrameBuffers {
    /// Allocate three zeroed buffers of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if any buffer cannot be reserved.
    pub fn allocate(size: ImageSize) -> Result<Self, ImageError> {
        Ok(Self {
            source: Image::from_size_val(size, 0u8)?,
            blurred: Image::from_size_val(size, 0u8)?,
            gradient: Image::from_size_val(size, 0u8)?,
        })
    }

    /// The size shared by the buffers.
    pub fn size(&self) -> ImageSize {
        self.source.size()
    }

    /// Blur `source` into `blurred`, then compute the gradient of `blurred`.
    ///
    /// The border of `gradient` is left as it was.
    pub fn run(&mut self, config: &PipelineConfig) -> Result<(), FilterError> {
        filter::gaussian_blur_5x5(&self.source, &mut self.blurred, config.strategy)?;
        filter::sobel_magnitude_3x3(
            &self.blurred,
            &mut self.gradient,
            config.narrowing,
            config.strategy,
        )?;
        Ok(())
    }
}

/// Run the edge detection pipeline on one PGM file.
///
/// Loads `input`, blurs it with the 5x5 Gaussian kernel, computes the Sobel
/// gradient magnitude of the blurred image, and writes both results as P2 files.
/// Nothing is written unless the input was fully decoded.
///
/// # Arguments
///
/// * `input` - A P2 or P5 file.
/// * `blur_output` - Where the blurred image is written.
/// * `edge_output` - Where the gradient image is written.
/// * `config` - The pipeline settings.
///
/// # Returns
///
/// The size of the processed image.
pub fn process_image(
    input: impl AsRef<Path>,
    blur_output: impl AsRef<Path>,
    edge_output: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<ImageSize, PipelineError> {
    let input = input.as_ref();
    log::info!("Processing {}", input.display());

    let bytes = pgm::read_pgm_file(input).map_err(|source| PipelineError::Open {
        path: input.to_path_buf(),
        source,
    })?;

    let decode_err = |source| PipelineError::Decode {
        path: input.to_path_buf(),
        source,
    };
    let (header, _) = pgm::decode_pgm_header(&bytes).map_err(decode_err)?;

    let mut buffers =
        FrameBuffers::allocate(header.size).map_err(|source| PipelineError::Allocation {
            path: input.to_path_buf(),
            source,
        })?;
    pgm::decode_image_pgm_into(&mut buffers.source, &bytes).map_err(decode_err)?;
    drop(bytes);

    buffers.run(config)?;

    for (path, image) in [
        (blur_output.as_ref(), &buffers.blurred),
        (edge_output.as_ref(), &buffers.gradient),
    ] {
        pgm::write_image_pgm(path, image).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    log::info!("Finished {} ({})", input.display(), buffers.size());
    Ok(buffers.size())
}
