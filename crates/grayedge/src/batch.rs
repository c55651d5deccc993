use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use crate::pipeline::{process_image, PipelineConfig, PipelineError};

/// Default directory scanned for input images.
pub const DEFAULT_INPUT_DIR: &str = "input_images";

/// Default directory receiving the outputs.
pub const DEFAULT_OUTPUT_DIR: &str = "output_images";

/// Settings of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory scanned for PGM files.
    pub input_dir: PathBuf,
    /// Directory the outputs are written to. Created if missing.
    pub output_dir: PathBuf,
    /// Settings applied to every image.
    pub pipeline: PipelineConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Set the input directory.
    pub fn with_input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.input_dir = input_dir.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the per-image pipeline settings.
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

/// An error type for the batch driver.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    /// The input directory could not be listed.
    #[error("Could not list the input directory {}. {source}", path.display())]
    InputDir {
        /// The input directory.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("Could not create the output directory {}. {source}", path.display())]
    OutputDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// An image failed in a way that stops the run.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Outcome of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Inputs that were processed, in processing order.
    pub processed: Vec<PathBuf>,
    /// Inputs that could not be opened.
    pub skipped: Vec<PathBuf>,
}

/// List the regular files of `dir` whose name contains `.pgm`, sorted by name.
pub fn list_pgm_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains(".pgm") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// The blur and edge output paths for an input file name.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use grayedge::batch::output_paths;
///
/// let (blur, edge) = output_paths("out", "lena.pgm".as_ref());
/// assert_eq!(blur, Path::new("out/lena.pgm_blur.pgm"));
/// assert_eq!(edge, Path::new("out/lena.pgm_edge.pgm"));
/// ```
pub fn output_paths(output_dir: impl AsRef<Path>, file_name: &OsStr) -> (PathBuf, PathBuf) {
    let with_suffix = |suffix: &str| {
        let mut name = file_name.to_os_string();
        name.push(suffix);
        output_dir.as_ref().join(name)
    };
    (with_suffix("_blur.pgm"), with_suffix("_edge.pgm"))
}

/// Run the pipeline on a list of input files, one at a time.
///
/// Files that cannot be opened are logged and skipped. Any other failure stops
/// the run.
pub fn process_files(
    files: &[PathBuf],
    output_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<BatchReport, BatchError> {
    let output_dir = output_dir.as_ref();
    let mut report = BatchReport::default();

    for input in files {
        let Some(file_name) = input.file_name() else {
            log::warn!("Skipping {}, it has no file name", input.display());
            report.skipped.push(input.clone());
            continue;
        };
        let (blur_output, edge_output) = output_paths(output_dir, file_name);

        match process_image(input, &blur_output, &edge_output, config) {
            Ok(_) => report.processed.push(input.clone()),
            Err(PipelineError::Open { path, source }) => {
                log::warn!("Skipping {}. {}", path.display(), source);
                report.skipped.push(path);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(report)
}

/// Process every PGM file of `config.input_dir` into `config.output_dir`.
///
/// # Errors
///
/// Returns [`BatchError::InputDir`] if the input directory cannot be listed,
/// [`BatchError::OutputDir`] if the output directory cannot be created, and
/// [`BatchError::Pipeline`] for the first decode, allocation or write failure.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport, BatchError> {
    let files = list_pgm_files(&config.input_dir).map_err(|source| BatchError::InputDir {
        path: config.input_dir.clone(),
        source,
    })?;
    log::info!(
        "Found {} PGM files in {}",
        files.len(),
        config.input_dir.display()
    );

    std::fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::OutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let report = process_files(&files, &config.output_dir, &config.pipeline)?;
    log::info!(
        "Batch done: {} processed, {} skipped",
        report.processed.len(),
        report.skipped.len()
    );
    Ok(report)
}
