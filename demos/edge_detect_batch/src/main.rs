use std::path::PathBuf;

use argh::FromArgs;
use grayedge::{
    batch::{run_batch, BatchConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR},
    imgproc::{filter::MagnitudeNarrowing, parallel::ExecutionStrategy},
    pipeline::PipelineConfig,
};

#[derive(FromArgs)]
/// Run edge detection on every PGM file of a directory
struct Args {
    /// directory scanned for files whose name contains `.pgm`
    #[argh(option, default = "PathBuf::from(DEFAULT_INPUT_DIR)")]
    input_dir: PathBuf,

    /// directory receiving the `_blur.pgm` and `_edge.pgm` outputs
    #[argh(option, default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    output_dir: PathBuf,

    /// clamp edge magnitudes to 255 instead of keeping the low 8 bits
    #[argh(switch)]
    saturate: bool,

    /// split each image across rows on the global thread pool
    #[argh(switch)]
    parallel: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let mut pipeline = PipelineConfig::new();
    if args.parallel {
        pipeline = pipeline.with_strategy(ExecutionStrategy::ParallelRows);
    }
    if args.saturate {
        pipeline = pipeline.with_narrowing(MagnitudeNarrowing::Saturate);
    }

    let config = BatchConfig::default()
        .with_input_dir(args.input_dir)
        .with_output_dir(args.output_dir)
        .with_pipeline(pipeline);

    let report = run_batch(&config)?;
    if !report.skipped.is_empty() {
        log::warn!("{} files could not be opened", report.skipped.len());
    }

    Ok(())
}
