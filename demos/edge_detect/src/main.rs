use std::{path::PathBuf, process::ExitCode};

use argh::FromArgs;
use grayedge::{
    imgproc::{filter::MagnitudeNarrowing, parallel::ExecutionStrategy},
    pipeline::{process_image, PipelineConfig, PipelineError},
};

#[derive(FromArgs)]
/// Blur a PGM image and write its Sobel edge magnitude
struct Args {
    /// path to the input image, P2 or P5
    #[argh(positional)]
    input: PathBuf,

    /// path of the blurred output image
    #[argh(positional)]
    blur: PathBuf,

    /// path of the edge output image
    #[argh(positional)]
    edge: PathBuf,

    /// clamp edge magnitudes to 255 instead of keeping the low 8 bits
    #[argh(switch)]
    saturate: bool,

    /// run the filters on this many threads
    #[argh(option)]
    threads: Option<usize>,
}

fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let strategy = match args.threads {
        Some(n) => ExecutionStrategy::Fixed(n),
        None => ExecutionStrategy::Serial,
    };
    let narrowing = if args.saturate {
        MagnitudeNarrowing::Saturate
    } else {
        MagnitudeNarrowing::Wrap
    };
    let config = PipelineConfig::new()
        .with_strategy(strategy)
        .with_narrowing(narrowing);

    match process_image(&args.input, &args.blur, &args.edge, &config) {
        Ok(size) => {
            log::info!(
                "Wrote {} and {} ({})",
                args.blur.display(),
                args.edge.display(),
                size
            );
            ExitCode::SUCCESS
        }
        Err(err @ PipelineError::Write { .. }) => {
            log::error!("{err}");
            ExitCode::from(255)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
