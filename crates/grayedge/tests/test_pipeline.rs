use std::path::Path;

use grayedge::{
    batch::{run_batch, BatchConfig, BatchError},
    image::Image,
    imgproc::{filter::MagnitudeNarrowing, parallel::ExecutionStrategy},
    io::{pgm, IoError},
    pipeline::{process_image, PipelineConfig, PipelineError},
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn write_p5(path: &Path, image: &Image<u8>) -> std::io::Result<()> {
    let mut bytes = format!("P5\n{} {}\n255\n", image.width(), image.height()).into_bytes();
    bytes.extend_from_slice(image.as_slice());
    std::fs::write(path, bytes)
}

fn impulse_7x7() -> Result<Image<u8>, Box<dyn std::error::Error>> {
    let mut image = Image::from_size_val([7, 7].into(), 0u8)?;
    image.set([3, 3], 255)?;
    Ok(image)
}

#[test]
fn process_impulse_image() -> TestResult {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("impulse.pgm");
    let blur = tmp_dir.path().join("blur.pgm");
    let edge = tmp_dir.path().join("edge.pgm");
    write_p5(&input, &impulse_7x7()?)?;

    let size = process_image(&input, &blur, &edge, &PipelineConfig::default())?;
    assert_eq!((size.width, size.height), (7, 7));

    let blurred = pgm::read_image_pgm(&blur)?;
    #[rustfmt::skip]
    let expected_center: [u8; 25] = [
        3, 6, 8, 6, 3,
        6, 14, 19, 14, 6,
        8, 19, 24, 19, 8,
        6, 14, 19, 14, 6,
        3, 6, 8, 6, 3,
    ];
    for r in 0..5 {
        assert_eq!(&blurred.row(r + 1)[1..6], &expected_center[r * 5..r * 5 + 5]);
    }

    // outputs are always written as P2
    let edge_bytes = std::fs::read(&edge)?;
    assert!(edge_bytes.starts_with(b"P2\n7 7\n255\n"));

    let gradient = pgm::decode_image_pgm(&edge_bytes)?;
    assert!(gradient.row(0).iter().all(|&v| v == 0));
    assert!(gradient.row(6).iter().all(|&v| v == 0));
    assert!((0..7).all(|r| gradient.row(r)[0] == 0 && gradient.row(r)[6] == 0));
    assert_eq!(gradient.get([3, 3]), Some(&0));
    Ok(())
}

#[test]
fn strategies_produce_identical_files() -> TestResult {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("ramp.pgm");
    let data = (0..64 * 48).map(|i| ((i * 37) % 251) as u8).collect();
    write_p5(&input, &Image::new([64, 48].into(), data)?)?;

    let mut outputs = Vec::new();
    for (i, strategy) in [
        ExecutionStrategy::Serial,
        ExecutionStrategy::ParallelRows,
        ExecutionStrategy::Fixed(3),
    ]
    .into_iter()
    .enumerate()
    {
        let blur = tmp_dir.path().join(format!("blur_{i}.pgm"));
        let edge = tmp_dir.path().join(format!("edge_{i}.pgm"));
        let config = PipelineConfig::new()
            .with_strategy(strategy)
            .with_narrowing(MagnitudeNarrowing::Saturate);
        process_image(&input, &blur, &edge, &config)?;
        outputs.push((std::fs::read(blur)?, std::fs::read(edge)?));
    }

    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn missing_input_writes_nothing() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let blur = tmp_dir.path().join("blur.pgm");
    let edge = tmp_dir.path().join("edge.pgm");

    let res = process_image(
        tmp_dir.path().join("nope.pgm"),
        &blur,
        &edge,
        &PipelineConfig::default(),
    );

    assert!(matches!(
        res,
        Err(PipelineError::Open {
            source: IoError::FileDoesNotExist(_),
            ..
        })
    ));
    assert!(!blur.exists());
    assert!(!edge.exists());
}

#[test]
fn unsupported_input_is_a_decode_error() -> TestResult {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("color.pgm");
    std::fs::write(&input, b"P6\n2 2\n255\n")?;
    let blur = tmp_dir.path().join("blur.pgm");

    let res = process_image(
        &input,
        &blur,
        tmp_dir.path().join("edge.pgm"),
        &PipelineConfig::default(),
    );

    assert!(matches!(
        res,
        Err(PipelineError::Decode {
            source: IoError::UnsupportedFormat(_),
            ..
        })
    ));
    assert!(!blur.exists());
    Ok(())
}

#[test]
fn unwritable_output_is_a_write_error() -> TestResult {
    let tmp_dir = tempfile::tempdir()?;
    let input = tmp_dir.path().join("impulse.pgm");
    write_p5(&input, &impulse_7x7()?)?;
    let blur = tmp_dir.path().join("missing_dir").join("blur.pgm");

    let res = process_image(
        &input,
        &blur,
        tmp_dir.path().join("edge.pgm"),
        &PipelineConfig::default(),
    );

    match res {
        Err(PipelineError::Write { path, .. }) => assert_eq!(path, blur),
        other => panic!("expected a write error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn batch_processes_every_pgm_file() -> TestResult {
    let input_dir = tempfile::tempdir()?;
    let output_root = tempfile::tempdir()?;
    let output_dir = output_root.path().join("out");

    write_p5(&input_dir.path().join("b.pgm"), &impulse_7x7()?)?;
    pgm::write_image_pgm(input_dir.path().join("a.pgm"), &impulse_7x7()?)?;
    std::fs::write(input_dir.path().join("readme.txt"), b"not an image")?;

    let config = BatchConfig::default()
        .with_input_dir(input_dir.path())
        .with_output_dir(&output_dir);
    let report = run_batch(&config)?;

    assert_eq!(
        report.processed,
        vec![input_dir.path().join("a.pgm"), input_dir.path().join("b.pgm")]
    );
    assert!(report.skipped.is_empty());

    // P2 and P5 inputs of the same image give the same outputs
    for suffix in ["_blur.pgm", "_edge.pgm"] {
        let a = std::fs::read(output_dir.join(format!("a.pgm{suffix}")))?;
        let b = std::fs::read(output_dir.join(format!("b.pgm{suffix}")))?;
        assert_eq!(a, b);
    }
    assert!(!output_dir.join("readme.txt_blur.pgm").exists());
    Ok(())
}

#[test]
fn batch_stops_on_decode_failure() -> TestResult {
    let input_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;

    std::fs::write(input_dir.path().join("a.pgm"), b"P5\n4 4\n255\n\x01\x02")?;
    write_p5(&input_dir.path().join("b.pgm"), &impulse_7x7()?)?;

    let config = BatchConfig::default()
        .with_input_dir(input_dir.path())
        .with_output_dir(output_dir.path());
    let res = run_batch(&config);

    assert!(matches!(
        res,
        Err(BatchError::Pipeline(PipelineError::Decode {
            source: IoError::TruncatedData { expected: 16, found: 2 },
            ..
        }))
    ));
    assert!(!output_dir.path().join("b.pgm_blur.pgm").exists());
    Ok(())
}

#[test]
fn batch_missing_input_dir() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::default()
        .with_input_dir(tmp_dir.path().join("absent"))
        .with_output_dir(tmp_dir.path().join("out"));

    assert!(matches!(run_batch(&config), Err(BatchError::InputDir { .. })));
}
