use std::{collections::TryReserveError, time::Instant};

use argh::FromArgs;
use grayedge::kernels::ops;

const ALPHA: f32 = 0.023;
const BETA: f32 = 0.045;
const TOLERANCE: f64 = 1e-6;

#[derive(FromArgs)]
/// Time the vectorized kernels and check them against the scalar loops
struct Args {
    /// length of the vectors of the shifted difference
    #[argh(positional, default = "524288")]
    m: usize,

    /// dimension of the square matrix of the weighted product
    #[argh(positional, default = "8192")]
    n: usize,
}

fn filled<T>(len: usize, f: impl Fn(usize) -> T) -> Result<Vec<T>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.extend((0..len).map(f));
    Ok(v)
}

fn check_shifted_difference(m: usize) -> Result<(), Box<dyn std::error::Error>> {
    let z = filled(m, |i| (i % 9) as f32 - 0.08)?;
    let mut y_ref = filled(m, |i| (i % 19) as f32 + 0.07)?;
    let mut y = y_ref.clone();

    let start = Instant::now();
    ops::shifted_difference_scalar(&mut y_ref, &z, ALPHA, BETA)?;
    let scalar = start.elapsed();

    let start = Instant::now();
    let backend = ops::shifted_difference(&mut y, &z, ALPHA, BETA)?;
    let simd = start.elapsed();

    log::info!("shifted_difference m={m}: scalar {scalar:?}, {backend} {simd:?}");
    ops::check_close(&y, &y_ref, TOLERANCE as f32)?;
    Ok(())
}

fn check_weighted_matvec(n: usize) -> Result<(), Box<dyn std::error::Error>> {
    let len = n.checked_mul(n).ok_or("matrix size overflows")?;
    let a = filled(len, |k| (k / n % 99) as f64 + (k % n % 14) as f64 + 0.013)?;
    let x = filled(n, |j| (j % 19) as f64 - 0.01)?;
    let mut w_ref = filled(n, |i| (i % 5) as f64 - 0.002)?;
    let mut w = w_ref.clone();

    let start = Instant::now();
    ops::weighted_matvec_scalar(&mut w_ref, &a, &x, ALPHA as f64, BETA as f64)?;
    let scalar = start.elapsed();

    let start = Instant::now();
    let backend = ops::weighted_matvec(&mut w, &a, &x, ALPHA as f64, BETA as f64)?;
    let simd = start.elapsed();

    log::info!("weighted_matvec n={n}: scalar {scalar:?}, {backend} {simd:?}");
    ops::check_close(&w, &w_ref, TOLERANCE)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    check_shifted_difference(args.m)?;
    check_weighted_matvec(args.n)?;

    log::info!("vectorized kernels match the scalar reference");
    Ok(())
}
