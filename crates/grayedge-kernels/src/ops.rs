use num_traits::Float;

use crate::{error::KernelError, simd::SimdBackend};

/// Shift every element and subtract a second vector, in place.
///
/// Computes `y[i] = y[i] - alpha + beta - z[i]` with a plain loop. This is the
/// reference the vectorized [`shifted_difference`] is checked against.
///
/// # Errors
///
/// If the lengths of the slices don't match, a `LengthMismatch` error is returned.
///
/// Example:
/// ```
/// use grayedge_kernels::ops::shifted_difference_scalar;
///
/// let mut y = [1.0f32, 2.0, 3.0];
/// let z = [0.5f32, 0.5, 0.5];
/// shifted_difference_scalar(&mut y, &z, 1.0, 2.0).unwrap();
/// assert_eq!(y, [1.5, 2.5, 3.5]);
/// ```
pub fn shifted_difference_scalar<T>(
    y: &mut [T],
    z: &[T],
    alpha: T,
    beta: T,
) -> Result<(), KernelError>
where
    T: Float,
{
    if y.len() != z.len() {
        return Err(KernelError::LengthMismatch(y.len(), z.len()));
    }

    y.iter_mut()
        .zip(z.iter())
        .for_each(|(y_i, &z_i)| *y_i = *y_i - alpha + beta - z_i);

    Ok(())
}

/// Vectorized [`shifted_difference_scalar`] for `f32`.
///
/// Runs four lanes at a time on the backend reported by
/// [`SimdBackend::detect_f32`]; leftover elements go through the scalar loop.
///
/// # Returns
///
/// The backend that executed the kernel.
pub fn shifted_difference(
    y: &mut [f32],
    z: &[f32],
    alpha: f32,
    beta: f32,
) -> Result<SimdBackend, KernelError> {
    if y.len() != z.len() {
        return Err(KernelError::LengthMismatch(y.len(), z.len()));
    }

    let backend = SimdBackend::detect_f32();
    match backend {
        #[cfg(target_arch = "x86_64")]
        SimdBackend::Sse => unsafe { crate::simd::x86::shifted_difference_sse(y, z, alpha, beta) },
        #[cfg(target_arch = "aarch64")]
        SimdBackend::Neon => unsafe {
            crate::simd::neon::shifted_difference_neon(y, z, alpha, beta)
        },
        _ => return shifted_difference_scalar(y, z, alpha, beta).map(|_| SimdBackend::Scalar),
    }

    Ok(backend)
}

/// Accumulate a weighted matrix-vector product into `w`.
///
/// For every row `i` of the row-major matrix `a` (`w.len()` rows, `x.len()`
/// columns) computes `w[i] += sum_j beta * x[j] + alpha * a[i][j] * x[j]`,
/// adding one term at a time. This is the reference for [`weighted_matvec`].
///
/// # Errors
///
/// Returns `LengthMismatch` if `a.len() != w.len() * x.len()`.
///
/// Example:
/// ```
/// use grayedge_kernels::ops::weighted_matvec_scalar;
///
/// let mut w = [0.0f64, 1.0];
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let x = [1.0, 1.0];
/// weighted_matvec_scalar(&mut w, &a, &x, 1.0, 0.0).unwrap();
/// assert_eq!(w, [3.0, 8.0]);
/// ```
pub fn weighted_matvec_scalar<T>(
    w: &mut [T],
    a: &[T],
    x: &[T],
    alpha: T,
    beta: T,
) -> Result<(), KernelError>
where
    T: Float,
{
    check_matrix_len(w, a, x)?;

    let cols = x.len();
    for (i, w_i) in w.iter_mut().enumerate() {
        let row = &a[i * cols..(i + 1) * cols];
        for (&a_ij, &x_j) in row.iter().zip(x.iter()) {
            *w_i = *w_i + beta * x_j + alpha * a_ij * x_j;
        }
    }

    Ok(())
}

/// Vectorized [`weighted_matvec_scalar`] for `f64`.
///
/// Each row is reduced in SIMD lanes and added to `w[i]` once, so results may
/// differ from the reference in the last bits.
///
/// # Returns
///
/// The backend that executed the kernel.
pub fn weighted_matvec(
    w: &mut [f64],
    a: &[f64],
    x: &[f64],
    alpha: f64,
    beta: f64,
) -> Result<SimdBackend, KernelError> {
    check_matrix_len(w, a, x)?;

    let backend = SimdBackend::detect_f64();
    match backend {
        #[cfg(target_arch = "x86_64")]
        SimdBackend::Avx => unsafe { crate::simd::x86::weighted_matvec_avx(w, a, x, alpha, beta) },
        #[cfg(target_arch = "aarch64")]
        SimdBackend::Neon => unsafe {
            crate::simd::neon::weighted_matvec_neon(w, a, x, alpha, beta)
        },
        _ => return weighted_matvec_scalar(w, a, x, alpha, beta).map(|_| SimdBackend::Scalar),
    }

    Ok(backend)
}

fn check_matrix_len<T>(w: &[T], a: &[T], x: &[T]) -> Result<(), KernelError> {
    let expected = w.len() * x.len();
    if a.len() != expected {
        return Err(KernelError::LengthMismatch(a.len(), expected));
    }
    Ok(())
}

/// Compare two results element-wise against an absolute tolerance.
///
/// # Errors
///
/// Returns `LengthMismatch` for slices of different length and
/// `ToleranceExceeded` for the first index where `|actual - expected| > tolerance`.
///
/// Example:
/// ```
/// use grayedge_kernels::{ops::check_close, KernelError};
///
/// assert!(check_close(&[1.0f32, 2.0], &[1.0, 2.0], 1e-6).is_ok());
/// assert!(matches!(
///     check_close(&[1.0f32, 2.5], &[1.0, 2.0], 1e-6),
///     Err(KernelError::ToleranceExceeded { index: 1, .. })
/// ));
/// ```
pub fn check_close<T>(actual: &[T], expected: &[T], tolerance: T) -> Result<(), KernelError>
where
    T: Float,
{
    if actual.len() != expected.len() {
        return Err(KernelError::LengthMismatch(actual.len(), expected.len()));
    }

    match actual
        .iter()
        .zip(expected.iter())
        .position(|(&a, &e)| !((a - e).abs() <= tolerance))
    {
        Some(index) => Err(KernelError::ToleranceExceeded {
            index,
            actual: actual[index].to_f64().unwrap_or(f64::NAN),
            expected: expected[index].to_f64().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}
