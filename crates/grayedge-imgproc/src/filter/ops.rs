use grayedge_image::{Image, ImageError};

use super::kernels::{self, Kernel};
use crate::{
    error::FilterError,
    parallel::{self, ExecutionStrategy},
};

/// How a gradient magnitude larger than 255 is stored in an 8-bit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnitudeNarrowing {
    /// Keep the low 8 bits (modulo 256). Strong edges may wrap to dark values.
    #[default]
    Wrap,
    /// Clamp to 255.
    Saturate,
}

impl MagnitudeNarrowing {
    /// Narrow an integer magnitude to an 8-bit sample.
    pub fn narrow(self, magnitude: u32) -> u8 {
        match self {
            MagnitudeNarrowing::Wrap => magnitude as u8,
            MagnitudeNarrowing::Saturate => magnitude.min(u8::MAX as u32) as u8,
        }
    }
}

/// Euclidean norm of a gradient pair, truncated toward zero.
///
/// # Examples
///
/// ```
/// use grayedge_imgproc::filter::gradient_magnitude;
///
/// assert_eq!(gradient_magnitude(3, 4), 5);
/// assert_eq!(gradient_magnitude(2, 2), 2);
/// ```
pub fn gradient_magnitude(gx: i32, gy: i32) -> u32 {
    let sq = (gx as i64 * gx as i64 + gy as i64 * gy as i64) as f64;
    sq.sqrt() as u32
}

fn check_same_size<T, U>(src: &Image<T>, dst: &Image<U>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

// weighted sum of the neighborhood around (row, col); out of bounds samples count as zero
fn convolve_zero_padded<const N: usize>(
    src: &[u8],
    cols: usize,
    rows: usize,
    row: usize,
    col: usize,
    kernel: &Kernel<N>,
) -> i32 {
    let radius = kernel.radius();
    let mut acc = 0i32;

    for (ky, kernel_row) in kernel.weights().iter().enumerate() {
        let Some(y) = (row + ky).checked_sub(radius).filter(|&y| y < rows) else {
            continue;
        };
        let src_row = &src[y * cols..(y + 1) * cols];
        for (kx, &weight) in kernel_row.iter().enumerate() {
            let Some(x) = (col + kx).checked_sub(radius).filter(|&x| x < cols) else {
                continue;
            };
            acc += src_row[x] as i32 * weight;
        }
    }

    acc
}

/// Blur an image with the fixed 5x5 Gaussian kernel.
///
/// Every output pixel is written. Neighbors outside the image contribute zero,
/// so pixels near the border come out darker than a clamped blur would give.
/// The weighted sum is divided by 159 with truncating division.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `strategy` - How the rows are scheduled.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Examples
///
/// ```
/// use grayedge_image::Image;
/// use grayedge_imgproc::{filter::gaussian_blur_5x5, parallel::ExecutionStrategy};
///
/// let src = Image::from_size_val([8, 8].into(), 100u8).unwrap();
/// let mut dst = Image::from_size_val(src.size(), 0u8).unwrap();
///
/// gaussian_blur_5x5(&src, &mut dst, ExecutionStrategy::Serial).unwrap();
///
/// // the center is far enough from the border to see the full kernel
/// assert_eq!(dst.get([4, 4]), Some(&100));
/// ```
pub fn gaussian_blur_5x5(
    src: &Image<u8>,
    dst: &mut Image<u8>,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    check_same_size(src, dst)?;

    let kernel = &kernels::GAUSSIAN_5X5;
    let (cols, rows) = (src.cols(), src.rows());
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        for (c, dst_pixel) in dst_row.iter_mut().enumerate() {
            let acc = convolve_zero_padded(src_data, cols, rows, r, c, kernel);
            *dst_pixel = (acc / kernel.divisor()) as u8;
        }
    })?;

    Ok(())
}

/// Compute the Sobel gradient magnitude of an image.
///
/// Only interior pixels (`1 <= row < H - 1`, `1 <= col < W - 1`) are written.
/// The border of `dst` keeps whatever it held before the call, the filter never
/// reads outside the image.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W), usually the blurred image.
/// * `dst` - The destination image with shape (H, W).
/// * `narrowing` - How magnitudes above 255 are stored.
/// * `strategy` - How the rows are scheduled.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn sobel_magnitude_3x3(
    src: &Image<u8>,
    dst: &mut Image<u8>,
    narrowing: MagnitudeNarrowing,
    strategy: ExecutionStrategy,
) -> Result<(), FilterError> {
    check_same_size(src, dst)?;

    let (kernel_x, kernel_y) = (&kernels::SOBEL_X_3X3, &kernels::SOBEL_Y_3X3);
    let (cols, rows) = (src.cols(), src.rows());
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        if r == 0 || r + 1 >= rows {
            return;
        }
        for c in 1..cols.saturating_sub(1) {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for dy in 0..3 {
                let src_row = &src_data[(r + dy - 1) * cols..(r + dy) * cols];
                for dx in 0..3 {
                    let pix = src_row[c + dx - 1] as i32;
                    gx += pix * kernel_x.weights()[dy][dx];
                    gy += pix * kernel_y.weights()[dy][dx];
                }
            }
            dst_row[c] = narrowing.narrow(gradient_magnitude(gx, gy));
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grayedge_image::ImageSize;

    const STRATEGIES: [ExecutionStrategy; 3] = [
        ExecutionStrategy::Serial,
        ExecutionStrategy::ParallelRows,
        ExecutionStrategy::Fixed(3),
    ];

    #[test]
    fn test_blur_single_bright_pixel() -> Result<(), FilterError> {
        let size = ImageSize {
            width: 7,
            height: 7,
        };
        let mut src = Image::from_size_val(size, 0u8)?;
        src.set([3, 3], 255)?;

        let mut dst = Image::from_size_val(size, 0u8)?;
        gaussian_blur_5x5(&src, &mut dst, ExecutionStrategy::Serial)?;

        // 255 * w / 159 for w in {2, 4, 5, 9, 12, 15}
        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                0, 0,  0,  0,  0, 0, 0,
                0, 3,  6,  8,  6, 3, 0,
                0, 6, 14, 19, 14, 6, 0,
                0, 8, 19, 24, 19, 8, 0,
                0, 6, 14, 19, 14, 6, 0,
                0, 3,  6,  8,  6, 3, 0,
                0, 0,  0,  0,  0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_blur_zero_padding() -> Result<(), FilterError> {
        let size = [6, 6].into();
        let src = Image::from_size_val(size, 159u8)?;
        let mut dst = Image::from_size_val(size, 0u8)?;
        gaussian_blur_5x5(&src, &mut dst, ExecutionStrategy::Serial)?;

        // a corner sees only the lower right 3x3 of the kernel
        let corner: i32 = kernels::GAUSSIAN_5X5.weights()[2..]
            .iter()
            .map(|row| row[2..].iter().sum::<i32>())
            .sum();
        assert_eq!(corner, 68);
        assert_eq!(dst.get([0, 0]), Some(&68));
        assert_eq!(dst.get([5, 5]), Some(&68));

        // rows 2 and 3 are farther than the radius from both borders
        assert_eq!(dst.get([2, 2]), Some(&159));
        assert_eq!(dst.get([3, 3]), Some(&159));
        Ok(())
    }

    #[test]
    fn test_all_zero_input() -> Result<(), FilterError> {
        for size in [[5, 5], [9, 6], [33, 17]] {
            let size: ImageSize = size.into();
            let src = Image::from_size_val(size, 0u8)?;
            let mut blurred = Image::from_size_val(size, 1u8)?;
            let mut gradient = Image::from_size_val(size, 0u8)?;

            gaussian_blur_5x5(&src, &mut blurred, ExecutionStrategy::Serial)?;
            sobel_magnitude_3x3(
                &blurred,
                &mut gradient,
                MagnitudeNarrowing::Wrap,
                ExecutionStrategy::Serial,
            )?;

            assert!(blurred.as_slice().iter().all(|&p| p == 0));
            assert!(gradient.as_slice().iter().all(|&p| p == 0));
        }
        Ok(())
    }

    #[test]
    fn test_sobel_uniform_interior() -> Result<(), FilterError> {
        let size = [8, 6].into();
        let src = Image::from_size_val(size, 213u8)?;
        let mut dst = Image::from_size_val(size, 9u8)?;
        sobel_magnitude_3x3(
            &src,
            &mut dst,
            MagnitudeNarrowing::Wrap,
            ExecutionStrategy::Serial,
        )?;

        for r in 1..5 {
            for c in 1..7 {
                assert_eq!(dst.get([r, c]), Some(&0), "pixel ({r}, {c})");
            }
        }
        Ok(())
    }

    #[test]
    fn test_sobel_border_untouched() -> Result<(), FilterError> {
        let size: ImageSize = [6, 5].into();
        let src = Image::new(size, (0..30).map(|x| (x * 37 % 251) as u8).collect())?;
        let mut dst = Image::from_size_val(size, 77u8)?;
        sobel_magnitude_3x3(
            &src,
            &mut dst,
            MagnitudeNarrowing::Wrap,
            ExecutionStrategy::Serial,
        )?;

        for c in 0..size.width {
            assert_eq!(dst.get([0, c]), Some(&77));
            assert_eq!(dst.get([size.height - 1, c]), Some(&77));
        }
        for r in 0..size.height {
            assert_eq!(dst.get([r, 0]), Some(&77));
            assert_eq!(dst.get([r, size.width - 1]), Some(&77));
        }
        Ok(())
    }

    #[test]
    fn test_sobel_vertical_step() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let src = Image::new(
            [5, 5].into(),
            vec![
                0, 0, 100, 100, 100,
                0, 0, 100, 100, 100,
                0, 0, 100, 100, 100,
                0, 0, 100, 100, 100,
                0, 0, 100, 100, 100,
            ],
        )?;

        // gx = 4 * 100 = 400 on both sides of the step, gy = 0
        let mut wrapped = Image::from_size_val(src.size(), 0u8)?;
        sobel_magnitude_3x3(
            &src,
            &mut wrapped,
            MagnitudeNarrowing::Wrap,
            ExecutionStrategy::Serial,
        )?;
        assert_eq!(wrapped.row(2), &[0, 144, 144, 0, 0]);

        let mut saturated = Image::from_size_val(src.size(), 0u8)?;
        sobel_magnitude_3x3(
            &src,
            &mut saturated,
            MagnitudeNarrowing::Saturate,
            ExecutionStrategy::Serial,
        )?;
        assert_eq!(saturated.row(2), &[0, 255, 255, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_sobel_diagonal_response() -> Result<(), FilterError> {
        #[rustfmt::skip]
        let src = Image::new(
            [3, 3].into(),
            vec![
                0, 0, 0,
                0, 0, 1,
                0, 1, 1,
            ],
        )?;
        let mut dst = Image::from_size_val(src.size(), 0u8)?;
        sobel_magnitude_3x3(
            &src,
            &mut dst,
            MagnitudeNarrowing::Wrap,
            ExecutionStrategy::Serial,
        )?;
        // gx = 2 + 1 = 3, gy = 1 + 2 = 3, sqrt(18) = 4.24
        assert_eq!(dst.get([1, 1]), Some(&4));
        Ok(())
    }

    #[test]
    fn test_gradient_magnitude_truncates() {
        assert_eq!(gradient_magnitude(0, 0), 0);
        assert_eq!(gradient_magnitude(2, 2), 2);
        assert_eq!(gradient_magnitude(-3, 4), 5);
        assert_eq!(gradient_magnitude(1020, 1020), 1442);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(MagnitudeNarrowing::Wrap.narrow(255), 255);
        assert_eq!(MagnitudeNarrowing::Wrap.narrow(256), 0);
        assert_eq!(MagnitudeNarrowing::Wrap.narrow(1442), 162);
        assert_eq!(MagnitudeNarrowing::Saturate.narrow(1442), 255);
        assert_eq!(MagnitudeNarrowing::Saturate.narrow(17), 17);
        assert_eq!(MagnitudeNarrowing::default(), MagnitudeNarrowing::Wrap);
    }

    #[test]
    fn test_strategies_agree() -> Result<(), FilterError> {
        let size: ImageSize = [37, 23].into();
        let src = Image::new(
            size,
            (0..size.width * size.height)
                .map(|x| (x * 131 % 256) as u8)
                .collect(),
        )?;

        let mut expected_blur = Image::from_size_val(size, 0u8)?;
        let mut expected_edge = Image::from_size_val(size, 0u8)?;
        gaussian_blur_5x5(&src, &mut expected_blur, ExecutionStrategy::Serial)?;
        sobel_magnitude_3x3(
            &expected_blur,
            &mut expected_edge,
            MagnitudeNarrowing::Wrap,
            ExecutionStrategy::Serial,
        )?;

        for strategy in STRATEGIES {
            let mut blur = Image::from_size_val(size, 0u8)?;
            let mut edge = Image::from_size_val(size, 0u8)?;
            gaussian_blur_5x5(&src, &mut blur, strategy)?;
            sobel_magnitude_3x3(&blur, &mut edge, MagnitudeNarrowing::Wrap, strategy)?;
            assert_eq!(blur, expected_blur, "{strategy:?}");
            assert_eq!(edge, expected_edge, "{strategy:?}");
        }
        Ok(())
    }

    #[test]
    fn test_tiny_images() -> Result<(), FilterError> {
        for size in [[0, 0], [1, 1], [2, 1], [1, 4], [2, 2]] {
            let size: ImageSize = size.into();
            let src = Image::from_size_val(size, 200u8)?;
            let mut blur = Image::from_size_val(size, 0u8)?;
            let mut edge = Image::from_size_val(size, 5u8)?;
            gaussian_blur_5x5(&src, &mut blur, ExecutionStrategy::Serial)?;
            sobel_magnitude_3x3(
                &blur,
                &mut edge,
                MagnitudeNarrowing::Wrap,
                ExecutionStrategy::Serial,
            )?;
            // no interior pixels, nothing is written
            assert!(edge.as_slice().iter().all(|&p| p == 5));
        }
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), FilterError> {
        let src = Image::from_size_val([4, 4].into(), 0u8)?;
        let mut dst = Image::from_size_val([4, 5].into(), 0u8)?;
        let res = gaussian_blur_5x5(&src, &mut dst, ExecutionStrategy::Serial);
        assert!(matches!(
            res,
            Err(FilterError::ImageError(ImageError::InvalidImageSize(
                4, 4, 4, 5
            )))
        ));
        Ok(())
    }
}
