/// A square convolution kernel with integer weights and a normalization divisor.
///
/// The filtered value of a pixel is the weighted sum of its `N x N`
/// neighborhood divided by [`Kernel::divisor`] with truncating division.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Kernel<const N: usize> {
    weights: [[i32; N]; N],
    divisor: i32,
}

impl<const N: usize> Kernel<N> {
    /// Create a kernel from its weights and divisor.
    ///
    /// # Arguments
    ///
    /// * `weights` - The kernel weights, indexed `[row][col]`.
    /// * `divisor` - The normalization divisor, must be non-zero.
    pub const fn new(weights: [[i32; N]; N], divisor: i32) -> Self {
        assert!(N % 2 == 1, "kernel size must be odd");
        assert!(divisor != 0, "kernel divisor must be non-zero");
        Self { weights, divisor }
    }

    /// The kernel weights, indexed `[row][col]`.
    pub fn weights(&self) -> &[[i32; N]; N] {
        &self.weights
    }

    /// The normalization divisor.
    pub fn divisor(&self) -> i32 {
        self.divisor
    }

    /// Distance from the center to the kernel edge.
    pub const fn radius(&self) -> usize {
        N / 2
    }

    /// Sum of all weights.
    pub fn weight_sum(&self) -> i32 {
        self.weights.iter().flatten().sum()
    }
}

/// 5x5 Gaussian smoothing kernel, normalized by 159.
#[rustfmt::skip]
pub const GAUSSIAN_5X5: Kernel<5> = Kernel::new(
    [
        [2,  4,  5,  4, 2],
        [4,  9, 12,  9, 4],
        [5, 12, 15, 12, 5],
        [4,  9, 12,  9, 4],
        [2,  4,  5,  4, 2],
    ],
    159,
);

/// 3x3 Sobel kernel for the horizontal derivative.
#[rustfmt::skip]
pub const SOBEL_X_3X3: Kernel<3> = Kernel::new(
    [
        [-1, 0, 1],
        [-2, 0, 2],
        [-1, 0, 1],
    ],
    1,
);

/// 3x3 Sobel kernel for the vertical derivative.
#[rustfmt::skip]
pub const SOBEL_Y_3X3: Kernel<3> = Kernel::new(
    [
        [-1, -2, -1],
        [ 0,  0,  0],
        [ 1,  2,  1],
    ],
    1,
);
