/// The instruction set a dispatched kernel runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdBackend {
    /// Portable scalar loop.
    Scalar,
    /// x86_64 SSE, four `f32` lanes.
    Sse,
    /// x86_64 AVX, four `f64` lanes.
    Avx,
    /// aarch64 NEON, four `f32` or two `f64` lanes.
    Neon,
}

impl std::fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            SimdBackend::Scalar => "scalar",
            SimdBackend::Sse => "sse",
            SimdBackend::Avx => "avx",
            SimdBackend::Neon => "neon",
        };
        write!(f, "{name}")
    }
}

impl SimdBackend {
    /// Backend used for single precision kernels on this machine.
    pub fn detect_f32() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            // SSE is part of the x86_64 baseline
            SimdBackend::Sse
        }
        #[cfg(target_arch = "aarch64")]
        {
            SimdBackend::Neon
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            SimdBackend::Scalar
        }
    }

    /// Backend used for double precision kernels on this machine.
    pub fn detect_f64() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx") {
                SimdBackend::Avx
            } else {
                SimdBackend::Scalar
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            SimdBackend::Neon
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            SimdBackend::Scalar
        }
    }
}

#[cfg(target_arch = "x86_64")]
pub(crate) mod x86 {
    use std::arch::x86_64::*;

    /// PRECONDITION: `y.len() == z.len()`.
    pub(crate) unsafe fn shifted_difference_sse(y: &mut [f32], z: &[f32], alpha: f32, beta: f32) {
        let len = y.len();
        let body = len - len % 4;
        let vec_alpha = _mm_set1_ps(alpha);
        let vec_beta = _mm_set1_ps(beta);

        let mut i = 0;
        while i < body {
            let vec_y = _mm_loadu_ps(y.as_ptr().add(i));
            let vec_z = _mm_loadu_ps(z.as_ptr().add(i));
            // same association as the scalar loop: ((y - alpha) + beta) - z
            let result = _mm_sub_ps(_mm_add_ps(_mm_sub_ps(vec_y, vec_alpha), vec_beta), vec_z);
            _mm_storeu_ps(y.as_mut_ptr().add(i), result);
            i += 4;
        }

        for j in body..len {
            y[j] = y[j] - alpha + beta - z[j];
        }
    }

    /// PRECONDITION: `a.len() == w.len() * x.len()`.
    #[target_feature(enable = "avx")]
    pub(crate) unsafe fn weighted_matvec_avx(
        w: &mut [f64],
        a: &[f64],
        x: &[f64],
        alpha: f64,
        beta: f64,
    ) {
        let cols = x.len();
        let body = cols - cols % 4;
        let vec_alpha = _mm256_set1_pd(alpha);
        let vec_beta = _mm256_set1_pd(beta);

        for (i, w_i) in w.iter_mut().enumerate() {
            let row = &a[i * cols..(i + 1) * cols];
            let mut acc = _mm256_setzero_pd();

            let mut j = 0;
            while j < body {
                let vec_x = _mm256_loadu_pd(x.as_ptr().add(j));
                let vec_a = _mm256_loadu_pd(row.as_ptr().add(j));
                let mul1 = _mm256_mul_pd(vec_beta, vec_x);
                let mul2 = _mm256_mul_pd(vec_alpha, _mm256_mul_pd(vec_a, vec_x));
                acc = _mm256_add_pd(acc, _mm256_add_pd(mul1, mul2));
                j += 4;
            }

            let mut lanes = [0.0f64; 4];
            _mm256_storeu_pd(lanes.as_mut_ptr(), acc);
            let mut sum = lanes[0] + lanes[1] + lanes[2] + lanes[3];

            for k in body..cols {
                sum += beta * x[k] + alpha * (row[k] * x[k]);
            }
            *w_i += sum;
        }
    }
}

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon {
    use std::arch::aarch64::*;

    /// PRECONDITION: `y.len() == z.len()`.
    pub(crate) unsafe fn shifted_difference_neon(y: &mut [f32], z: &[f32], alpha: f32, beta: f32) {
        let len = y.len();
        let body = len - len % 4;
        let vec_alpha = vdupq_n_f32(alpha);
        let vec_beta = vdupq_n_f32(beta);

        let mut i = 0;
        while i < body {
            let vec_y = vld1q_f32(y.as_ptr().add(i));
            let vec_z = vld1q_f32(z.as_ptr().add(i));
            let result = vsubq_f32(vaddq_f32(vsubq_f32(vec_y, vec_alpha), vec_beta), vec_z);
            vst1q_f32(y.as_mut_ptr().add(i), result);
            i += 4;
        }

        for j in body..len {
            y[j] = y[j] - alpha + beta - z[j];
        }
    }

    /// PRECONDITION: `a.len() == w.len() * x.len()`.
    pub(crate) unsafe fn weighted_matvec_neon(
        w: &mut [f64],
        a: &[f64],
        x: &[f64],
        alpha: f64,
        beta: f64,
    ) {
        let cols = x.len();
        let body = cols - cols % 2;
        let vec_alpha = vdupq_n_f64(alpha);
        let vec_beta = vdupq_n_f64(beta);

        for (i, w_i) in w.iter_mut().enumerate() {
            let row = &a[i * cols..(i + 1) * cols];
            let mut acc = vdupq_n_f64(0.0);

            let mut j = 0;
            while j < body {
                let vec_x = vld1q_f64(x.as_ptr().add(j));
                let vec_a = vld1q_f64(row.as_ptr().add(j));
                let mul1 = vmulq_f64(vec_beta, vec_x);
                let mul2 = vmulq_f64(vec_alpha, vmulq_f64(vec_a, vec_x));
                acc = vaddq_f64(acc, vaddq_f64(mul1, mul2));
                j += 2;
            }

            let mut sum = vaddvq_f64(acc);
            for k in body..cols {
                sum += beta * x[k] + alpha * (row[k] * x[k]);
            }
            *w_i += sum;
        }
    }
}
