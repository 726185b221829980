//! Gaussian blur by direct 2D convolution.

use tracing::{debug, info};

use super::{ensure_loaded, promote, render};
use crate::buffer::{BorderPolicy, PixelBuffer};
use crate::config::{check_workers, BlurParams, WorkerLimits};
use crate::error::{TransformError, TransformResult};
use crate::parallel::PixelKernel;

/// A normalized square Gaussian weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    size: usize,
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Generate a `size x size` kernel from the 2D Gaussian density.
    ///
    /// Each weight is `exp(-(dx² + dy²) / 2σ²) / 2πσ²` for the offset
    /// `(dx, dy)` from the centre, then the matrix is divided by its sum so
    /// the weights add up to 1.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `size` is even or zero, or `sigma` is
    /// not a positive number, and `AllocationFailure` if the matrix does not
    /// fit in memory.
    pub fn generate(size: usize, sigma: f32) -> TransformResult<Self> {
        BlurParams::new(size, sigma).validate()?;

        let centre = (size / 2) as i64;
        let sigma = sigma as f64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let norm = std::f64::consts::PI * two_sigma_sq;

        let len = size
            .checked_mul(size)
            .ok_or(TransformError::AllocationFailure { bytes: None })?;
        let mut density = reserve_weights::<f64>(len)?;
        for y in 0..size as i64 {
            for x in 0..size as i64 {
                let (dx, dy) = (x - centre, y - centre);
                let d2 = (dx * dx + dy * dy) as f64;
                density.push((-d2 / two_sigma_sq).exp() / norm);
            }
        }

        // The centre weight is always positive, so the sum is too
        let sum: f64 = density.iter().sum();
        let mut weights = reserve_weights::<f32>(len)?;
        weights.extend(density.iter().map(|w| (w / sum) as f32));

        Ok(Self { size, weights })
    }

    /// Side length of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight at column `x`, row `y` of the matrix.
    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f32 {
        self.weights[y * self.size + x]
    }

    /// Sum of all weights (1.0 up to rounding).
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Reserve room for `len` weights without aborting on exhaustion.
fn reserve_weights<T>(len: usize) -> TransformResult<Vec<T>> {
    let mut weights = Vec::new();
    weights
        .try_reserve_exact(len)
        .map_err(|_| TransformError::AllocationFailure {
            bytes: len.checked_mul(std::mem::size_of::<T>()),
        })?;
    Ok(weights)
}

struct BlurKernel<'a> {
    src: &'a PixelBuffer,
    kernel: &'a GaussianKernel,
}

impl PixelKernel for BlurKernel<'_> {
    fn render(&self, x: u32, y: u32, out: &mut [u8]) {
        let size = self.kernel.size();
        let radius = (size / 2) as i64;
        let (width, height) = (self.src.width(), self.src.height());

        for (c, value) in out.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for ky in 0..size {
                for kx in 0..size {
                    let px = x as i64 + kx as i64 - radius;
                    let py = y as i64 + ky as i64 - radius;
                    if let Some((sx, sy)) = BorderPolicy::Clamp.resolve(px, py, width, height) {
                        sum += self.src.get(sx, sy, c) as f32 * self.kernel.weight(kx, ky);
                    }
                }
            }
            *value = sum.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Blur the image with a Gaussian kernel.
///
/// Pixels near the border reuse edge pixels for the part of the kernel that
/// falls outside the image. Channel count and dimensions are preserved.
///
/// # Errors
///
/// - `InvalidImage` if no image is loaded.
/// - `InvalidParameter` for an even or zero kernel size, a non-positive
///   sigma, or a worker count outside 1 to 8.
/// - `AllocationFailure`, `WorkerSpawnFailure` or `WorkerPanicked` from the
///   rendering step.
pub fn apply_gaussian_blur(
    image: &mut PixelBuffer,
    params: BlurParams,
    workers: usize,
) -> TransformResult<()> {
    ensure_loaded(image, "gaussian blur")?;
    params.validate()?;
    check_workers("blur", workers, WorkerLimits::BLUR)?;

    let (width, height, channels) = (image.width(), image.height(), image.channels());
    debug!(
        width,
        height,
        channels = channels.count(),
        kernel_size = params.kernel_size,
        sigma = params.sigma,
        workers,
        "Applying gaussian blur"
    );

    let blurred = {
        let kernel = GaussianKernel::generate(params.kernel_size, params.sigma)?;
        let blur = BlurKernel {
            src: image,
            kernel: &kernel,
        };
        render(&blur, width, height, channels, workers)?
    };

    promote(image, blurred);
    info!(
        workers,
        kernel_size = params.kernel_size,
        sigma = params.sigma,
        channels = channels.label(),
        "Gaussian blur applied"
    );
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
