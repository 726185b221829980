//! Sobel edge detection.
//!
//! The source is first reduced to one grayscale channel with the plain
//! average `(r + g + b) / 3` (integer division, no luminance weighting).
//! Two 3x3 stencils then estimate the horizontal and vertical gradients,
//! sampling with [`BorderPolicy::Clamp`] so border pixels reuse their edge
//! neighbours:
//!
//! ```text
//!      -1 0 1          -1 -2 -1
//! Gx = -2 0 2     Gy =  0  0  0
//!      -1 0 1           1  2  1
//! ```
//!
//! The output pixel is `round(sqrt(gx² + gy²))` clamped to 255. The result
//! is always single-channel.

use tracing::{debug, info};

use super::{clamp_workers, ensure_loaded, promote, render};
use crate::buffer::{BorderPolicy, Channels, PixelBuffer};
use crate::config::{check_workers, WorkerLimits};
use crate::error::TransformResult;
use crate::parallel::PixelKernel;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Convert an image to a new single-channel buffer.
///
/// RGB pixels become `(r + g + b) / 3`; grayscale input is copied unchanged.
///
/// # Errors
///
/// - `InvalidImage` for an empty buffer.
/// - `AllocationFailure` if the grayscale buffer cannot be allocated.
pub fn to_grayscale(image: &PixelBuffer) -> TransformResult<PixelBuffer> {
    ensure_loaded(image, "grayscale conversion")?;

    let mut gray = PixelBuffer::allocate(image.width(), image.height(), Channels::Gray)?;
    match image.channels() {
        Channels::Gray => gray.as_bytes_mut().copy_from_slice(image.as_bytes()),
        Channels::Rgb => {
            for (dst, rgb) in gray
                .as_bytes_mut()
                .iter_mut()
                .zip(image.as_bytes().chunks_exact(3))
            {
                let sum = rgb[0] as u32 + rgb[1] as u32 + rgb[2] as u32;
                *dst = (sum / 3).min(255) as u8;
            }
        }
    }
    Ok(gray)
}

struct SobelKernel<'a> {
    gray: &'a PixelBuffer,
}

impl SobelKernel<'_> {
    #[inline]
    fn at(&self, x: i64, y: i64) -> i32 {
        BorderPolicy::Clamp
            .sample(self.gray, x, y, 0)
            .map_or(0, i32::from)
    }
}

impl PixelKernel for SobelKernel<'_> {
    fn render(&self, x: u32, y: u32, out: &mut [u8]) {
        let (mut gx, mut gy) = (0i32, 0i32);
        for ky in 0..3 {
            for kx in 0..3 {
                let p = self.at(x as i64 + kx as i64 - 1, y as i64 + ky as i64 - 1);
                gx += SOBEL_X[ky][kx] * p;
                gy += SOBEL_Y[ky][kx] * p;
            }
        }
        let magnitude = ((gx * gx + gy * gy) as f64).sqrt().round();
        out[0] = magnitude.min(255.0) as u8;
    }
}

/// Replace the image with its Sobel edge map.
///
/// The worker count is capped at the image height. On success the image
/// becomes single-channel with the same dimensions; on failure it is left
/// untouched.
///
/// # Errors
///
/// - `InvalidImage` if no image is loaded.
/// - `InvalidParameter` if `workers` is outside 1 to 64.
/// - `AllocationFailure`, `WorkerSpawnFailure` or `WorkerPanicked` from the
///   rendering step.
pub fn apply_edge_detection(image: &mut PixelBuffer, workers: usize) -> TransformResult<()> {
    ensure_loaded(image, "edge detection")?;
    check_workers("edge", workers, WorkerLimits::EDGE)?;

    let (width, height) = (image.width(), image.height());
    let workers = clamp_workers("edge", workers, height);
    debug!(
        width,
        height,
        channels = image.channels().count(),
        workers,
        "Applying Sobel edge detection"
    );

    let edges = {
        let gray = to_grayscale(image)?;
        let result = render(&SobelKernel { gray: &gray }, width, height, Channels::Gray, workers)?;
        gray.release();
        result
    };

    promote(image, edges);
    info!(width, height, workers, "Sobel edges applied");
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: Output is byte-identical for 1 and 8 workers.
        #[test]
        fn prop_sobel_deterministic(
            width in 1u32..=40,
            height in 1u32..=40,
            seed in any::<u64>(),
        ) {
            let data: Vec<u8> = (0..width * height)
                .map(|i| (seed.wrapping_mul(i as u64 + 1) >> 7) as u8)
                .collect();
            let base = PixelBuffer::from_raw(width, height, Channels::Gray, data).unwrap();

            let mut one = base.clone();
            apply_edge_detection(&mut one, 1).unwrap();
            let mut eight = base;
            apply_edge_detection(&mut eight, 8).unwrap();

            prop_assert_eq!(one, eight);
        }
    }
}
