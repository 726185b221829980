//! Spatial raster transforms: edge detection, blur, resize and rotation.
//!
//! Every transform follows the same steps:
//! 1. Validate parameters and the live image
//! 2. Run its one-off preprocessing (grayscale copy, weight matrix,
//!    scale factors, trigonometry)
//! 3. Allocate a zeroed destination buffer
//! 4. Render it with [`parallel::run`](crate::parallel::run), one worker per
//!    row range
//! 5. Swap the result in as the live image and release the old buffer
//!
//! Any failure in steps 1 to 4 returns before step 5, so the caller's image
//! is never replaced by a partial result.
//!
//! # Coordinate System
//!
//! - Origin is the top-left pixel, `y` grows downward
//! - Rotation angles are in degrees; positive angles turn clockwise on screen

mod blur;
mod edge;
mod resize;
mod rotation;

pub use blur::{apply_gaussian_blur, GaussianKernel};
pub use edge::{apply_edge_detection, to_grayscale};
pub use resize::{apply_bilinear_resize, fit_dimensions, resize_to_fit};
pub use rotation::{
    apply_continuous_rotation, apply_quarter_rotation, apply_rotation, normalize_angle,
    rotated_extent, QuarterTurn,
};

use tracing::warn;

use crate::buffer::{Channels, PixelBuffer};
use crate::error::{TransformError, TransformResult};
use crate::parallel::{self, PixelKernel};

/// Reject an empty buffer before any work is done.
fn ensure_loaded(image: &PixelBuffer, transform: &str) -> TransformResult<()> {
    if image.is_empty() {
        return Err(TransformError::InvalidImage(format!(
            "no image loaded for {transform}"
        )));
    }
    Ok(())
}

/// Cap the worker count at the number of destination rows.
fn clamp_workers(transform: &str, workers: usize, height: u32) -> usize {
    let rows = height.max(1) as usize;
    if workers > rows {
        warn!(transform, requested = workers, rows, "more workers than rows, clamping");
        rows
    } else {
        workers
    }
}

/// Allocate a destination buffer and render `kernel` into it.
///
/// The buffer is dropped on every error path.
fn render<K: PixelKernel>(
    kernel: &K,
    width: u32,
    height: u32,
    channels: Channels,
    workers: usize,
) -> TransformResult<PixelBuffer> {
    let mut dst = PixelBuffer::allocate(width, height, channels)?;
    let ranges = parallel::partition(height, workers)?;
    parallel::run(kernel, &mut dst, &ranges)?;
    Ok(dst)
}

/// Make `result` the live image and release the previous one.
fn promote(image: &mut PixelBuffer, result: PixelBuffer) {
    image.replace(result).release();
}
