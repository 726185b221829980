//! Bilinear resizing.
//!
//! Destination pixel `(x, y)` samples the source at
//! `(x * scale_x, y * scale_y)`, where `scale = (src - 1) / (dst - 1)` so the
//! first and last rows/columns of both images line up exactly. A side with a
//! single row or column uses a scale of 0.
//!
//! The four integer neighbours of the sample point are clamped to the source
//! independently on each axis, then blended along X on both rows and along Y
//! between the two results.

use tracing::{debug, info};

use super::{ensure_loaded, promote, render};
use crate::buffer::{BorderPolicy, PixelBuffer};
use crate::config::{check_workers, WorkerLimits};
use crate::error::{TransformError, TransformResult};
use crate::parallel::PixelKernel;

/// Source step per destination pixel along one axis.
fn axis_scale(src: u32, dst: u32) -> f64 {
    if src > 1 && dst > 1 {
        (src - 1) as f64 / (dst - 1) as f64
    } else {
        0.0
    }
}

struct ResizeKernel<'a> {
    src: &'a PixelBuffer,
    scale_x: f64,
    scale_y: f64,
}

impl PixelKernel for ResizeKernel<'_> {
    fn render(&self, x: u32, y: u32, out: &mut [u8]) {
        let src_x = self.scale_x * x as f64;
        let src_y = self.scale_y * y as f64;

        let Some(cell) =
            BorderPolicy::Clamp.resolve_cell(src_x, src_y, self.src.width(), self.src.height())
        else {
            return;
        };

        for (c, value) in out.iter_mut().enumerate() {
            *value = cell.interpolate(self.src, c).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Resize the image to exact dimensions with bilinear interpolation.
///
/// Channel count is preserved. Resizing to the current dimensions
/// reproduces the image exactly.
///
/// # Errors
///
/// - `InvalidImage` if no image is loaded.
/// - `InvalidParameter` for a zero target dimension or a worker count
///   outside 1 to 4.
/// - `AllocationFailure`, `WorkerSpawnFailure` or `WorkerPanicked` from the
///   rendering step.
pub fn apply_bilinear_resize(
    image: &mut PixelBuffer,
    new_width: u32,
    new_height: u32,
    workers: usize,
) -> TransformResult<()> {
    ensure_loaded(image, "resize")?;
    if new_width == 0 || new_height == 0 {
        return Err(TransformError::InvalidParameter(format!(
            "target size must be positive (got {new_width}x{new_height})"
        )));
    }
    check_workers("resize", workers, WorkerLimits::RESIZE)?;

    let (src_width, src_height, channels) = (image.width(), image.height(), image.channels());
    debug!(src_width, src_height, new_width, new_height, workers, "Applying bilinear resize");

    let resized = {
        let kernel = ResizeKernel {
            src: image,
            scale_x: axis_scale(src_width, new_width),
            scale_y: axis_scale(src_height, new_height),
        };
        render(&kernel, new_width, new_height, channels, workers)?
    };

    promote(image, resized);
    info!(
        workers,
        src_width,
        src_height,
        new_width,
        new_height,
        channels = channels.label(),
        "Bilinear resize applied"
    );
    Ok(())
}

/// Resize the image so its longest edge is at most `max_edge`, keeping the
/// aspect ratio. Images that already fit are left alone.
///
/// # Errors
///
/// Returns `InvalidParameter` if `max_edge` is zero, plus anything
/// [`apply_bilinear_resize`] reports.
pub fn resize_to_fit(
    image: &mut PixelBuffer,
    max_edge: u32,
    workers: usize,
) -> TransformResult<()> {
    ensure_loaded(image, "resize")?;
    if max_edge == 0 {
        return Err(TransformError::InvalidParameter(
            "max edge must be positive".to_string(),
        ));
    }

    let (width, height) = (image.width(), image.height());
    if width <= max_edge && height <= max_edge {
        return Ok(());
    }

    let (new_width, new_height) = fit_dimensions(width, height, max_edge);
    apply_bilinear_resize(image, new_width, new_height, workers)
}

/// Calculate dimensions that fit within `max_edge` while preserving the
/// aspect ratio. Neither side drops below 1.
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;

    /// RGB image whose red tracks the column and green tracks the row.
    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| [(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
            .collect();
        PixelBuffer::from_raw(width, height, Channels::Rgb, data).unwrap()
    }

    /// 2x2 RGB image; red and green differ per corner, blue is constant.
    fn corners() -> PixelBuffer {
        #[rustfmt::skip]
        let data = vec![
            0, 255, 7,     90, 165, 7,
            180, 75, 7,    255, 0, 7,
        ];
        PixelBuffer::from_raw(2, 2, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn test_axis_scale() {
        assert_eq!(axis_scale(2, 4), 1.0 / 3.0);
        assert_eq!(axis_scale(5, 5), 1.0);
        assert_eq!(axis_scale(1, 8), 0.0);
        assert_eq!(axis_scale(8, 1), 0.0);
    }

    #[test]
    fn test_resize_basic() {
        let mut img = gradient(100, 50);
        apply_bilinear_resize(&mut img, 50, 25, 4).unwrap();

        assert_eq!(img.width(), 50);
        assert_eq!(img.height(), 25);
        assert_eq!(img.byte_size(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions_is_identity() {
        let mut img = gradient(37, 21);
        let before = img.clone();
        apply_bilinear_resize(&mut img, 37, 21, 3).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_upscale_2x2_to_4x4() {
        let mut img = corners();
        apply_bilinear_resize(&mut img, 4, 4, 2).unwrap();

        // Corners map exactly onto the source corners
        assert_eq!(img.pixel(0, 0), &[0, 255, 7]);
        assert_eq!(img.pixel(3, 0), &[90, 165, 7]);
        assert_eq!(img.pixel(0, 3), &[180, 75, 7]);
        assert_eq!(img.pixel(3, 3), &[255, 0, 7]);

        // (1, 1) samples the source at (1/3, 1/3):
        // red: top = 30, bottom = 180 + 75/3 = 205, 30 + 175/3 = 88.33
        assert_eq!(img.get(1, 1, 0), 88);
        // (2, 2) samples at (2/3, 2/3): top = 60, bottom = 230, 60 + 170*2/3 = 173.33
        assert_eq!(img.get(2, 2, 0), 173);
        // (1, 0): 90 / 3 = 30
        assert_eq!(img.get(1, 0, 0), 30);
        // (3, 1): right column, 90 + (255 - 90) / 3 = 145
        assert_eq!(img.get(3, 1, 0), 145);
        // Green mirrors red: 255 - red
        assert_eq!(img.get(1, 1, 1), 167);
        // Constant channel stays constant
        assert!((0..4).all(|y| (0..4).all(|x| img.get(x, y, 2) == 7)));
    }

    #[test]
    fn test_upscale_2x2_to_3x3_centre() {
        let mut img = corners();
        apply_bilinear_resize(&mut img, 3, 3, 1).unwrap();

        // Centre samples (0.5, 0.5): top = 45, bottom = 217.5, 131.25
        assert_eq!(img.get(1, 1, 0), 131);
        // Edge midpoint (1, 0): halfway between 0 and 90
        assert_eq!(img.get(1, 0, 0), 45);
    }

    #[test]
    fn test_single_row_source() {
        let mut img = PixelBuffer::from_raw(3, 1, Channels::Gray, vec![10, 20, 30]).unwrap();
        apply_bilinear_resize(&mut img, 5, 3, 2).unwrap();

        assert_eq!(img.height(), 3);
        for y in 0..3 {
            assert_eq!(img.get(0, y, 0), 10);
            assert_eq!(img.get(2, y, 0), 20);
            assert_eq!(img.get(4, y, 0), 30);
        }
    }

    #[test]
    fn test_single_pixel_target() {
        let mut img = gradient(10, 10);
        let first = img.pixel(0, 0).to_vec();
        apply_bilinear_resize(&mut img, 1, 1, 1).unwrap();
        assert_eq!(img.pixel(0, 0), first.as_slice());
    }

    #[test]
    fn test_more_workers_than_rows() {
        let mut img = gradient(8, 8);
        let mut expected = img.clone();
        apply_bilinear_resize(&mut expected, 16, 2, 1).unwrap();
        apply_bilinear_resize(&mut img, 16, 2, 4).unwrap();
        assert_eq!(img, expected);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let mut img = gradient(100, 50);
        let before = img.clone();

        assert!(apply_bilinear_resize(&mut img, 0, 50, 2).is_err());
        assert!(apply_bilinear_resize(&mut img, 50, 0, 2).is_err());
        assert_eq!(img, before);
    }

    #[test]
    fn test_worker_range_enforced() {
        let mut img = gradient(10, 10);
        assert!(matches!(
            apply_bilinear_resize(&mut img, 5, 5, 5),
            Err(TransformError::InvalidParameter(_))
        ));
        assert!(apply_bilinear_resize(&mut img, 5, 5, 0).is_err());
    }

    #[test]
    fn test_allocation_failure_leaves_image_untouched() {
        let mut img = gradient(4, 4);
        let before = img.clone();

        let result = apply_bilinear_resize(&mut img, u32::MAX, u32::MAX, 4);

        assert!(matches!(
            result,
            Err(TransformError::AllocationFailure { .. })
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn test_resize_to_fit_landscape() {
        let mut img = gradient(600, 400);
        resize_to_fit(&mut img, 256, 4).unwrap();

        assert_eq!(img.width(), 256);
        assert_eq!(img.height(), 171); // 400 * (256/600) ≈ 170.67
    }

    #[test]
    fn test_resize_to_fit_already_smaller() {
        let mut img = gradient(100, 50);
        let before = img.clone();
        resize_to_fit(&mut img, 256, 4).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_resize_to_fit_zero_max_edge_error() {
        let mut img = gradient(100, 50);
        assert!(resize_to_fit(&mut img, 0, 1).is_err());
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(6000, 4000, 2560), (2560, 1707));
        assert_eq!(fit_dimensions(4000, 6000, 2560), (1707, 2560));
        assert_eq!(fit_dimensions(4000, 4000, 256), (256, 256));
        assert_eq!(fit_dimensions(10000, 1, 100), (100, 1));
        assert_eq!(fit_dimensions(0, 0, 256), (0, 0));
    }

    #[test]
    fn test_fit_dimensions_rounds_thin_side_up_to_one() {
        // 3 * (1 / 1000) rounds to 0 and is raised to 1
        assert_eq!(fit_dimensions(3, 1000, 1), (1, 1));
        assert_eq!(fit_dimensions(1000, 3, 1), (1, 1));
        // 2 / 1.5 = 1.33 rounds down, 4 / 2.5 = 1.6 rounds up
        assert_eq!(fit_dimensions(3, 2, 2), (2, 1));
        assert_eq!(fit_dimensions(5, 2, 4), (4, 2));
    }

    #[test]
    fn test_resize_to_fit_thin_strip() {
        let mut img = gradient(3, 1000);
        resize_to_fit(&mut img, 1, 1).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
        assert_eq!(img.pixel(0, 0), &[0, 0, 128]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
