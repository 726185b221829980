//! Image rotation: continuous angles with bilinear interpolation, and exact
//! quarter turns.
//!
//! # Continuous rotation
//!
//! The canvas grows to the bounding box of the four rotated source corners.
//! Rotation uses inverse mapping: for each destination pixel, relative to
//! the destination centre, the transposed rotation matrix gives the source
//! position relative to the source centre:
//!
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```
//!
//! Positions without a full 2x2 neighbourhood inside the source are
//! rejected and stay black.
//!
//! # Quarter turns
//!
//! Angles that are whole multiples of 90° map every destination pixel to
//! exactly one source pixel, so no interpolation or border handling is
//! involved and the result is lossless.

use tracing::{debug, error, info};

use super::{clamp_workers, ensure_loaded, promote, render};
use crate::buffer::{BorderPolicy, PixelBuffer};
use crate::config::{check_workers, WorkerLimits};
use crate::error::{TransformError, TransformResult};
use crate::parallel::PixelKernel;

/// A rotation by a whole multiple of 90°, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    /// 0°: pixels are copied unchanged.
    Identity,
    /// 90° clockwise.
    Cw90,
    /// 180°.
    Half,
    /// 270° clockwise (90° counter-clockwise).
    Cw270,
}

impl QuarterTurn {
    /// Snap an angle to a quarter turn.
    ///
    /// The angle is rounded to the nearest whole degree; that value must be a
    /// multiple of 90. Returns `None` otherwise, and for non-finite input.
    pub fn from_degrees(angle_degrees: f64) -> Option<Self> {
        if !angle_degrees.is_finite() {
            return None;
        }
        let degrees = angle_degrees.round();
        if degrees % 90.0 != 0.0 {
            return None;
        }
        match (degrees / 90.0).rem_euclid(4.0) as u8 {
            0 => Some(QuarterTurn::Identity),
            1 => Some(QuarterTurn::Cw90),
            2 => Some(QuarterTurn::Half),
            3 => Some(QuarterTurn::Cw270),
            _ => None,
        }
    }

    /// The turn in degrees, in `[0, 360)`.
    pub fn degrees(self) -> u32 {
        match self {
            QuarterTurn::Identity => 0,
            QuarterTurn::Cw90 => 90,
            QuarterTurn::Half => 180,
            QuarterTurn::Cw270 => 270,
        }
    }

    /// Returns true if this turn swaps width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, QuarterTurn::Cw90 | QuarterTurn::Cw270)
    }

    /// Destination dimensions for a `width x height` source.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    let angle = angle_degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Compute the canvas size for a continuous rotation.
///
/// The four corner pixel centres are rotated about the source centre and the
/// destination is the bounding box of the result, truncated to whole pixels.
/// Dimensions never drop below 1.
pub fn rotated_extent(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let radians = normalize_angle(angle_degrees).to_radians();
    let (sin, cos) = radians.sin_cos();
    extent_for(width, height, cos, sin)
}

fn extent_for(width: u32, height: u32, cos: f64, sin: f64) -> (u32, u32) {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let corners = [
        (0.0, 0.0),
        (width as f64 - 1.0, 0.0),
        (width as f64 - 1.0, height as f64 - 1.0),
        (0.0, height as f64 - 1.0),
    ];

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in corners {
        let (x, y) = (x - cx, y - cy);
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }

    let new_width = (max_x - min_x + 1.0) as u32;
    let new_height = (max_y - min_y + 1.0) as u32;
    (new_width.max(1), new_height.max(1))
}

struct RotateKernel<'a> {
    src: &'a PixelBuffer,
    cos: f64,
    sin: f64,
    src_cx: f64,
    src_cy: f64,
    dst_cx: f64,
    dst_cy: f64,
}

impl PixelKernel for RotateKernel<'_> {
    fn render(&self, x: u32, y: u32, out: &mut [u8]) {
        // Translate destination point to origin at centre
        let dx = x as f64 - self.dst_cx;
        let dy = y as f64 - self.dst_cy;

        // Apply inverse rotation to find source coordinates
        let src_x = dx * self.cos + dy * self.sin + self.src_cx;
        let src_y = -dx * self.sin + dy * self.cos + self.src_cy;

        let Some(cell) =
            BorderPolicy::Reject.resolve_cell(src_x, src_y, self.src.width(), self.src.height())
        else {
            return;
        };

        for (c, value) in out.iter_mut().enumerate() {
            // Inputs are bytes, so the blend never leaves [0, 255]
            *value = (cell.interpolate(self.src, c) + 0.5) as u8;
        }
    }
}

struct QuarterKernel<'a> {
    src: &'a PixelBuffer,
    turn: QuarterTurn,
}

impl PixelKernel for QuarterKernel<'_> {
    fn render(&self, x: u32, y: u32, out: &mut [u8]) {
        let (w, h) = (self.src.width(), self.src.height());
        let (sx, sy) = match self.turn {
            QuarterTurn::Identity => (x, y),
            QuarterTurn::Cw90 => (y, h - 1 - x),
            QuarterTurn::Half => (w - 1 - x, h - 1 - y),
            QuarterTurn::Cw270 => (w - 1 - y, x),
        };
        out.copy_from_slice(self.src.pixel(sx, sy));
    }
}

/// Rotate the image by any angle, choosing the kernel from the angle.
///
/// An angle whose normalized value is exactly 0, 90, 180 or 270 uses the
/// lossless quarter-turn kernel; every other angle uses the continuous
/// bilinear kernel and expands the canvas.
///
/// # Errors
///
/// - `InvalidImage` if no image is loaded.
/// - `InvalidParameter` for a non-finite angle or a worker count outside
///   1 to 64.
/// - `AllocationFailure`, `WorkerSpawnFailure` or `WorkerPanicked` from the
///   rendering step.
pub fn apply_rotation(
    image: &mut PixelBuffer,
    angle_degrees: f64,
    workers: usize,
) -> TransformResult<()> {
    check_angle(angle_degrees)?;
    let normalized = normalize_angle(angle_degrees);

    if normalized % 90.0 == 0.0 {
        let turn = QuarterTurn::from_degrees(normalized).ok_or_else(|| {
            TransformError::InvalidParameter(format!("unsupported angle {angle_degrees}"))
        })?;
        rotate_quarter(image, turn, workers)
    } else {
        apply_continuous_rotation(image, angle_degrees, workers)
    }
}

/// Rotate the image by an arbitrary angle with bilinear interpolation.
///
/// The angle is normalized into `[0, 360)`. The canvas becomes the bounding
/// box of the rotated corners, and areas not covered by the source are
/// black. Channel count is preserved.
///
/// # Errors
///
/// Same as [`apply_rotation`].
pub fn apply_continuous_rotation(
    image: &mut PixelBuffer,
    angle_degrees: f64,
    workers: usize,
) -> TransformResult<()> {
    ensure_loaded(image, "rotation")?;
    check_angle(angle_degrees)?;
    check_workers("rotate", workers, WorkerLimits::ROTATE)?;

    let angle = normalize_angle(angle_degrees);
    let (sin, cos) = angle.to_radians().sin_cos();

    let (src_w, src_h, channels) = (image.width(), image.height(), image.channels());
    let (dst_w, dst_h) = extent_for(src_w, src_h, cos, sin);
    let workers = clamp_workers("rotate", workers, dst_h);
    debug!(angle, src_w, src_h, dst_w, dst_h, workers, "Applying continuous rotation");

    let rotated = {
        // Pivots sit on whole pixels: the source centre is truncated and the
        // destination centre uses integer halving
        let kernel = RotateKernel {
            src: image,
            cos,
            sin,
            src_cx: ((src_w - 1) / 2) as f64,
            src_cy: ((src_h - 1) / 2) as f64,
            dst_cx: (dst_w / 2) as f64,
            dst_cy: (dst_h / 2) as f64,
        };
        render(&kernel, dst_w, dst_h, channels, workers)?
    };

    promote(image, rotated);
    info!(angle, dst_w, dst_h, workers, channels = channels.label(), "Image rotated");
    Ok(())
}

/// Rotate the image by the quarter turn nearest to `angle_degrees`.
///
/// The angle is rounded to a whole degree and must then be a multiple of 90;
/// anything else is rejected and the image is left untouched.
///
/// # Errors
///
/// Same as [`apply_rotation`], plus `InvalidParameter` for an angle that
/// does not snap to a quarter turn.
pub fn apply_quarter_rotation(
    image: &mut PixelBuffer,
    angle_degrees: f64,
    workers: usize,
) -> TransformResult<()> {
    let Some(turn) = QuarterTurn::from_degrees(angle_degrees) else {
        error!(angle = angle_degrees, "angle is not a multiple of 90 degrees");
        return Err(TransformError::InvalidParameter(format!(
            "angle {angle_degrees} is not a multiple of 90 degrees"
        )));
    };
    rotate_quarter(image, turn, workers)
}

fn rotate_quarter(
    image: &mut PixelBuffer,
    turn: QuarterTurn,
    workers: usize,
) -> TransformResult<()> {
    ensure_loaded(image, "rotation")?;
    check_workers("rotate", workers, WorkerLimits::ROTATE)?;

    let (src_w, src_h, channels) = (image.width(), image.height(), image.channels());
    let (dst_w, dst_h) = turn.output_dimensions(src_w, src_h);
    let workers = clamp_workers("rotate", workers, dst_h);
    debug!(degrees = turn.degrees(), src_w, src_h, dst_w, dst_h, workers, "Applying quarter turn");

    let rotated = {
        let kernel = QuarterKernel { src: image, turn };
        render(&kernel, dst_w, dst_h, channels, workers)?
    };

    promote(image, rotated);
    info!(degrees = turn.degrees(), dst_w, dst_h, workers, "Image rotated");
    Ok(())
}

fn check_angle(angle_degrees: f64) -> TransformResult<()> {
    if angle_degrees.is_finite() {
        Ok(())
    } else {
        error!(angle = angle_degrees, "rotation angle is not finite");
        Err(TransformError::InvalidParameter(format!(
            "rotation angle must be finite (got {angle_degrees})"
        )))
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
