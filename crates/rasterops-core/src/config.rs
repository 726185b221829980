//! Worker-count configuration and per-transform parameter types.
//!
//! Worker counts are validated once here, at the boundary, against the
//! ranges each transform accepts:
//!
//! | Transform      | Workers  |
//! |----------------|----------|
//! | Edge detection | 1 to 64  |
//! | Gaussian blur  | 1 to 8   |
//! | Resize         | 1 to 4   |
//! | Rotation       | 1 to 64  |

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};

/// Accepted worker counts for each transform.
pub struct WorkerLimits;

impl WorkerLimits {
    pub const EDGE: RangeInclusive<usize> = 1..=64;
    pub const BLUR: RangeInclusive<usize> = 1..=8;
    pub const RESIZE: RangeInclusive<usize> = 1..=4;
    pub const ROTATE: RangeInclusive<usize> = 1..=64;
}

/// Check a worker count against its allowed range.
pub(crate) fn check_workers(
    transform: &str,
    workers: usize,
    limits: RangeInclusive<usize>,
) -> TransformResult<()> {
    if limits.contains(&workers) {
        Ok(())
    } else {
        Err(TransformError::InvalidParameter(format!(
            "{transform} worker count must be between {} and {} (got {workers})",
            limits.start(),
            limits.end()
        )))
    }
}

/// Worker counts used by [`ImageSession`](crate::ImageSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Threads for Sobel edge detection (1 to 64)
    pub edge_workers: usize,
    /// Threads for Gaussian blur (1 to 8)
    pub blur_workers: usize,
    /// Threads for bilinear resize (1 to 4)
    pub resize_workers: usize,
    /// Threads for rotation (1 to 64)
    pub rotate_workers: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            edge_workers: 2,
            blur_workers: 4,
            resize_workers: 4,
            rotate_workers: 4,
        }
    }
}

impl TransformConfig {
    /// Create a config with default worker counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every worker count against [`WorkerLimits`].
    pub fn validate(&self) -> TransformResult<()> {
        check_workers("edge", self.edge_workers, WorkerLimits::EDGE)?;
        check_workers("blur", self.blur_workers, WorkerLimits::BLUR)?;
        check_workers("resize", self.resize_workers, WorkerLimits::RESIZE)?;
        check_workers("rotate", self.rotate_workers, WorkerLimits::ROTATE)
    }
}

/// Gaussian blur parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurParams {
    /// Side of the square kernel (odd, at least 1)
    pub kernel_size: usize,
    /// Standard deviation of the Gaussian (greater than 0)
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            sigma: 1.0,
        }
    }
}

impl BlurParams {
    pub fn new(kernel_size: usize, sigma: f32) -> Self {
        Self { kernel_size, sigma }
    }

    /// Reject even or zero kernel sizes and non-positive sigma.
    pub fn validate(&self) -> TransformResult<()> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(TransformError::InvalidParameter(format!(
                "kernel size must be odd and at least 1 (got {})",
                self.kernel_size
            )));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(TransformError::InvalidParameter(format!(
                "sigma must be a positive number (got {})",
                self.sigma
            )));
        }
        Ok(())
    }
}
