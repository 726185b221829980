//! Splitting destination rows across workers.

use crate::error::{TransformError, TransformResult};

/// A half-open span `[start, end)` of destination rows owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "row range start after end");
        Self { start, end }
    }

    /// Number of rows in the range.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Iterate over the row indices in the range.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.start..self.end
    }
}

/// Split `height` rows into `workers` contiguous ranges.
///
/// Each worker gets `ceil(height / workers)` rows except the last non-empty
/// one, which gets the remainder. When `workers > height` the trailing
/// workers receive empty ranges positioned at `height`. The ranges are in
/// order and their union is exactly `[0, height)`.
///
/// A `workers` of zero is treated as one.
///
/// # Errors
///
/// Returns `AllocationFailure` if the range list itself cannot be allocated.
pub fn partition(height: u32, workers: usize) -> TransformResult<Vec<RowRange>> {
    let workers = workers.max(1);
    let rows_per_worker = (height as usize).div_ceil(workers);

    let mut ranges = Vec::new();
    ranges.try_reserve_exact(workers).map_err(|_| TransformError::AllocationFailure {
        bytes: workers.checked_mul(std::mem::size_of::<RowRange>()),
    })?;

    let height = height as usize;
    ranges.extend((0..workers).map(|i| {
        let start = i.saturating_mul(rows_per_worker).min(height) as u32;
        let end = (i + 1).saturating_mul(rows_per_worker).min(height) as u32;
        RowRange::new(start, end)
    }));
    Ok(ranges)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
