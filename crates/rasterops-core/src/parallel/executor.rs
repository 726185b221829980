//! Scoped worker threads over disjoint destination row bands.

use std::thread;

use tracing::{error, trace};

use super::RowRange;
use crate::buffer::PixelBuffer;
use crate::error::{TransformError, TransformResult};

/// A per-pixel mapping from destination coordinate to destination pixel.
///
/// Implementations borrow their source data immutably and hold whatever
/// parameters they precomputed. `render` receives the destination pixel's
/// channel slice, already zeroed; leaving it untouched keeps the pixel black.
pub trait PixelKernel: Sync {
    fn render(&self, x: u32, y: u32, out: &mut [u8]);
}

/// Run `kernel` over every pixel of `dst`, one thread per range.
///
/// `ranges` must be in order and tile `[0, dst.height())` without gaps or
/// overlaps, as produced by [`partition`](super::partition). Exactly
/// `ranges.len()` threads are spawned; empty ranges do no work.
///
/// All spawned threads are joined before this returns, including when a
/// later spawn fails.
///
/// # Errors
///
/// - `InvalidParameter` if the ranges do not tile the destination.
/// - `WorkerSpawnFailure` if a thread could not be started.
/// - `WorkerPanicked` if a worker panicked.
pub fn run<K>(kernel: &K, dst: &mut PixelBuffer, ranges: &[RowRange]) -> TransformResult<()>
where
    K: PixelKernel + ?Sized,
{
    run_with(kernel, dst, ranges, |index| {
        thread::Builder::new().name(format!("raster-worker-{index}"))
    })
}

/// [`run`] with the thread builder for each worker index supplied by `builder`.
fn run_with<K, B>(
    kernel: &K,
    dst: &mut PixelBuffer,
    ranges: &[RowRange],
    builder: B,
) -> TransformResult<()>
where
    K: PixelKernel + ?Sized,
    B: Fn(usize) -> thread::Builder,
{
    check_tiling(ranges, dst.height())?;

    let width = dst.width();
    let stride = dst.row_stride();
    let channels = dst.channels().count();

    let mut bands = Vec::with_capacity(ranges.len());
    let mut rest = dst.as_bytes_mut();
    for &range in ranges {
        let band_len = range.len() as usize * stride;
        let (band, tail) = std::mem::take(&mut rest).split_at_mut(band_len);
        bands.push((range, band));
        rest = tail;
    }

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(bands.len());
        let mut spawn_failure = None;

        for (index, (range, band)) in bands.into_iter().enumerate() {
            let spawned = builder(index).spawn_scoped(scope, move || {
                trace!(worker = index, start = range.start, end = range.end, "worker started");
                render_band(kernel, range, band, width, stride, channels);
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    error!(worker = index, error = %source, "failed to spawn worker");
                    spawn_failure = Some(TransformError::WorkerSpawnFailure { index, source });
                    break;
                }
            }
        }

        // Join everything that did start before reporting anything.
        let mut panicked = None;
        for (index, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                error!(worker = index, "worker panicked");
                panicked.get_or_insert(TransformError::WorkerPanicked { index });
            }
        }

        match spawn_failure.or(panicked) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

fn render_band<K>(
    kernel: &K,
    range: RowRange,
    band: &mut [u8],
    width: u32,
    stride: usize,
    channels: usize,
) where
    K: PixelKernel + ?Sized,
{
    if stride == 0 {
        return;
    }
    for (y, row) in range.rows().zip(band.chunks_exact_mut(stride)) {
        for (x, out) in (0..width).zip(row.chunks_exact_mut(channels)) {
            kernel.render(x, y, out);
        }
    }
}

fn check_tiling(ranges: &[RowRange], height: u32) -> TransformResult<()> {
    let mut next = 0;
    for range in ranges {
        if range.start != next || range.end < range.start {
            return Err(TransformError::InvalidParameter(format!(
                "row range {}..{} does not continue from row {next}",
                range.start, range.end
            )));
        }
        next = range.end;
    }
    if next != height {
        return Err(TransformError::InvalidParameter(format!(
            "row ranges cover {next} of {height} rows"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use crate::parallel::partition;

    /// Writes the coordinate into the pixel so ownership can be checked.
    struct CoordKernel;

    impl PixelKernel for CoordKernel {
        fn render(&self, x: u32, y: u32, out: &mut [u8]) {
            out[0] = x as u8;
            out[1] = y as u8;
            out[2] = 1;
        }
    }

    struct PanicKernel;

    impl PixelKernel for PanicKernel {
        fn render(&self, _x: u32, y: u32, _out: &mut [u8]) {
            if y == 5 {
                panic!("boom");
            }
        }
    }

    struct SkipKernel;

    impl PixelKernel for SkipKernel {
        fn render(&self, x: u32, _y: u32, out: &mut [u8]) {
            if x % 2 == 0 {
                out[0] = 9;
            }
        }
    }

    #[test]
    fn test_every_pixel_rendered_once() {
        let mut dst = PixelBuffer::allocate(6, 11, Channels::Rgb).unwrap();
        let ranges = partition(11, 3).unwrap();
        run(&CoordKernel, &mut dst, &ranges).unwrap();

        for y in 0..11 {
            for x in 0..6 {
                assert_eq!(dst.pixel(x, y), &[x as u8, y as u8, 1]);
            }
        }
    }

    #[test]
    fn test_idle_workers_are_harmless() {
        let mut dst = PixelBuffer::allocate(2, 3, Channels::Rgb).unwrap();
        let ranges = partition(3, 8).unwrap();
        run(&CoordKernel, &mut dst, &ranges).unwrap();
        assert_eq!(dst.pixel(1, 2), &[1, 2, 1]);
    }

    #[test]
    fn test_untouched_pixels_stay_zero() {
        let mut dst = PixelBuffer::allocate(4, 2, Channels::Gray).unwrap();
        run(&SkipKernel, &mut dst, &partition(2, 2).unwrap()).unwrap();
        assert_eq!(dst.as_bytes(), &[9, 0, 9, 0, 9, 0, 9, 0]);
    }

    #[test]
    fn test_rejects_gapped_ranges() {
        let mut dst = PixelBuffer::allocate(2, 4, Channels::Gray).unwrap();
        let ranges = [RowRange::new(0, 1), RowRange::new(2, 4)];
        assert!(matches!(
            run(&SkipKernel, &mut dst, &ranges),
            Err(TransformError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_short_ranges() {
        let mut dst = PixelBuffer::allocate(2, 4, Channels::Gray).unwrap();
        let ranges = [RowRange::new(0, 3)];
        assert!(run(&SkipKernel, &mut dst, &ranges).is_err());
    }

    /// Fills every channel with 7.
    struct FillKernel;

    impl PixelKernel for FillKernel {
        fn render(&self, _x: u32, _y: u32, out: &mut [u8]) {
            out.fill(7);
        }
    }

    #[test]
    fn test_spawn_failure_joins_started_workers() {
        let mut dst = PixelBuffer::allocate(3, 8, Channels::Gray).unwrap();
        let ranges = partition(8, 4).unwrap();

        // Workers 2 and 3 ask for more stack than the address space holds
        let result = run_with(&FillKernel, &mut dst, &ranges, |index| {
            let builder = thread::Builder::new();
            if index >= 2 {
                builder.stack_size(1usize << (usize::BITS - 2))
            } else {
                builder
            }
        });

        assert!(matches!(
            result,
            Err(TransformError::WorkerSpawnFailure { index: 2, .. })
        ));
        // Rows 0..4 belong to the workers that started and were joined
        let (started, skipped) = dst.as_bytes().split_at(4 * 3);
        assert!(started.iter().all(|&v| v == 7));
        assert!(skipped.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let mut dst = PixelBuffer::allocate(2, 8, Channels::Gray).unwrap();
        let result = run(&PanicKernel, &mut dst, &partition(8, 4).unwrap());
        // Rows 4..6 belong to worker 2
        assert!(matches!(
            result,
            Err(TransformError::WorkerPanicked { index: 2 })
        ));
    }
}
