//! Owned pixel storage shared by every transform.

use tracing::trace;

use crate::error::{TransformError, TransformResult};

/// Number of interleaved 8-bit channels per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Channels {
    /// Single grayscale channel.
    #[default]
    Gray = 1,
    /// Red, green and blue, in that order.
    Rgb = 3,
}

impl Channels {
    /// Bytes per pixel.
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }

    /// Human-readable label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            Channels::Gray => "gray",
            Channels::Rgb => "rgb",
        }
    }
}

impl TryFrom<usize> for Channels {
    type Error = TransformError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            other => Err(TransformError::InvalidParameter(format!(
                "unsupported channel count {other} (expected 1 or 3)"
            ))),
        }
    }
}

/// A rectangular grid of 8-bit pixels stored in one contiguous allocation.
///
/// Pixel `(x, y)` channel `c` lives at `(y * width + x) * channels + c`.
/// Dimensions and channel count never change for the lifetime of a buffer;
/// transforms build a new buffer and [`replace`](Self::replace) the old one.
///
/// The `Default` buffer is empty (0x0) and stands for "no image loaded".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer.
    ///
    /// The allocation is a single step: either the whole buffer exists or
    /// nothing was allocated and [`TransformError::AllocationFailure`] is
    /// returned.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if either dimension is zero.
    /// - `AllocationFailure` if the byte size overflows or the allocator
    ///   refuses the request.
    pub fn allocate(width: u32, height: u32, channels: Channels) -> TransformResult<Self> {
        if width == 0 || height == 0 {
            return Err(TransformError::InvalidParameter(format!(
                "buffer dimensions must be positive (got {width}x{height})"
            )));
        }

        let len = byte_len(width, height, channels)
            .ok_or(TransformError::AllocationFailure { bytes: None })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| TransformError::AllocationFailure { bytes: Some(len) })?;
        data.resize(len, 0);

        trace!(width, height, channels = channels.count(), bytes = len, "allocated pixel buffer");

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap existing interleaved pixel data.
    ///
    /// # Errors
    ///
    /// - `InvalidImage` if either dimension is zero.
    /// - `InvalidParameter` if `data.len()` is not `width * height * channels`.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> TransformResult<Self> {
        if width == 0 || height == 0 {
            return Err(TransformError::InvalidImage(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        match byte_len(width, height, channels) {
            Some(len) if len == data.len() => Ok(Self {
                width,
                height,
                channels,
                data,
            }),
            expected => Err(TransformError::InvalidParameter(format!(
                "pixel data is {} bytes, expected {}",
                data.len(),
                expected.map_or_else(|| "an overflowing size".to_string(), |n| n.to_string())
            ))),
        }
    }

    /// Release a buffer that is no longer the live image.
    pub fn release(self) {
        trace!(
            width = self.width,
            height = self.height,
            bytes = self.data.len(),
            "released pixel buffer"
        );
        drop(self);
    }

    /// Swap `next` in as this buffer's contents and hand back the previous
    /// contents. Dimensions and channel count follow `next`.
    pub fn replace(&mut self, next: PixelBuffer) -> PixelBuffer {
        std::mem::replace(self, next)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Bytes in one row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channels.count()
    }

    /// Size of the pixel data in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Check if this is an empty buffer (no image loaded).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Channel values of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels.count();
        let idx = self.index(x, y);
        &self.data[idx..idx + channels]
    }

    /// A single channel of pixel `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.data[self.index(x, y) + channel]
    }

    /// Interleaved pixel data in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel data, used by the executor to hand out row bands.
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its pixel data.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }
}

fn byte_len(width: u32, height: u32, channels: Channels) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(channels.count())
        .filter(|&len| len <= isize::MAX as usize)
}
