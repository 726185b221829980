//! Conversions between [`PixelBuffer`] and the `image` crate.
//!
//! Decoding and encoding stay with the caller; these conversions only move
//! already-decoded pixels across the boundary.

use image::{DynamicImage, GrayImage, RgbImage};

use super::{Channels, PixelBuffer};
use crate::error::{TransformError, TransformResult};

impl PixelBuffer {
    /// Create a buffer from an `image::RgbImage`.
    pub fn from_rgb_image(img: RgbImage) -> TransformResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, Channels::Rgb, img.into_raw())
    }

    /// Create a buffer from an `image::GrayImage`.
    pub fn from_gray_image(img: GrayImage) -> TransformResult<Self> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, Channels::Gray, img.into_raw())
    }

    /// Create a buffer from any decoded image.
    ///
    /// 8-bit grayscale stays single-channel. Everything else is converted to
    /// 8-bit RGB and any alpha channel is discarded.
    pub fn from_dynamic_image(img: DynamicImage) -> TransformResult<Self> {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray_image(gray),
            DynamicImage::ImageRgb8(rgb) => Self::from_rgb_image(rgb),
            other => Self::from_rgb_image(other.to_rgb8()),
        }
    }

    /// Convert to an `image::DynamicImage` for encoding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` for an empty buffer.
    pub fn to_dynamic_image(&self) -> TransformResult<DynamicImage> {
        let invalid = || TransformError::InvalidImage("buffer has no pixels".to_string());
        if self.is_empty() {
            return Err(invalid());
        }
        let data = self.as_bytes().to_vec();
        let img = match self.channels() {
            Channels::Gray => GrayImage::from_raw(self.width(), self.height(), data)
                .map(DynamicImage::ImageLuma8),
            Channels::Rgb => RgbImage::from_raw(self.width(), self.height(), data)
                .map(DynamicImage::ImageRgb8),
        };
        img.ok_or_else(invalid)
    }
}
