//! The live image and the configuration used to transform it.

use crate::buffer::PixelBuffer;
use crate::config::{BlurParams, TransformConfig};
use crate::error::TransformResult;
use crate::transform;

/// Holds the one "current image" and applies transforms to it in place.
///
/// Each method forwards to the matching function in [`transform`] with the
/// worker count from the session's [`TransformConfig`]. On error the current
/// image is unchanged.
#[derive(Debug, Clone, Default)]
pub struct ImageSession {
    image: PixelBuffer,
    config: TransformConfig,
}

impl ImageSession {
    /// Start a session with default worker counts.
    pub fn new(image: PixelBuffer) -> Self {
        Self {
            image,
            config: TransformConfig::default(),
        }
    }

    /// Start a session with a validated configuration.
    pub fn with_config(image: PixelBuffer, config: TransformConfig) -> TransformResult<Self> {
        config.validate()?;
        Ok(Self { image, config })
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Replace the current image, returning the previous one.
    pub fn load(&mut self, image: PixelBuffer) -> PixelBuffer {
        self.image.replace(image)
    }

    /// End the session and take the current image.
    pub fn into_image(self) -> PixelBuffer {
        self.image
    }

    pub fn edge_detect(&mut self) -> TransformResult<()> {
        transform::apply_edge_detection(&mut self.image, self.config.edge_workers)
    }

    pub fn gaussian_blur(&mut self, params: BlurParams) -> TransformResult<()> {
        transform::apply_gaussian_blur(&mut self.image, params, self.config.blur_workers)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> TransformResult<()> {
        transform::apply_bilinear_resize(
            &mut self.image,
            new_width,
            new_height,
            self.config.resize_workers,
        )
    }

    /// Shrink so the longest edge is at most `max_edge`.
    pub fn resize_to_fit(&mut self, max_edge: u32) -> TransformResult<()> {
        transform::resize_to_fit(&mut self.image, max_edge, self.config.resize_workers)
    }

    /// Rotate by any angle; quarter turns are exact.
    pub fn rotate(&mut self, angle_degrees: f64) -> TransformResult<()> {
        transform::apply_rotation(&mut self.image, angle_degrees, self.config.rotate_workers)
    }

    /// Rotate by the nearest quarter turn, rejecting other angles.
    pub fn rotate_quarter(&mut self, angle_degrees: f64) -> TransformResult<()> {
        let workers = self.config.rotate_workers;
        transform::apply_quarter_rotation(&mut self.image, angle_degrees, workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use crate::error::TransformError;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend([(x * 10) as u8, (y * 10) as u8, 50]);
            }
        }
        PixelBuffer::from_raw(width, height, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn test_pipeline_of_transforms() {
        let mut session = ImageSession::new(gradient(12, 8));

        session.gaussian_blur(BlurParams::new(3, 1.0)).unwrap();
        session.resize(24, 16).unwrap();
        session.rotate(90.0).unwrap();
        assert_eq!((session.image().width(), session.image().height()), (16, 24));

        session.edge_detect().unwrap();
        let image = session.into_image();
        assert_eq!(image.channels(), Channels::Gray);
        assert_eq!((image.width(), image.height()), (16, 24));
    }

    #[test]
    fn test_failed_transform_keeps_image() {
        let mut session = ImageSession::new(gradient(6, 6));
        let before = session.image().clone();

        assert!(session.gaussian_blur(BlurParams::new(2, 1.0)).is_err());
        assert!(session.resize(0, 3).is_err());
        assert!(session.rotate_quarter(10.0).is_err());

        assert_eq!(session.image(), &before);
    }

    #[test]
    fn test_empty_session_reports_invalid_image() {
        let mut session = ImageSession::default();
        assert!(matches!(
            session.edge_detect(),
            Err(TransformError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_with_config_validates() {
        let config = TransformConfig {
            blur_workers: 20,
            ..Default::default()
        };
        assert!(ImageSession::with_config(gradient(2, 2), config).is_err());

        let config = TransformConfig {
            blur_workers: 8,
            ..Default::default()
        };
        assert!(ImageSession::with_config(gradient(2, 2), config).is_ok());
    }

    #[test]
    fn test_resize_to_fit_keeps_aspect() {
        let mut session = ImageSession::new(gradient(20, 10));
        session.resize_to_fit(8).unwrap();
        assert_eq!((session.image().width(), session.image().height()), (8, 4));
    }

    #[test]
    fn test_load_returns_previous_image() {
        let mut session = ImageSession::new(gradient(2, 2));
        let old = session.load(gradient(3, 1));
        assert_eq!(old.width(), 2);
        assert_eq!(session.image().width(), 3);
    }
}
