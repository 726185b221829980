//! Rasterops Core - Row-parallel raster transforms
//!
//! This crate applies spatial transforms to an in-memory bitmap:
//! Sobel edge detection, Gaussian blur, bilinear resize, and rotation
//! (continuous angles and exact quarter turns).
//!
//! Every transform reuses one skeleton: a zero-initialized destination
//! [`PixelBuffer`] is split into row bands, one scoped worker thread renders
//! each band from the shared read-only source, and the finished buffer
//! replaces the live image only after every worker has joined.
//!
//! Decoding and encoding image files is left to the caller; see
//! [`PixelBuffer::from_dynamic_image`] and [`PixelBuffer::to_dynamic_image`]
//! for moving pixels across the `image` crate boundary.

pub mod buffer;
pub mod config;
pub mod error;
pub mod parallel;
pub mod session;
pub mod transform;

pub use buffer::{BorderPolicy, Channels, PixelBuffer};
pub use config::{BlurParams, TransformConfig, WorkerLimits};
pub use error::{TransformError, TransformResult};
pub use session::ImageSession;
pub use transform::{
    apply_bilinear_resize, apply_continuous_rotation, apply_edge_detection, apply_gaussian_blur,
    apply_quarter_rotation, apply_rotation, to_grayscale,
};
