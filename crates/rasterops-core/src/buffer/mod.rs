//! Pixel storage and border handling.
//!
//! This module provides:
//! - [`PixelBuffer`], a single contiguous zero-initialized allocation that
//!   every transform reads from and writes into
//! - [`BorderPolicy`], the rule for sampling outside a buffer's extent
//! - Conversions to and from the `image` crate's buffer types
//!
//! # Layout
//!
//! Pixels are interleaved and row-major. Rows are `width * channels` bytes
//! with no padding, which lets the executor hand each worker an exclusive
//! `&mut [u8]` band of whole rows.

mod border;
mod convert;
mod types;

pub use border::{BilinearCell, BorderPolicy};
pub use types::{Channels, PixelBuffer};
