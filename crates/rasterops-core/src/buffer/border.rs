//! Border sampling policies.
//!
//! Stencils and interpolating samplers regularly ask for coordinates that
//! fall outside the source buffer. A [`BorderPolicy`] decides what happens:
//!
//! - **Clamp** replicates the nearest edge pixel. Used by edge detection,
//!   blur and resize.
//! - **Reject** reports the coordinate as outside, and the caller leaves the
//!   destination pixel at its zero (black) value. Used by rotation.

use super::PixelBuffer;

/// Rule for resolving a sample coordinate against a buffer's extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderPolicy {
    /// Clamp each axis into `[0, len - 1]`.
    Clamp,
    /// Refuse coordinates outside the buffer.
    Reject,
}

/// The 2x2 neighbourhood of a real-valued sample point.
///
/// `(x0, y0)` is the top-left integer neighbour, `(x1, y1)` the bottom-right,
/// and `fx`/`fy` the fractional weights toward the second neighbour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearCell {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub fx: f64,
    pub fy: f64,
}

impl BorderPolicy {
    /// Resolve an integer stencil coordinate.
    ///
    /// `Reject` returns `None` for anything outside `[0, width) x [0, height)`.
    #[inline]
    pub fn resolve(self, x: i64, y: i64, width: u32, height: u32) -> Option<(u32, u32)> {
        match self {
            BorderPolicy::Clamp => Some((clamp_axis(x, width), clamp_axis(y, height))),
            BorderPolicy::Reject => {
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    None
                } else {
                    Some((x as u32, y as u32))
                }
            }
        }
    }

    /// Resolve a real-valued coordinate to its bilinear neighbourhood.
    ///
    /// `Clamp` clamps each neighbour independently, so the right/bottom
    /// neighbour collapses onto the edge pixel on the last column/row.
    ///
    /// `Reject` keeps one unit of margin for the second neighbour: the point
    /// must satisfy `0 <= x < width - 1` and `0 <= y < height - 1`.
    pub fn resolve_cell(self, x: f64, y: f64, width: u32, height: u32) -> Option<BilinearCell> {
        match self {
            BorderPolicy::Clamp => {
                let (x0, x1, fx) = clamp_pair(x, width);
                let (y0, y1, fy) = clamp_pair(y, height);
                Some(BilinearCell {
                    x0,
                    y0,
                    x1,
                    y1,
                    fx,
                    fy,
                })
            }
            BorderPolicy::Reject => {
                let max_x = width as f64 - 1.0;
                let max_y = height as f64 - 1.0;
                if !(x >= 0.0 && x < max_x && y >= 0.0 && y < max_y) {
                    return None;
                }
                let x0 = x as u32;
                let y0 = y as u32;
                Some(BilinearCell {
                    x0,
                    y0,
                    x1: x0 + 1,
                    y1: y0 + 1,
                    fx: x - x0 as f64,
                    fy: y - y0 as f64,
                })
            }
        }
    }

    /// Read one channel of `buffer` at an integer coordinate, or `None` if
    /// the policy rejects it.
    #[inline]
    pub fn sample(self, buffer: &PixelBuffer, x: i64, y: i64, channel: usize) -> Option<u8> {
        self.resolve(x, y, buffer.width(), buffer.height())
            .map(|(sx, sy)| buffer.get(sx, sy, channel))
    }
}

impl BilinearCell {
    /// Blend one channel: along X on both rows, then along Y.
    #[inline]
    pub fn interpolate(&self, buffer: &PixelBuffer, channel: usize) -> f64 {
        let p00 = buffer.get(self.x0, self.y0, channel) as f64;
        let p10 = buffer.get(self.x1, self.y0, channel) as f64;
        let p01 = buffer.get(self.x0, self.y1, channel) as f64;
        let p11 = buffer.get(self.x1, self.y1, channel) as f64;

        let top = p00 + self.fx * (p10 - p00);
        let bottom = p01 + self.fx * (p11 - p01);
        top + self.fy * (bottom - top)
    }
}

#[inline]
fn clamp_axis(v: i64, len: u32) -> u32 {
    v.clamp(0, len as i64 - 1) as u32
}

fn clamp_pair(v: f64, len: u32) -> (u32, u32, f64) {
    let last = len.saturating_sub(1);
    let floor = v.floor();
    let i0 = if floor <= 0.0 {
        0
    } else if floor >= last as f64 {
        last
    } else {
        floor as u32
    };
    let i1 = (i0 + 1).min(last);
    let frac = (v - i0 as f64).clamp(0.0, 1.0);
    (i0, i1, frac)
}
