// src/surface/mod.rs

//! Drawing surfaces the beam field paints onto.
//!
//! The `DrawingSurface` trait is the minimal set of canvas-style primitives the
//! field needs. Implementations:
//! - `PixelSurface`: RGBA8 software rasterizer.
//! - `RecordingSurface`: records every call as a `SurfaceCommand`.

pub mod pixel;
pub mod recording;

pub use pixel::{write_ppm, PixelSurface};
pub use recording::{CommandLog, RecordingSurface, SurfaceCommand};

use crate::color::Hsla;
use thiserror::Error;

/// Failure to obtain a usable surface from the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("No drawing surface available")]
    Unavailable,
    #[error("Drawing context unavailable: {0}")]
    ContextUnavailable(String),
}

/// A rectangle positioned by a translate-then-rotate transform.
///
/// In local coordinates the rectangle spans `[-width/2, width/2]` horizontally
/// and `[0, length]` vertically; the local origin maps to `(x, y)` and the
/// local axes are rotated clockwise by `angle_deg` (canvas convention, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub x: f64,
    pub y: f64,
    pub angle_deg: f64,
    pub width: f64,
    pub length: f64,
}

impl RotatedRect {
    /// Maps a point in the rectangle's local frame to surface coordinates.
    pub fn to_world(&self, u: f64, v: f64) -> (f64, f64) {
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        (self.x + u * cos - v * sin, self.y + u * sin + v * cos)
    }

    /// Maps a surface point into the rectangle's local frame.
    pub fn to_local(&self, px: f64, py: f64) -> (f64, f64) {
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let dx = px - self.x;
        let dy = py - self.y;
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }

    /// True if the surface point lies inside the rectangle.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let (u, v) = self.to_local(px, py);
        u.abs() <= self.width / 2.0 && (0.0..=self.length).contains(&v)
    }

    /// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` in surface coordinates.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let half = self.width / 2.0;
        let corners = [
            self.to_world(-half, 0.0),
            self.to_world(half, 0.0),
            self.to_world(-half, self.length),
            self.to_world(half, self.length),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}

/// One color stop of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient axis in `[0, 1]`.
    pub offset: f64,
    pub color: Hsla,
}

/// Linear gradient running along a rectangle's local length axis, from the
/// local origin (offset 0) to `(0, length)` (offset 1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearGradient {
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new() -> Self {
        Self { stops: Vec::new() }
    }

    /// Adds a stop. Stops are kept sorted by offset; equal offsets keep
    /// insertion order.
    pub fn add_color_stop(&mut self, offset: f64, color: Hsla) {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|stop| stop.offset <= offset);
        self.stops.insert(at, ColorStop { offset, color });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Straight-alpha RGBA (channels in `[0, 1]`) at position `t`.
    ///
    /// Interpolation happens in premultiplied space, as canvas does.
    pub fn sample(&self, t: f64) -> [f64; 4] {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0; 4],
        };
        if t <= first.offset {
            return first.color.to_rgb_f64();
        }
        if t >= last.offset {
            return last.color.to_rgb_f64();
        }

        let upper = self.stops.partition_point(|stop| stop.offset <= t);
        let lo = &self.stops[upper - 1];
        let hi = &self.stops[upper];
        let span = hi.offset - lo.offset;
        let f = if span > 0.0 { (t - lo.offset) / span } else { 1.0 };

        let a = premultiply(lo.color.to_rgb_f64());
        let b = premultiply(hi.color.to_rgb_f64());
        let mixed = [
            a[0] + (b[0] - a[0]) * f,
            a[1] + (b[1] - a[1]) * f,
            a[2] + (b[2] - a[2]) * f,
            a[3] + (b[3] - a[3]) * f,
        ];
        unpremultiply(mixed)
    }
}

fn premultiply([r, g, b, a]: [f64; 4]) -> [f64; 4] {
    [r * a, g * a, b * a, a]
}

fn unpremultiply([r, g, b, a]: [f64; 4]) -> [f64; 4] {
    if a <= 0.0 {
        return [0.0; 4];
    }
    [r / a, g / a, b / a, a]
}

/// Canvas-style drawing primitives.
///
/// Drawing calls never fail; a surface that cannot draw simply draws nothing.
pub trait DrawingSurface: Send {
    /// Reallocates the backing store to `width_px` x `height_px` device
    /// pixels. Clears the contents and resets the transform and filter.
    fn resize(&mut self, width_px: u32, height_px: u32);

    /// Sets a uniform scale applied to all subsequent drawing coordinates.
    fn set_scale(&mut self, scale: f64);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Sets the gaussian blur radius (in drawing coordinates) applied to every
    /// subsequent fill. Zero disables the filter.
    fn set_blur(&mut self, radius: f64);

    /// Fills `rect` with `gradient`.
    fn fill_rotated_rect(&mut self, rect: &RotatedRect, gradient: &LinearGradient);

    /// Backing store size in device pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Read access to straight-alpha RGBA8 pixels, if the surface has them.
    fn framebuffer(&self) -> Option<&[u8]> {
        None
    }
}
