// src/host/mod.rs

//! The boundary between the beam field and whatever embeds it.
//!
//! A `Host` measures the viewport, lends out a drawing surface and delivers
//! resize notifications to registered observers. The field owns the surface
//! between `activate` and `deactivate` and hands it back afterwards.

pub mod headless;

pub use headless::HeadlessHost;

use crate::surface::{DrawingSurface, SurfaceError};

/// Logical viewport size plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in logical pixels.
    pub width: f64,
    /// Height in logical pixels.
    pub height: f64,
    /// Device pixels per logical pixel (Retina = 2.0, standard = 1.0).
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Scale factor, falling back to 1.0 when the reported one is unusable.
    pub fn effective_scale(&self) -> f64 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }

    /// Backing store size in device pixels: `floor(logical * scale)`.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = self.effective_scale();
        let to_px = |logical: f64| {
            if logical.is_finite() && logical > 0.0 {
                (logical * scale).floor().min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        (to_px(self.width), to_px(self.height))
    }
}

/// Identifies one registered resize observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// Events delivered to registered observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    Resized(Viewport),
}

/// Environment the beam field is embedded in.
pub trait Host {
    /// Current viewport measurement.
    fn viewport(&self) -> Viewport;

    /// Lends the drawing surface to the caller.
    fn acquire_surface(&mut self) -> Result<Box<dyn DrawingSurface>, SurfaceError>;

    /// Returns a previously acquired surface.
    fn release_surface(&mut self, surface: Box<dyn DrawingSurface>);

    /// Registers interest in viewport resizes.
    fn observe_resize(&mut self) -> ObserverId;

    /// Removes a resize registration. Unknown ids are ignored.
    fn unobserve_resize(&mut self, id: ObserverId);
}
