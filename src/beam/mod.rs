// src/beam/mod.rs

//! The beam entity and the three stages that act on it.
//!
//! - `generator`: builds a beam with randomized initial attributes.
//! - `simulator`: advances a beam one frame and recycles it once it leaves
//!   the top of the surface.
//! - `painter`: turns a beam into a gradient-filled rotated rectangle.

pub mod generator;
pub mod painter;
pub mod simulator;

pub use generator::{create, populate};
pub use painter::{beam_gradient, paint, pulsing_opacity};
pub use simulator::{advance, banded_hue, reset, step};

/// Hue span covered by one population, in degrees.
pub const HUE_SPREAD: f64 = 70.0;

/// Distance past the top edge a beam travels before it is recycled, and the
/// distance below the bottom edge it reappears at.
pub const RECYCLE_MARGIN: f64 = 100.0;

/// Number of vertical columns beams are redistributed into on reset.
pub const RESET_COLUMNS: usize = 3;

/// A single light beam.
///
/// Coordinates are logical pixels with a top-left origin. `angle` is in
/// degrees; `pulse` is a phase in radians that only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
    pub angle: f64,
    pub speed: f64,
    pub opacity: f64,
    pub hue: f64,
    pub pulse: f64,
    pub pulse_speed: f64,
}

impl Beam {
    /// Y coordinate of the beam's far end before rotation.
    pub fn tail(&self) -> f64 {
        self.y + self.length
    }

    /// True once the beam has drifted past the top edge plus the margin.
    pub fn has_exited(&self) -> bool {
        self.tail() < -RECYCLE_MARGIN
    }
}

/// Surface dimensions and palette shared by every beam of one population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldGeometry {
    /// Viewport width in logical pixels.
    pub width: f64,
    /// Viewport height in logical pixels.
    pub height: f64,
    /// Base hue of the palette, in degrees.
    pub color_base: f64,
    /// Population size.
    pub total_beams: usize,
}

impl FieldGeometry {
    pub fn new(width: f64, height: f64, color_base: f64, total_beams: usize) -> Self {
        Self {
            width,
            height,
            color_base,
            total_beams,
        }
    }
}
