// src/beam/painter.rs

//! Renders a beam as a soft gradient-filled rotated rectangle.

use super::Beam;
use crate::color::Hsla;
use crate::surface::{DrawingSurface, LinearGradient, RotatedRect};

const SATURATION: f64 = 0.9;
const LIGHTNESS: f64 = 0.65;

/// `(offset, alpha relative to the pulsing opacity)`: transparent at both ends,
/// brightest across the middle.
const GRADIENT_PROFILE: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.1, 0.5),
    (0.4, 1.0),
    (0.6, 1.0),
    (0.9, 0.5),
    (1.0, 0.0),
];

/// Base opacity modulated by the pulse phase and scaled by the intensity.
///
/// The pulse term stays within `[0.6, 1.0]`, so the result never exceeds
/// `opacity * intensity_factor`.
pub fn pulsing_opacity(beam: &Beam, intensity_factor: f64) -> f64 {
    beam.opacity * (0.8 + 0.2 * beam.pulse.sin()) * intensity_factor
}

/// Builds the six-stop gradient for `beam` at the given pulsing opacity.
pub fn beam_gradient(beam: &Beam, pulsing_opacity: f64) -> LinearGradient {
    let color = Hsla::new(beam.hue, SATURATION, LIGHTNESS, 0.0);
    let mut gradient = LinearGradient::new();
    for (offset, weight) in GRADIENT_PROFILE {
        gradient.add_color_stop(offset, color.with_alpha(weight * pulsing_opacity));
    }
    gradient
}

/// The rectangle a beam occupies.
pub fn beam_rect(beam: &Beam) -> RotatedRect {
    RotatedRect {
        x: beam.x,
        y: beam.y,
        angle_deg: beam.angle,
        width: beam.width,
        length: beam.length,
    }
}

/// Paints `beam` onto `surface`. Reads the beam only.
pub fn paint(surface: &mut dyn DrawingSurface, beam: &Beam, intensity_factor: f64) {
    let opacity = pulsing_opacity(beam, intensity_factor);
    let gradient = beam_gradient(beam, opacity);
    surface.fill_rotated_rect(&beam_rect(beam), &gradient);
}
