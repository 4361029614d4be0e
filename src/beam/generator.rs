// src/beam/generator.rs

//! Creates beams with randomized starting attributes.

use super::{Beam, HUE_SPREAD};
use crate::random::RandomSource;
use std::f64::consts::TAU;

/// How far beyond each viewport edge a beam may originate, as a fraction of
/// the viewport dimension.
const SPAWN_OVERSCAN: f64 = 0.25;
const LENGTH_FACTOR: f64 = 2.5;
/// Heights below this are treated as this, keeping `length` positive.
const MIN_HEIGHT: f64 = 1.0;

const WIDTH_RANGE: (f64, f64) = (30.0, 90.0);
const ANGLE_RANGE: (f64, f64) = (-35.0, -25.0);
const SPEED_RANGE: (f64, f64) = (0.6, 1.8);
const OPACITY_RANGE: (f64, f64) = (0.15, 0.35);
const PULSE_SPEED_RANGE: (f64, f64) = (0.02, 0.05);

/// Builds a beam for a `width` x `height` surface.
///
/// Samples are drawn in a fixed order: x, y, width, angle, speed, opacity,
/// hue, pulse, pulse speed.
pub fn create(width: f64, height: f64, color_base: f64, rng: &mut dyn RandomSource) -> Beam {
    let width = width.max(0.0);
    let height = height.max(0.0);

    let x = rng.uniform(-width * SPAWN_OVERSCAN, width * (1.0 + SPAWN_OVERSCAN));
    let y = rng.uniform(-height * SPAWN_OVERSCAN, height * (1.0 + SPAWN_OVERSCAN));

    Beam {
        x,
        y,
        width: rng.uniform(WIDTH_RANGE.0, WIDTH_RANGE.1),
        length: height.max(MIN_HEIGHT) * LENGTH_FACTOR,
        angle: rng.uniform(ANGLE_RANGE.0, ANGLE_RANGE.1),
        speed: rng.uniform(SPEED_RANGE.0, SPEED_RANGE.1),
        opacity: rng.uniform(OPACITY_RANGE.0, OPACITY_RANGE.1),
        hue: color_base + rng.uniform(0.0, HUE_SPREAD),
        pulse: rng.uniform(0.0, TAU),
        pulse_speed: rng.uniform(PULSE_SPEED_RANGE.0, PULSE_SPEED_RANGE.1),
    }
}

/// Builds a whole population of `count` beams.
pub fn populate(
    count: usize,
    width: f64,
    height: f64,
    color_base: f64,
    rng: &mut dyn RandomSource,
) -> Vec<Beam> {
    (0..count)
        .map(|_| create(width, height, color_base, rng))
        .collect()
}
