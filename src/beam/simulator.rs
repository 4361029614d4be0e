// src/beam/simulator.rs

//! Per-frame beam motion and the recycling rule.
//!
//! Beams are mutated in place. A beam that exits is reset at the same index,
//! so steady-state animation never allocates.

use super::{Beam, FieldGeometry, HUE_SPREAD, RECYCLE_MARGIN, RESET_COLUMNS};
use crate::random::RandomSource;
use log::trace;

const RESET_WIDTH_RANGE: (f64, f64) = (100.0, 200.0);
const RESET_SPEED_RANGE: (f64, f64) = (0.5, 0.9);
const RESET_OPACITY_RANGE: (f64, f64) = (0.25, 0.40);
/// Horizontal jitter around a column's center, as a fraction of column width.
const COLUMN_JITTER: f64 = 0.25;

/// Advances `beam` by one frame. Returns `true` if the beam was recycled.
pub fn advance(
    beam: &mut Beam,
    index: usize,
    geometry: &FieldGeometry,
    rng: &mut dyn RandomSource,
) -> bool {
    beam.y -= beam.speed;
    beam.pulse += beam.pulse_speed;

    if beam.has_exited() {
        reset(beam, index, geometry, rng);
        return true;
    }
    false
}

/// Advances every beam in population order. Returns the number recycled.
pub fn step(beams: &mut [Beam], geometry: &FieldGeometry, rng: &mut dyn RandomSource) -> usize {
    let mut recycled = 0;
    for (index, beam) in beams.iter_mut().enumerate() {
        if advance(beam, index, geometry, rng) {
            recycled += 1;
        }
    }
    recycled
}

/// Moves `beam` back below the bottom edge into its column.
///
/// `angle`, `length`, `pulse` and `pulse_speed` are left untouched. The hue is
/// a pure function of the index, the population size and the palette.
/// Samples are drawn in a fixed order: jitter, width, speed, opacity.
pub fn reset(beam: &mut Beam, index: usize, geometry: &FieldGeometry, rng: &mut dyn RandomSource) {
    let column = (index % RESET_COLUMNS) as f64;
    let spacing = geometry.width.max(0.0) / RESET_COLUMNS as f64;
    let jitter = rng.uniform(-spacing * COLUMN_JITTER, spacing * COLUMN_JITTER);

    beam.y = geometry.height + RECYCLE_MARGIN;
    beam.x = column * spacing + spacing / 2.0 + jitter;
    beam.width = rng.uniform(RESET_WIDTH_RANGE.0, RESET_WIDTH_RANGE.1);
    beam.speed = rng.uniform(RESET_SPEED_RANGE.0, RESET_SPEED_RANGE.1);
    beam.hue = banded_hue(geometry.color_base, index, geometry.total_beams);
    beam.opacity = rng.uniform(RESET_OPACITY_RANGE.0, RESET_OPACITY_RANGE.1);

    trace!(
        "simulator: reset beam {} into column {} at x={:.1}",
        index,
        column,
        beam.x
    );
}

/// Hue assigned to the beam at `index` after a reset.
pub fn banded_hue(color_base: f64, index: usize, total_beams: usize) -> f64 {
    if total_beams == 0 {
        return color_base;
    }
    color_base + (index as f64 * HUE_SPREAD) / total_beams as f64
}
