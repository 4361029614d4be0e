// src/surface/pixel.rs

//! Software rasterizer backing a `DrawingSurface` with an RGBA8 framebuffer.
//!
//! Each fill is rasterized into a premultiplied scratch layer covering the
//! shape's bounds (grown by the blur reach), blurred with three box passes per
//! axis to approximate a gaussian, then composited source-over onto the
//! framebuffer.

use super::{DrawingSurface, LinearGradient, RotatedRect};
use crate::color::Rgba;
use anyhow::{Context, Result};
use log::{debug, trace};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const BYTES_PER_PIXEL: usize = 4;
const BLUR_PASSES: usize = 3;
const GRADIENT_LUT_SIZE: usize = 256;

/// Pixel rectangle in device space, half-open on the max side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Region {
    fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }

    fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    fn intersect(&self, other: &Region) -> Region {
        Region {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

pub struct PixelSurface {
    width_px: u32,
    height_px: u32,
    scale: f64,
    blur_radius: f64,
    framebuffer: Box<[u8]>,
    /// Premultiplied scratch layer reused across fills.
    layer: Vec<[f32; 4]>,
    /// Row/column scratch for the blur passes.
    line: Vec<[f32; 4]>,
    /// Premultiplied gradient samples for the fill in progress.
    lut: Vec<[f32; 4]>,
}

impl PixelSurface {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        let mut surface = Self {
            width_px: 0,
            height_px: 0,
            scale: 1.0,
            blur_radius: 0.0,
            framebuffer: Box::new([]),
            layer: Vec::new(),
            line: Vec::new(),
            lut: Vec::with_capacity(GRADIENT_LUT_SIZE),
        };
        surface.resize(width_px, height_px);
        surface
    }

    /// Pixel at `(x, y)` in device coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let idx = (y as usize * self.width_px as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.framebuffer[idx..idx + BYTES_PER_PIXEL];
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn blur_radius(&self) -> f64 {
        self.blur_radius
    }

    /// Writes the framebuffer composited over black as a binary PPM (P6).
    pub fn write_ppm(&self, path: &Path) -> Result<()> {
        write_ppm(path, self.width_px, self.height_px, &self.framebuffer)
    }

    fn bounds_region(&self) -> Region {
        Region {
            x0: 0,
            y0: 0,
            x1: self.width_px as i64,
            y1: self.height_px as i64,
        }
    }

    /// Box radius whose three passes approximate a gaussian of `sigma`.
    fn box_radius(sigma: f64) -> usize {
        if !(sigma > 0.0) {
            return 0;
        }
        (((4.0 * sigma * sigma + 1.0).sqrt() - 1.0) / 2.0).round() as usize
    }

    fn rasterize(&mut self, rect: &RotatedRect, gradient: &LinearGradient, region: &Region) {
        let w = region.width();
        let h = region.height();
        self.layer.clear();
        self.layer.resize(w * h, [0.0; 4]);

        self.lut.clear();
        self.lut.extend((0..GRADIENT_LUT_SIZE).map(|i| {
            let [r, g, b, a] = gradient.sample(i as f64 / (GRADIENT_LUT_SIZE - 1) as f64);
            [(r * a) as f32, (g * a) as f32, (b * a) as f32, a as f32]
        }));

        for row in 0..h {
            let py = (region.y0 + row as i64) as f64 + 0.5;
            for col in 0..w {
                let px = (region.x0 + col as i64) as f64 + 0.5;
                let (u, v) = rect.to_local(px, py);
                if u.abs() > rect.width / 2.0 || v < 0.0 || v > rect.length {
                    continue;
                }
                let t = if rect.length > 0.0 { v / rect.length } else { 0.0 };
                let slot = (t * (GRADIENT_LUT_SIZE - 1) as f64).round() as usize;
                self.layer[row * w + col] = self.lut[slot.min(GRADIENT_LUT_SIZE - 1)];
            }
        }
    }

    fn blur_layer(&mut self, w: usize, h: usize, radius: usize) {
        for _ in 0..BLUR_PASSES {
            for row in 0..h {
                self.line.clear();
                self.line
                    .extend_from_slice(&self.layer[row * w..(row + 1) * w]);
                box_blur_line(&self.line, radius, |i, value| {
                    self.layer[row * w + i] = value;
                });
            }
            for col in 0..w {
                self.line.clear();
                self.line.extend((0..h).map(|row| self.layer[row * w + col]));
                box_blur_line(&self.line, radius, |i, value| {
                    self.layer[i * w + col] = value;
                });
            }
        }
    }

    fn composite(&mut self, layer_region: &Region, target: &Region) {
        let lw = layer_region.width();
        let fb_w = self.width_px as usize;
        for y in target.y0..target.y1 {
            let ly = (y - layer_region.y0) as usize;
            for x in target.x0..target.x1 {
                let lx = (x - layer_region.x0) as usize;
                let [sr, sg, sb, sa] = self.layer[ly * lw + lx];
                if sa <= 0.0 {
                    continue;
                }
                let idx = (y as usize * fb_w + x as usize) * BYTES_PER_PIXEL;
                let dst = &mut self.framebuffer[idx..idx + BYTES_PER_PIXEL];
                source_over(dst, [sr, sg, sb, sa.min(1.0)]);
            }
        }
    }
}

/// Blends a premultiplied source onto a straight-alpha RGBA8 destination.
fn source_over(dst: &mut [u8], [sr, sg, sb, sa]: [f32; 4]) {
    let da = dst[3] as f32 / 255.0;
    let inv = 1.0 - sa;
    let out_a = sa + da * inv;
    if out_a <= 0.0 {
        return;
    }
    let channel = |src: f32, d: u8| {
        let premul = src + (d as f32 / 255.0) * da * inv;
        ((premul / out_a) * 255.0).round().clamp(0.0, 255.0) as u8
    };
    dst[0] = channel(sr, dst[0]);
    dst[1] = channel(sg, dst[1]);
    dst[2] = channel(sb, dst[2]);
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// One box pass over `input`; samples outside the line count as transparent.
fn box_blur_line(input: &[[f32; 4]], radius: usize, mut emit: impl FnMut(usize, [f32; 4])) {
    let n = input.len();
    let window = (2 * radius + 1) as f32;
    let mut sum = [0.0f32; 4];
    for value in input.iter().take(radius.min(n)) {
        add(&mut sum, value);
    }
    for i in 0..n {
        if i + radius < n {
            add(&mut sum, &input[i + radius]);
        }
        emit(i, sum.map(|c| c / window));
        if i >= radius {
            sub(&mut sum, &input[i - radius]);
        }
    }
}

fn add(sum: &mut [f32; 4], value: &[f32; 4]) {
    for (s, v) in sum.iter_mut().zip(value) {
        *s += v;
    }
}

fn sub(sum: &mut [f32; 4], value: &[f32; 4]) {
    for (s, v) in sum.iter_mut().zip(value) {
        *s -= v;
    }
}

/// Writes an RGBA8 buffer composited over black as a binary PPM (P6).
pub fn write_ppm(path: &Path, width_px: u32, height_px: u32, rgba: &[u8]) -> Result<()> {
    let expected = width_px as usize * height_px as usize * BYTES_PER_PIXEL;
    if rgba.len() != expected {
        anyhow::bail!(
            "Framebuffer holds {} bytes, expected {} for {}x{}",
            rgba.len(),
            expected,
            width_px,
            height_px
        );
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create snapshot file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", width_px, height_px).context("Failed to write PPM header")?;
    for px in rgba.chunks_exact(BYTES_PER_PIXEL) {
        let a = px[3] as u32;
        let rgb = [
            (px[0] as u32 * a / 255) as u8,
            (px[1] as u32 * a / 255) as u8,
            (px[2] as u32 * a / 255) as u8,
        ];
        out.write_all(&rgb).context("Failed to write PPM pixels")?;
    }
    out.flush().context("Failed to flush PPM snapshot")?;
    debug!(
        "PixelSurface: wrote {}x{} snapshot to {}",
        width_px,
        height_px,
        path.display()
    );
    Ok(())
}

impl DrawingSurface for PixelSurface {
    fn resize(&mut self, width_px: u32, height_px: u32) {
        let len = width_px as usize * height_px as usize * BYTES_PER_PIXEL;
        self.framebuffer = vec![0u8; len].into_boxed_slice();
        self.width_px = width_px;
        self.height_px = height_px;
        self.scale = 1.0;
        self.blur_radius = 0.0;
        debug!("PixelSurface: resized to {}x{}", width_px, height_px);
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    }

    fn clear(&mut self) {
        self.framebuffer.fill(0);
    }

    fn set_blur(&mut self, radius: f64) {
        self.blur_radius = radius.max(0.0);
    }

    fn fill_rotated_rect(&mut self, rect: &RotatedRect, gradient: &LinearGradient) {
        let surface = self.bounds_region();
        if surface.is_empty() || rect.width <= 0.0 || rect.length <= 0.0 {
            return;
        }

        let device = RotatedRect {
            x: rect.x * self.scale,
            y: rect.y * self.scale,
            angle_deg: rect.angle_deg,
            width: rect.width * self.scale,
            length: rect.length * self.scale,
        };
        let radius = Self::box_radius(self.blur_radius * self.scale);
        let reach = (radius * BLUR_PASSES) as i64;

        let (min_x, min_y, max_x, max_y) = device.bounds();
        let shape = Region {
            x0: min_x.floor() as i64 - reach,
            y0: min_y.floor() as i64 - reach,
            x1: max_x.ceil() as i64 + reach,
            y1: max_y.ceil() as i64 + reach,
        };
        let padded = Region {
            x0: surface.x0 - reach,
            y0: surface.y0 - reach,
            x1: surface.x1 + reach,
            y1: surface.y1 + reach,
        };
        let layer_region = shape.intersect(&padded);
        let target = layer_region.intersect(&surface);
        if target.is_empty() {
            trace!("PixelSurface: fill entirely off-surface, skipped");
            return;
        }

        self.rasterize(&device, gradient, &layer_region);
        if radius > 0 {
            self.blur_layer(layer_region.width(), layer_region.height(), radius);
        }
        self.composite(&layer_region, &target);
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    fn framebuffer(&self) -> Option<&[u8]> {
        Some(&self.framebuffer)
    }
}
