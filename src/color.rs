// src/color.rs

//! Defines the color presets exposed to the embedding page (`Intensity`,
//! `ColorBase`) and the HSL to RGBA conversion used by the rasterizer.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Brightness preset applied to every beam's pulsing opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Subtle,
    Medium,
    #[default]
    Strong,
}

impl Intensity {
    /// Returns the multiplier applied to a beam's pulsing opacity.
    pub fn factor(&self) -> f64 {
        match self {
            Intensity::Subtle => 0.6,
            Intensity::Medium => 0.8,
            Intensity::Strong => 1.0,
        }
    }
}

impl FromStr for Intensity {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtle" => Ok(Intensity::Subtle),
            "medium" => Ok(Intensity::Medium),
            "strong" => Ok(Intensity::Strong),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Named palette entry selecting the base hue of the beam population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorBase {
    #[default]
    Blue,
    Purple,
    Cyan,
    Orange,
    Magenta,
}

impl ColorBase {
    /// Base hue in degrees.
    pub fn hue(&self) -> f64 {
        match self {
            ColorBase::Blue => 190.0,
            ColorBase::Purple => 260.0,
            ColorBase::Cyan => 180.0,
            ColorBase::Orange => 30.0,
            ColorBase::Magenta => 300.0,
        }
    }
}

impl FromStr for ColorBase {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(ColorBase::Blue),
            "purple" => Ok(ColorBase::Purple),
            "cyan" => Ok(ColorBase::Cyan),
            "orange" => Ok(ColorBase::Orange),
            "magenta" => Ok(ColorBase::Magenta),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Returned when a preset name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset name '{0}'")]
pub struct UnknownPreset(pub String);

/// RGBA color in 32-bit format (8 bits per channel, straight alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A color in HSL space with alpha, as accepted by canvas `hsla(...)`.
///
/// `h` is in degrees and may be any finite value; it wraps modulo 360.
/// `s`, `l` and `a` are fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Hsla {
    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Converts to floating point RGB channels in `[0, 1]` plus alpha.
    pub fn to_rgb_f64(&self) -> [f64; 4] {
        if !self.h.is_finite() {
            warn!("Hsla::to_rgb_f64 received non-finite hue {}, using 0", self.h);
        }
        let h = if self.h.is_finite() {
            self.h.rem_euclid(360.0)
        } else {
            0.0
        };
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);
        let a = self.a.clamp(0.0, 1.0);

        // CSS Color 4 hsl-to-rgb.
        let channel = |n: f64| {
            let k = (n + h / 30.0).rem_euclid(12.0);
            let amount = s * l.min(1.0 - l);
            l - amount * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
        };
        [channel(0.0), channel(8.0), channel(4.0), a]
    }

    /// Converts to 8-bit RGBA.
    pub fn to_rgba(&self) -> Rgba {
        let [r, g, b, a] = self.to_rgb_f64();
        let q = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba::new(q(r), q(g), q(b), q(a))
    }
}

impl fmt::Display for Hsla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsla({}, {}%, {}%, {})",
            self.h,
            self.s * 100.0,
            self.l * 100.0,
            self.a
        )
    }
}
