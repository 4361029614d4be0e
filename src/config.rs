// src/config.rs

//! Configuration structures for the beam field and the headless runner.
//!
//! Every section deserializes with `#[serde(default)]`, so a config file only
//! needs the keys it wants to override. Files are JSON.

use crate::color::{ColorBase, Intensity};
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "BEAMFIELD_CONFIG";

/// Smallest population the field will run with.
pub const MIN_BEAM_COUNT: usize = 18;

/// Process-wide configuration, read by the binary's composition root only.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Root of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Look of the beam population.
    pub field: FieldConfig,
    /// Viewport used by the headless host.
    pub viewport: ViewportConfig,
    /// Frame pacing.
    pub performance: PerformanceConfig,
    /// Headless run script.
    pub run: RunConfig,
}

impl Config {
    /// Loads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parses a JSON config document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).context("Invalid config JSON")?;
        Ok(config)
    }

    /// Loads the file named by `BEAMFIELD_CONFIG`, or defaults when unset or
    /// unreadable.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                match Self::load(&path) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        config
                    }
                    Err(e) => {
                        warn!("{:#}. Using default configuration.", e);
                        Self::default()
                    }
                }
            }
            None => {
                info!("{} not set, using default configuration.", CONFIG_ENV_VAR);
                Self::default()
            }
        }
    }
}

// --- Field Configuration ---

/// Settings exposed to the embedding page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Brightness preset.
    pub intensity: Intensity,
    /// Palette the beam hues are drawn from.
    pub color_base: ColorBase,
    /// Population size. Values below `MIN_BEAM_COUNT` are raised to it.
    pub beam_count: usize,
    /// Blur radius in logical pixels applied to every beam.
    pub blur_px: f64,
}

impl FieldConfig {
    /// Population size after applying the minimum.
    pub fn effective_beam_count(&self) -> usize {
        self.beam_count.max(MIN_BEAM_COUNT)
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            intensity: Intensity::Strong,
            color_base: ColorBase::Blue,
            beam_count: MIN_BEAM_COUNT,
            blur_px: 35.0,
        }
    }
}

// --- Viewport Configuration ---

/// Viewport of the headless host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in logical pixels.
    pub width: f64,
    /// Height in logical pixels.
    pub height: f64,
    /// Device pixel ratio.
    pub scale_factor: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            width: 640.0,
            height: 360.0,
            scale_factor: 1.0,
        }
    }
}

// --- Performance Configuration ---

/// Frame pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Frames per second the vsync clock aims for.
    pub target_fps: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig { target_fps: 60 }
    }
}

// --- Run Configuration ---

/// What the headless binary does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Number of frames to render before exiting.
    pub frames: u64,
    /// Where to write the final frame as PPM, if anywhere.
    pub snapshot_path: Option<PathBuf>,
    /// Seed for the random source. Unset means OS entropy.
    pub seed: Option<u64>,
    /// Viewport changes applied during the run.
    pub resizes: Vec<ScheduledResize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            frames: 120,
            snapshot_path: None,
            seed: None,
            resizes: Vec::new(),
        }
    }
}

/// A viewport change applied after `at_frame` frames have rendered.
///
/// `at_frame: 0` applies before the first frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledResize {
    pub at_frame: u64,
    pub width: f64,
    pub height: f64,
}

/// Scripted resizes ordered by `at_frame`, handed out as they come due.
#[derive(Debug, Clone, Default)]
pub struct ResizeSchedule {
    pending: VecDeque<ScheduledResize>,
}

impl ResizeSchedule {
    /// Orders `resizes` by frame; entries sharing a frame keep their order.
    pub fn new(resizes: &[ScheduledResize]) -> Self {
        let mut sorted = resizes.to_vec();
        sorted.sort_by_key(|resize| resize.at_frame);
        Self {
            pending: sorted.into(),
        }
    }

    /// Removes and returns every resize due once `frames_rendered` frames
    /// have rendered.
    pub fn take_due(&mut self, frames_rendered: u64) -> Vec<ScheduledResize> {
        let due = self
            .pending
            .iter()
            .take_while(|resize| resize.at_frame <= frames_rendered)
            .count();
        self.pending.drain(..due).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.field.intensity, Intensity::Strong);
        assert_eq!(config.field.color_base, ColorBase::Blue);
        assert_eq!(config.field.beam_count, 18);
        assert_eq!(config.field.blur_px, 35.0);
        assert_eq!(config.performance.target_fps, 60);
        assert!(config.run.resizes.is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_keys() -> Result<()> {
        let config = Config::from_json(
            r#"{
                "field": { "intensity": "subtle", "color_base": "magenta" },
                "run": { "frames": 3, "resizes": [ { "at_frame": 1, "width": 320, "height": 200 } ] }
            }"#,
        )?;
        assert_eq!(config.field.intensity, Intensity::Subtle);
        assert_eq!(config.field.color_base.hue(), 300.0);
        assert_eq!(config.field.blur_px, 35.0);
        assert_eq!(config.viewport, ViewportConfig::default());
        assert_eq!(config.run.frames, 3);
        assert_eq!(config.run.resizes[0].width, 320.0);
        Ok(())
    }

    #[test]
    fn unknown_palette_name_is_rejected() {
        let err = Config::from_json(r#"{ "field": { "color_base": "chartreuse" } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn beam_count_is_raised_to_the_minimum() {
        let field = FieldConfig {
            beam_count: 4,
            ..FieldConfig::default()
        };
        assert_eq!(field.effective_beam_count(), MIN_BEAM_COUNT);
        let field = FieldConfig {
            beam_count: 30,
            ..FieldConfig::default()
        };
        assert_eq!(field.effective_beam_count(), 30);
    }

    #[test]
    fn resize_at_frame_zero_is_due_before_any_frame() {
        let resize = |at_frame, width| ScheduledResize {
            at_frame,
            width,
            height: 100.0,
        };
        let mut schedule =
            ResizeSchedule::new(&[resize(3, 300.0), resize(0, 100.0), resize(3, 301.0)]);

        assert_eq!(schedule.take_due(0), vec![resize(0, 100.0)]);
        assert!(schedule.take_due(2).is_empty());
        assert_eq!(schedule.take_due(3), vec![resize(3, 300.0), resize(3, 301.0)]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn load_reports_missing_files() {
        let err = Config::load(Path::new("/nonexistent/beamfield.json"));
        assert!(err.is_err());
    }

    #[test]
    fn config_round_trips_through_a_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("beamfield-config-{}.json", std::process::id()));
        let mut config = Config::default();
        config.run.seed = Some(42);
        std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        let loaded = Config::load(&path);
        std::fs::remove_file(&path)?;
        assert_eq!(loaded?, config);
        Ok(())
    }
}
