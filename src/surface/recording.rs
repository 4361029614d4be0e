// src/surface/recording.rs

//! A surface that records every drawing call instead of rasterizing.
//!
//! The log is shared, so a test can keep a `CommandLog` handle after the
//! surface itself has been handed to a host or field.

use super::{DrawingSurface, LinearGradient, RotatedRect};
use std::sync::{Arc, Mutex, MutexGuard};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    Resize { width_px: u32, height_px: u32 },
    SetScale(f64),
    Clear,
    SetBlur(f64),
    FillRotatedRect {
        rect: RotatedRect,
        gradient: LinearGradient,
    },
}

/// Shared handle onto a `RecordingSurface`'s command log.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Arc<Mutex<Vec<SurfaceCommand>>>,
}

impl CommandLog {
    fn lock(&self) -> MutexGuard<'_, Vec<SurfaceCommand>> {
        // A poisoned log only means a test thread panicked mid-push.
        self.commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, command: SurfaceCommand) {
        self.lock().push(command);
    }

    /// Copy of every command recorded so far.
    pub fn snapshot(&self) -> Vec<SurfaceCommand> {
        self.lock().clone()
    }

    /// Removes and returns every command recorded so far.
    pub fn drain(&self) -> Vec<SurfaceCommand> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of recorded fills.
    pub fn fill_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::FillRotatedRect { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    width_px: u32,
    height_px: u32,
    log: CommandLog,
}

impl RecordingSurface {
    /// Creates a surface and a handle onto its log.
    pub fn new() -> (Self, CommandLog) {
        let surface = Self::default();
        let log = surface.log.clone();
        (surface, log)
    }
}

impl DrawingSurface for RecordingSurface {
    fn resize(&mut self, width_px: u32, height_px: u32) {
        self.width_px = width_px;
        self.height_px = height_px;
        self.log.push(SurfaceCommand::Resize {
            width_px,
            height_px,
        });
    }

    fn set_scale(&mut self, scale: f64) {
        self.log.push(SurfaceCommand::SetScale(scale));
    }

    fn clear(&mut self) {
        self.log.push(SurfaceCommand::Clear);
    }

    fn set_blur(&mut self, radius: f64) {
        self.log.push(SurfaceCommand::SetBlur(radius));
    }

    fn fill_rotated_rect(&mut self, rect: &RotatedRect, gradient: &LinearGradient) {
        self.log.push(SurfaceCommand::FillRotatedRect {
            rect: *rect,
            gradient: gradient.clone(),
        });
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}
