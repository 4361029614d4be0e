// src/scheduler/mod.rs

//! Frame scheduling for the beam field's animation loop.
//!
//! The field never re-arms itself through a callback. Instead it asks a
//! `FrameScheduler` for the next frame and receives a `FrameHandle`; whoever
//! drives the loop hands that handle back to `BeamField::on_frame` when the
//! frame is due.
//!
//! Every handle issued during one activation shares a single
//! `CancellationToken`. Cancelling the token invalidates all of them at once.
//!
//! - `ManualScheduler`: logical clock driven by the caller (tests).
//! - `VsyncScheduler`: background clock thread releasing one handle per
//!   frame interval.

pub mod manual;
pub mod vsync;

pub use manual::ManualScheduler;
pub use vsync::VsyncScheduler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A scheduled frame callback.
#[derive(Debug, Clone)]
pub struct FrameHandle {
    id: u64,
    token: CancellationToken,
}

impl FrameHandle {
    pub fn new(id: u64, token: CancellationToken) -> Self {
        Self { id, token }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl PartialEq for FrameHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FrameHandle {}

/// Issues frame handles. Implementations decide when a handle becomes due.
pub trait FrameScheduler: Send {
    /// Schedules one frame tied to `token` and returns its handle.
    fn schedule_next(&mut self, token: &CancellationToken) -> FrameHandle;
}
