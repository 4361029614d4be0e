// src/scheduler/manual.rs

//! Logical-clock scheduler. Nothing happens until the caller advances it.

use super::{CancellationToken, FrameHandle, FrameScheduler};
use log::trace;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct ManualState {
    queue: VecDeque<FrameHandle>,
    next_id: u64,
    scheduled_total: u64,
}

/// Scheduler whose frames fire only when `advance` is called.
///
/// Clones share the same queue, so a test can keep one clone while the field
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pops the oldest live handle, discarding cancelled ones on the way.
    pub fn advance(&self) -> Option<FrameHandle> {
        let mut state = self.lock();
        while let Some(handle) = state.queue.pop_front() {
            if handle.is_cancelled() {
                trace!("ManualScheduler: dropping cancelled frame {}", handle.id());
                continue;
            }
            return Some(handle);
        }
        None
    }

    /// Number of queued handles that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .iter()
            .filter(|handle| !handle.is_cancelled())
            .count()
    }

    /// Total handles ever issued.
    pub fn scheduled_total(&self) -> u64 {
        self.lock().scheduled_total
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next(&mut self, token: &CancellationToken) -> FrameHandle {
        let mut state = self.lock();
        let handle = FrameHandle::new(state.next_id, token.clone());
        state.next_id += 1;
        state.scheduled_total += 1;
        state.queue.push_back(handle.clone());
        handle
    }
}
