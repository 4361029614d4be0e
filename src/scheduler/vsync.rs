// src/scheduler/vsync.rs

//! Scheduler backed by a clock thread that paces frames at a fixed rate.
//!
//! `schedule_next` posts the handle to the clock thread, which holds it until
//! the next frame boundary and then forwards it on the tick channel. Handles
//! cancelled while waiting are dropped instead of forwarded.
//!
//! TODO: Pace against the display's refresh signal instead of
//! `thread::sleep` once a windowed host exists.

use super::{CancellationToken, FrameHandle, FrameScheduler};
use anyhow::{Context, Result};
use log::*;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug)]
enum ClockCommand {
    Schedule(FrameHandle),
    Stop,
}

pub struct VsyncScheduler {
    next_id: u64,
    clock_tx: Sender<ClockCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

impl VsyncScheduler {
    /// Spawns the clock thread.
    ///
    /// Returns the scheduler and the receiving end of the tick channel; every
    /// handle that comes due is delivered there in scheduling order.
    pub fn spawn(target_fps: u32) -> Result<(Self, Receiver<FrameHandle>)> {
        let target_fps = target_fps.max(1);
        let frame_duration = Duration::from_secs_f64(1.0 / target_fps as f64);
        let (clock_tx, clock_rx) = channel::<ClockCommand>();
        let (tick_tx, tick_rx) = channel::<FrameHandle>();

        let thread_handle = thread::Builder::new()
            .name("vsync".to_string())
            .spawn(move || {
                info!("VsyncScheduler: Started (target: {} FPS)", target_fps);
                let mut next_tick = Instant::now() + frame_duration;
                while let Ok(command) = clock_rx.recv() {
                    let handle = match command {
                        ClockCommand::Schedule(handle) => handle,
                        ClockCommand::Stop => break,
                    };

                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    }
                    next_tick = next_tick.max(now) + frame_duration;

                    if handle.is_cancelled() {
                        trace!("VsyncScheduler: frame {} cancelled", handle.id());
                        continue;
                    }
                    if tick_tx.send(handle).is_err() {
                        info!("VsyncScheduler: Tick channel closed, exiting");
                        break;
                    }
                }
                debug!("VsyncScheduler: Thread exiting");
            })
            .context("Failed to spawn vsync thread")?;

        info!("VsyncScheduler spawned successfully");
        Ok((
            Self {
                next_id: 0,
                clock_tx,
                thread_handle: Some(thread_handle),
            },
            tick_rx,
        ))
    }
}

impl FrameScheduler for VsyncScheduler {
    fn schedule_next(&mut self, token: &CancellationToken) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id, token.clone());
        self.next_id += 1;
        if self
            .clock_tx
            .send(ClockCommand::Schedule(handle.clone()))
            .is_err()
        {
            warn!(
                "VsyncScheduler: clock thread gone, frame {} will never fire",
                handle.id()
            );
        }
        handle
    }
}

impl Drop for VsyncScheduler {
    fn drop(&mut self) {
        debug!("VsyncScheduler dropped");
        let _ = self.clock_tx.send(ClockCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("VsyncScheduler thread panicked: {:?}", e);
            }
        }
    }
}
