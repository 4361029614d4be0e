// src/lib.rs

//! Animated field of soft, glowing, tilted light beams drifting straight up.
//!
//! The crate is split along the same seams the runtime uses:
//! - `beam`: the beam record with its generator, simulator and painter.
//! - `surface`: the drawing surface trait and its pixel and recording backends.
//! - `scheduler`: frame scheduling with cancellation.
//! - `host`: viewport measurement, surface lending and resize notification.
//! - `field`: the lifecycle manager tying the pieces together.

pub mod beam;
pub mod color;
pub mod config;
pub mod field;
pub mod host;
pub mod random;
pub mod scheduler;
pub mod surface;

pub use beam::{Beam, FieldGeometry};
pub use color::{ColorBase, Intensity};
pub use config::{Config, FieldConfig};
pub use field::BeamField;
pub use host::{HeadlessHost, Host, Viewport, ViewportEvent};
pub use random::{RandomSource, SeededRandom};
pub use scheduler::{CancellationToken, FrameHandle, FrameScheduler};
pub use surface::{DrawingSurface, PixelSurface, SurfaceError};
