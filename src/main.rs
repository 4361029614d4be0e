// src/main.rs

//! Headless runner: animates the beam field into an in-memory surface at the
//! configured frame rate and optionally writes the last frame as a PPM.

use anyhow::{bail, Context};
use beamfield::config::{ResizeSchedule, CONFIG};
use beamfield::host::{HeadlessHost, Viewport};
use beamfield::random::{RandomSource, SeededRandom};
use beamfield::scheduler::VsyncScheduler;
use beamfield::surface::{self, PixelSurface};
use beamfield::BeamField;
use log::{debug, info, warn};

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting beamfield...");
    let config = &*CONFIG;

    // --- Host ---
    let viewport = Viewport::new(
        config.viewport.width,
        config.viewport.height,
        config.viewport.scale_factor,
    );
    let (width_px, height_px) = viewport.physical_size();
    let mut host = HeadlessHost::new(viewport, Box::new(PixelSurface::new(width_px, height_px)));

    // --- Field ---
    let rng: Box<dyn RandomSource> = match config.run.seed {
        Some(seed) => {
            info!("Using seeded random source ({})", seed);
            Box::new(SeededRandom::from_seed(seed))
        }
        None => Box::new(SeededRandom::from_entropy()),
    };
    let (scheduler, tick_rx) = VsyncScheduler::spawn(config.performance.target_fps)
        .context("Failed to start frame clock")?;
    let mut field = BeamField::new(config.field.clone(), Box::new(scheduler), rng);

    field.activate(&mut host);
    if !field.is_active() {
        bail!("Beam field could not acquire a drawing surface");
    }

    let mut resizes = ResizeSchedule::new(&config.run.resizes);

    // --- Frame Loop ---
    while field.frames_rendered() < config.run.frames {
        for resize in resizes.take_due(field.frames_rendered()) {
            debug!(
                "Applying scheduled resize to {}x{} after {} frame(s)",
                resize.width,
                resize.height,
                field.frames_rendered()
            );
            host.resize(resize.width, resize.height);
        }
        for event in host.poll_events() {
            field.handle_viewport_event(event);
        }

        let handle = match tick_rx.recv() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("Frame clock stopped before the run finished");
                break;
            }
        };
        field.on_frame(&handle);
    }

    field.deactivate(&mut host);
    info!("Rendered {} frame(s)", field.frames_rendered());

    // --- Snapshot ---
    if let Some(path) = &config.run.snapshot_path {
        let canvas = host
            .surface()
            .context("Drawing surface was not returned to the host")?;
        let (width, height) = canvas.dimensions();
        let pixels = canvas
            .framebuffer()
            .context("Drawing surface has no readable framebuffer")?;
        surface::write_ppm(path, width, height, pixels)?;
        info!("Snapshot written to {}", path.display());
    }

    info!("beamfield exited.");
    Ok(())
}
