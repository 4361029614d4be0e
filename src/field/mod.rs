// src/field/mod.rs

//! `BeamField` - owns the drawing surface and the beam population, and drives
//! the animation loop.
//!
//! ## Lifecycle
//! 1. `activate(host)` - acquire and size the surface, populate beams, register
//!    a resize observer, schedule the first frame.
//! 2. `on_frame(handle)` - clear, blur, simulate and paint every beam in
//!    population order, schedule the next frame.
//! 3. `on_resize(viewport)` - resize the surface and regenerate the population.
//! 4. `deactivate(host)` - cancel pending frames, remove the observer, hand the
//!    surface back.
//!
//! A host that cannot provide a surface leaves the field degraded: nothing is
//! drawn, nothing is scheduled, and no error reaches the caller.
//!
//! ## Threading Model
//! Every entry point takes `&mut self`, so frames never overlap and a resize
//! replaces the surface size and the whole population between two frames.

use crate::beam::{self, Beam, FieldGeometry};
use crate::config::FieldConfig;
use crate::host::{Host, ObserverId, Viewport, ViewportEvent};
use crate::random::RandomSource;
use crate::scheduler::{CancellationToken, FrameHandle, FrameScheduler};
use crate::surface::DrawingSurface;
use log::*;

/// State owned while the field is running.
struct ActiveField {
    surface: Box<dyn DrawingSurface>,
    observer: ObserverId,
    geometry: FieldGeometry,
    beams: Vec<Beam>,
    token: CancellationToken,
    pending: Option<FrameHandle>,
}

enum FieldState {
    Inactive,
    /// Activation ran but no surface could be acquired.
    Degraded,
    Active(ActiveField),
}

/// Animated beam background.
///
/// `C` is the content layered above the animation. The field never inspects
/// it; it is only carried and handed back.
pub struct BeamField<C = ()> {
    options: FieldConfig,
    content: C,
    scheduler: Box<dyn FrameScheduler>,
    rng: Box<dyn RandomSource>,
    state: FieldState,
    frames_rendered: u64,
}

impl BeamField<()> {
    /// Creates an inactive field with no layered content.
    pub fn new(
        options: FieldConfig,
        scheduler: Box<dyn FrameScheduler>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self::with_content(options, (), scheduler, rng)
    }
}

impl<C> BeamField<C> {
    /// Creates an inactive field carrying `content`.
    pub fn with_content(
        options: FieldConfig,
        content: C,
        scheduler: Box<dyn FrameScheduler>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            options,
            content,
            scheduler,
            rng,
            state: FieldState::Inactive,
            frames_rendered: 0,
        }
    }

    /// Starts the field on `host`.
    ///
    /// Calling this on a running or degraded field does nothing.
    pub fn activate(&mut self, host: &mut dyn Host) {
        if !matches!(self.state, FieldState::Inactive) {
            debug!("BeamField: activate ignored, already activated");
            return;
        }

        let mut surface = match host.acquire_surface() {
            Ok(surface) => surface,
            Err(e) => {
                warn!("BeamField: {}, running without animation", e);
                self.state = FieldState::Degraded;
                return;
            }
        };

        let viewport = host.viewport();
        let geometry = self.configure_surface(surface.as_mut(), &viewport);
        let beams = self.generate_population(&geometry);
        let observer = host.observe_resize();
        let token = CancellationToken::new();
        let pending = Some(self.scheduler.schedule_next(&token));

        info!(
            "BeamField: activated with {} beams on {}x{} logical px surface",
            beams.len(),
            geometry.width,
            geometry.height
        );

        self.state = FieldState::Active(ActiveField {
            surface,
            observer,
            geometry,
            beams,
            token,
            pending,
        });
    }

    /// Stops the field and returns the surface to `host`.
    ///
    /// Safe to call any number of times, including after a degraded
    /// activation or without any activation at all.
    pub fn deactivate(&mut self, host: &mut dyn Host) {
        match std::mem::replace(&mut self.state, FieldState::Inactive) {
            FieldState::Active(active) => {
                active.token.cancel();
                host.unobserve_resize(active.observer);
                host.release_surface(active.surface);
                info!(
                    "BeamField: deactivated after {} frame(s)",
                    self.frames_rendered
                );
            }
            FieldState::Degraded => debug!("BeamField: deactivated degraded field"),
            FieldState::Inactive => trace!("BeamField: deactivate on inactive field"),
        }
    }

    /// Runs one frame if `handle` is the frame this field is waiting for.
    ///
    /// Returns `true` if a frame was rendered. Stale or cancelled handles are
    /// ignored.
    pub fn on_frame(&mut self, handle: &FrameHandle) -> bool {
        let Self {
            options,
            scheduler,
            rng,
            state,
            frames_rendered,
            ..
        } = self;

        let active = match state {
            FieldState::Active(active) => active,
            _ => {
                trace!("BeamField: frame {} ignored, field not active", handle.id());
                return false;
            }
        };
        if handle.is_cancelled() || active.pending.as_ref() != Some(handle) {
            trace!("BeamField: stale frame {} ignored", handle.id());
            return false;
        }

        let intensity = options.intensity.factor();
        let surface = active.surface.as_mut();
        surface.clear();
        surface.set_blur(options.blur_px);

        let mut recycled = 0;
        for (index, beam) in active.beams.iter_mut().enumerate() {
            if beam::advance(beam, index, &active.geometry, rng.as_mut()) {
                recycled += 1;
            }
            beam::paint(surface, beam, intensity);
        }

        *frames_rendered += 1;
        if recycled > 0 {
            trace!(
                "BeamField: frame {} recycled {} beam(s)",
                frames_rendered,
                recycled
            );
        }

        active.pending = Some(scheduler.schedule_next(&active.token));
        true
    }

    /// Resizes the surface to `viewport` and regenerates every beam.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if !matches!(self.state, FieldState::Active(_)) {
            trace!("BeamField: resize ignored, field not active");
            return;
        }
        let mut active = match std::mem::replace(&mut self.state, FieldState::Inactive) {
            FieldState::Active(active) => active,
            other => {
                self.state = other;
                return;
            }
        };

        let geometry = self.configure_surface(active.surface.as_mut(), &viewport);
        active.beams = self.generate_population(&geometry);
        active.geometry = geometry;
        debug!(
            "BeamField: resized to {}x{} logical px, regenerated {} beams",
            geometry.width,
            geometry.height,
            active.beams.len()
        );
        self.state = FieldState::Active(active);
    }

    /// Dispatches a host event.
    pub fn handle_viewport_event(&mut self, event: ViewportEvent) {
        match event {
            ViewportEvent::Resized(viewport) => self.on_resize(viewport),
        }
    }

    fn configure_surface(
        &self,
        surface: &mut dyn DrawingSurface,
        viewport: &Viewport,
    ) -> FieldGeometry {
        let (width_px, height_px) = viewport.physical_size();
        surface.resize(width_px, height_px);
        surface.set_scale(viewport.effective_scale());
        // Beams live in logical coordinates; the surface scale maps them to pixels.
        FieldGeometry::new(
            logical_extent(viewport.width),
            logical_extent(viewport.height),
            self.options.color_base.hue(),
            self.options.effective_beam_count(),
        )
    }

    fn generate_population(&mut self, geometry: &FieldGeometry) -> Vec<Beam> {
        beam::populate(
            geometry.total_beams,
            geometry.width,
            geometry.height,
            geometry.color_base,
            self.rng.as_mut(),
        )
    }

    pub fn options(&self) -> &FieldConfig {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FieldState::Active(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, FieldState::Degraded)
    }

    /// The live population; empty unless active.
    pub fn beams(&self) -> &[Beam] {
        match &self.state {
            FieldState::Active(active) => active.beams.as_slice(),
            _ => &[],
        }
    }

    /// Geometry of the live population.
    pub fn geometry(&self) -> Option<FieldGeometry> {
        match &self.state {
            FieldState::Active(active) => Some(active.geometry),
            _ => None,
        }
    }

    /// The frame this field is waiting for, if any.
    pub fn pending_frame(&self) -> Option<&FrameHandle> {
        match &self.state {
            FieldState::Active(active) => active.pending.as_ref(),
            _ => None,
        }
    }

    /// The surface while it is lent to the field.
    pub fn surface(&self) -> Option<&(dyn DrawingSurface + 'static)> {
        match &self.state {
            FieldState::Active(active) => Some(active.surface.as_ref()),
            _ => None,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn into_content(self) -> C {
        self.content
    }
}

fn logical_extent(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests;
