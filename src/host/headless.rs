// src/host/headless.rs

//! Headless host: owns an in-memory surface and a scripted viewport.

use super::{Host, ObserverId, Viewport, ViewportEvent};
use crate::surface::{DrawingSurface, SurfaceError};
use log::{debug, info, warn};

pub struct HeadlessHost {
    viewport: Viewport,
    surface: Option<Box<dyn DrawingSurface>>,
    /// When set, acquisition fails with this reason even if a surface is held.
    context_failure: Option<String>,
    observers: Vec<ObserverId>,
    next_observer: u64,
    events: Vec<ViewportEvent>,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport, surface: Box<dyn DrawingSurface>) -> Self {
        info!(
            "HeadlessHost: {}x{} logical px, scale={}",
            viewport.width, viewport.height, viewport.scale_factor
        );
        Self {
            viewport,
            surface: Some(surface),
            context_failure: None,
            observers: Vec::new(),
            next_observer: 0,
            events: Vec::new(),
        }
    }

    /// A host with no surface to lend; every acquisition fails.
    pub fn without_surface(viewport: Viewport) -> Self {
        Self {
            viewport,
            surface: None,
            context_failure: None,
            observers: Vec::new(),
            next_observer: 0,
            events: Vec::new(),
        }
    }

    /// A host that holds `surface` but cannot hand out a drawing context.
    pub fn with_broken_context(
        viewport: Viewport,
        surface: Box<dyn DrawingSurface>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            context_failure: Some(reason.into()),
            ..Self::new(viewport, surface)
        }
    }

    /// Changes the viewport and queues one `Resized` event per observer.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        debug!(
            "HeadlessHost: resized to {}x{}, notifying {} observer(s)",
            width,
            height,
            self.observers.len()
        );
        for _ in &self.observers {
            self.events.push(ViewportEvent::Resized(self.viewport));
        }
    }

    /// Changes the device pixel ratio and notifies observers.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.viewport.scale_factor = scale_factor;
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.resize(width, height);
    }

    /// Drains the queued viewport events.
    pub fn poll_events(&mut self) -> Vec<ViewportEvent> {
        self.events.drain(..).collect()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// The surface, when it is not lent out.
    pub fn surface(&self) -> Option<&(dyn DrawingSurface + 'static)> {
        self.surface.as_deref()
    }
}

impl Host for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn acquire_surface(&mut self) -> Result<Box<dyn DrawingSurface>, SurfaceError> {
        if let Some(reason) = &self.context_failure {
            return Err(SurfaceError::ContextUnavailable(reason.clone()));
        }
        self.surface.take().ok_or(SurfaceError::Unavailable)
    }

    fn release_surface(&mut self, surface: Box<dyn DrawingSurface>) {
        if self.surface.is_some() {
            warn!("HeadlessHost: surface released while another is held, replacing it");
        }
        self.surface = Some(surface);
    }

    fn observe_resize(&mut self) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(id);
        id
    }

    fn unobserve_resize(&mut self, id: ObserverId) {
        self.observers.retain(|observer| *observer != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use test_log::test;

    fn host() -> HeadlessHost {
        let (surface, _log) = RecordingSurface::new();
        HeadlessHost::new(Viewport::new(320.0, 200.0, 1.0), Box::new(surface))
    }

    #[test]
    fn surface_is_lent_once_and_returned() {
        let mut host = host();
        let surface = host.acquire_surface();
        assert!(surface.is_ok());
        assert_eq!(host.acquire_surface().err(), Some(SurfaceError::Unavailable));
        if let Ok(surface) = surface {
            host.release_surface(surface);
        }
        assert!(host.surface().is_some());
    }

    #[test]
    fn broken_context_reports_its_reason() {
        let (surface, _log) = RecordingSurface::new();
        let mut host =
            HeadlessHost::with_broken_context(Viewport::new(1.0, 1.0, 1.0), Box::new(surface), "lost");
        assert_eq!(
            host.acquire_surface().err(),
            Some(SurfaceError::ContextUnavailable("lost".to_string()))
        );
        assert!(host.surface().is_some());
    }

    #[test]
    fn resize_notifies_only_registered_observers() {
        let mut host = host();
        host.resize(100.0, 100.0);
        assert!(host.poll_events().is_empty());

        let a = host.observe_resize();
        let b = host.observe_resize();
        assert_ne!(a, b);
        host.set_scale_factor(2.0);
        let events = host.poll_events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ViewportEvent::Resized(Viewport::new(100.0, 100.0, 2.0))
        );

        host.unobserve_resize(a);
        host.unobserve_resize(ObserverId(99));
        host.resize(50.0, 40.0);
        assert_eq!(host.poll_events().len(), 1);
        assert_eq!(host.viewport().width, 50.0);
    }
}
