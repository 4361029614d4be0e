// src/field/tests.rs

use super::*;
use crate::color::{ColorBase, Intensity};
use crate::host::HeadlessHost;
use crate::random::{FixedSequence, SeededRandom};
use crate::scheduler::ManualScheduler;
use crate::surface::{CommandLog, RecordingSurface, SurfaceCommand};
use test_log::test;

struct Harness {
    field: BeamField,
    host: HeadlessHost,
    scheduler: ManualScheduler,
    log: CommandLog,
}

fn harness_with(viewport: Viewport, options: FieldConfig) -> Harness {
    let (surface, log) = RecordingSurface::new();
    let host = HeadlessHost::new(viewport, Box::new(surface));
    let scheduler = ManualScheduler::new();
    let field = BeamField::new(
        options,
        Box::new(scheduler.clone()),
        Box::new(SeededRandom::from_seed(0xBEA5)),
    );
    Harness {
        field,
        host,
        scheduler,
        log,
    }
}

fn harness() -> Harness {
    harness_with(Viewport::new(400.0, 300.0, 1.0), FieldConfig::default())
}

impl Harness {
    fn activate(&mut self) {
        self.field.activate(&mut self.host);
    }

    fn run_frame(&mut self) -> bool {
        match self.scheduler.advance() {
            Some(handle) => self.field.on_frame(&handle),
            None => false,
        }
    }
}

#[test]
fn activation_sizes_surface_for_pixel_density() {
    let mut h = harness_with(Viewport::new(400.0, 300.0, 2.0), FieldConfig::default());
    h.activate();

    assert!(h.field.is_active());
    let commands = h.log.snapshot();
    assert_eq!(
        commands[..2],
        [
            SurfaceCommand::Resize {
                width_px: 800,
                height_px: 600
            },
            SurfaceCommand::SetScale(2.0),
        ]
    );
    let geometry = h.field.geometry().unwrap();
    assert_eq!((geometry.width, geometry.height), (400.0, 300.0));
    assert_eq!(geometry.color_base, 190.0);
    assert!(h.field.beams().iter().all(|b| b.length == 750.0));
    assert_eq!(h.field.beams().len(), 18);
    assert_eq!(h.host.observer_count(), 1);
    assert_eq!(h.scheduler.pending(), 1);
}

#[test]
fn each_frame_clears_blurs_and_paints_every_beam() {
    let mut h = harness();
    h.activate();
    h.log.drain();

    assert!(h.run_frame());
    let commands = h.log.drain();
    assert_eq!(commands[0], SurfaceCommand::Clear);
    assert_eq!(commands[1], SurfaceCommand::SetBlur(35.0));
    assert_eq!(commands.len(), 2 + 18);
    assert_eq!(h.field.frames_rendered(), 1);
    assert_eq!(h.scheduler.pending(), 1);
    assert_eq!(h.scheduler.scheduled_total(), 2);
}

#[test]
fn beams_are_simulated_before_they_are_painted() {
    let mut h = harness();
    h.activate();
    let before: Vec<f64> = h.field.beams().iter().map(|b| b.y).collect();
    h.log.drain();

    h.run_frame();
    let fills: Vec<f64> = h
        .log
        .drain()
        .into_iter()
        .filter_map(|c| match c {
            SurfaceCommand::FillRotatedRect { rect, .. } => Some(rect.y),
            _ => None,
        })
        .collect();
    let after: Vec<f64> = h.field.beams().iter().map(|b| b.y).collect();

    assert_eq!(fills, after);
    assert_ne!(fills, before);
}

#[test]
fn stale_frame_handles_are_ignored() {
    let mut h = harness();
    h.activate();
    let first = h.field.pending_frame().cloned().unwrap();
    let fired = h.scheduler.advance().unwrap();
    assert_eq!(first, fired);

    assert!(h.field.on_frame(&fired));
    assert!(!h.field.on_frame(&first));
    assert_eq!(h.field.frames_rendered(), 1);
}

#[test]
fn resize_regenerates_the_whole_population() {
    let mut h = harness();
    h.activate();
    let original = h.field.beams().to_vec();

    h.host.resize(800.0, 600.0);
    for event in h.host.poll_events() {
        h.field.handle_viewport_event(event);
    }

    let geometry = h.field.geometry().unwrap();
    assert_eq!((geometry.width, geometry.height), (800.0, 600.0));
    assert_eq!(h.field.beams().len(), original.len());
    assert!(h.field.beams().iter().all(|b| b.length == 1500.0));
    assert_ne!(h.field.beams(), &original[..]);
}

#[test]
fn population_size_survives_repeated_resizes() {
    let options = FieldConfig {
        beam_count: 5,
        ..FieldConfig::default()
    };
    let mut h = harness_with(Viewport::new(300.0, 200.0, 1.0), options);
    h.activate();
    for step in 0..10 {
        h.field
            .on_resize(Viewport::new(100.0 + step as f64 * 50.0, 80.0, 1.5));
        h.run_frame();
        assert_eq!(h.field.beams().len(), 18);
    }
}

#[test]
fn resize_keeps_the_pending_frame() {
    let mut h = harness();
    h.activate();
    h.field.on_resize(Viewport::new(200.0, 100.0, 1.0));
    assert!(h.run_frame());
}

#[test]
fn missing_surface_degrades_silently() {
    let scheduler = ManualScheduler::new();
    let mut host = HeadlessHost::without_surface(Viewport::new(400.0, 300.0, 1.0));
    let mut field = BeamField::new(
        FieldConfig::default(),
        Box::new(scheduler.clone()),
        Box::new(FixedSequence::constant(0.5)),
    );

    field.activate(&mut host);
    assert!(field.is_degraded());
    assert!(!field.is_active());
    assert!(field.beams().is_empty());
    assert_eq!(host.observer_count(), 0);
    assert_eq!(scheduler.scheduled_total(), 0);

    field.on_resize(Viewport::new(10.0, 10.0, 1.0));
    field.deactivate(&mut host);
    field.deactivate(&mut host);
    assert!(!field.is_degraded());
}

#[test]
fn deactivate_twice_stops_all_scheduling() {
    let mut h = harness();
    h.activate();
    h.run_frame();
    let pending = h.field.pending_frame().cloned().unwrap();

    h.field.deactivate(&mut h.host);
    h.field.deactivate(&mut h.host);

    assert!(!h.field.is_active());
    assert!(pending.is_cancelled());
    assert!(!h.field.on_frame(&pending));
    assert_eq!(h.scheduler.pending(), 0);
    assert!(h.scheduler.advance().is_none());
    assert_eq!(h.host.observer_count(), 0);
    assert!(h.host.surface().is_some());
}

#[test]
fn deactivate_without_activation_is_a_no_op() {
    let mut h = harness();
    h.field.deactivate(&mut h.host);
    assert!(h.log.is_empty());
    assert_eq!(h.scheduler.scheduled_total(), 0);
}

#[test]
fn field_can_be_reactivated_after_teardown() {
    let mut h = harness();
    h.activate();
    h.field.deactivate(&mut h.host);
    h.activate();

    assert!(h.field.is_active());
    assert_eq!(h.host.observer_count(), 1);
    assert!(h.run_frame());
}

#[test]
fn activating_twice_keeps_one_observer_and_one_frame() {
    let mut h = harness();
    h.activate();
    h.activate();
    assert_eq!(h.host.observer_count(), 1);
    assert_eq!(h.scheduler.pending(), 1);
}

#[test]
fn invariants_hold_over_a_long_run() {
    let mut h = harness_with(Viewport::new(320.0, 120.0, 1.0), FieldConfig::default());
    h.activate();
    for _ in 0..900 {
        assert!(h.run_frame());
        for beam in h.field.beams() {
            assert!(beam.width > 0.0 && beam.length > 0.0 && beam.speed > 0.0);
            assert!((0.15..=0.40).contains(&beam.opacity));
        }
    }
    assert_eq!(h.field.frames_rendered(), 900);
}

#[test]
fn options_drive_blur_and_palette() {
    let options = FieldConfig {
        intensity: Intensity::Subtle,
        color_base: ColorBase::Orange,
        beam_count: 18,
        blur_px: 12.0,
    };
    let mut h = harness_with(Viewport::new(200.0, 200.0, 1.0), options);
    h.activate();
    assert!(h
        .field
        .beams()
        .iter()
        .all(|b| (30.0..100.0).contains(&b.hue)));
    h.log.drain();
    h.run_frame();
    assert_eq!(h.log.snapshot()[1], SurfaceCommand::SetBlur(12.0));
    assert_eq!(h.field.options().intensity, Intensity::Subtle);
}

#[test]
fn layered_content_is_passed_through_untouched() {
    let mut field = BeamField::with_content(
        FieldConfig::default(),
        String::from("hero section"),
        Box::new(ManualScheduler::new()),
        Box::new(FixedSequence::constant(0.1)),
    );
    field.content_mut().push('!');
    assert_eq!(field.content(), "hero section!");
    assert_eq!(field.into_content(), "hero section!");
}

#[test]
fn broken_drawing_context_degrades_and_keeps_the_surface_with_the_host() {
    let (surface, log) = RecordingSurface::new();
    let mut host = HeadlessHost::with_broken_context(
        Viewport::new(400.0, 300.0, 1.0),
        Box::new(surface),
        "context lost",
    );
    let scheduler = ManualScheduler::new();
    let mut field = BeamField::new(
        FieldConfig::default(),
        Box::new(scheduler.clone()),
        Box::new(SeededRandom::from_seed(9)),
    );

    field.activate(&mut host);
    assert!(field.is_degraded());
    assert!(log.is_empty());
    assert!(host.surface().is_some());
    assert!(scheduler.advance().is_none());
}
