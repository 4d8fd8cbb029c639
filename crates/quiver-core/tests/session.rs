//! Full-loop tests: scripted input, counting scheduler, recording surface.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::DVec2;
use quiver_core::{
    AnimationSession, DrawCall, FrameSummary, LatticeGrid, Layout, LoopState, Preset,
    RecordingSurface, TickOutcome, Viewport,
};
use quiver_platform::{CanvasRect, FrameHandle, FrameScheduler, InputEvent, InputSource};

#[derive(Default)]
struct InputLog {
    queue: VecDeque<InputEvent>,
    starts: usize,
    stops: usize,
    listening: bool,
}

#[derive(Clone, Default)]
struct ScriptedInput(Rc<RefCell<InputLog>>);

impl ScriptedInput {
    fn push(&self, event: InputEvent) {
        self.0.borrow_mut().queue.push_back(event);
    }

    fn move_to(&self, x: f64, y: f64) {
        self.push(InputEvent::PointerMove {
            client_x: x,
            client_y: y,
            bounds: CanvasRect::new(0.0, 0.0, 800.0, 600.0),
        });
    }
}

impl InputSource for ScriptedInput {
    fn start(&mut self) -> quiver_platform::Result<()> {
        let mut log = self.0.borrow_mut();
        log.starts += 1;
        log.listening = true;
        Ok(())
    }

    fn stop(&mut self) -> quiver_platform::Result<()> {
        let mut log = self.0.borrow_mut();
        log.stops += 1;
        log.listening = false;
        Ok(())
    }

    fn drain(&mut self, out: &mut Vec<InputEvent>) {
        out.extend(self.0.borrow_mut().queue.drain(..));
    }
}

#[derive(Default)]
struct SchedulerLog {
    next: u64,
    requested: usize,
    cancelled: Vec<FrameHandle>,
    fail: bool,
}

#[derive(Clone, Default)]
struct CountingScheduler(Rc<RefCell<SchedulerLog>>);

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) -> quiver_platform::Result<FrameHandle> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err("no frame for you".into());
        }
        log.next += 1;
        log.requested += 1;
        Ok(FrameHandle(log.next))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> quiver_platform::Result<()> {
        self.0.borrow_mut().cancelled.push(handle);
        Ok(())
    }
}

type TestSession = AnimationSession<ScriptedInput, CountingScheduler>;

fn session(preset: Preset) -> (TestSession, ScriptedInput, CountingScheduler) {
    let input = ScriptedInput::default();
    let scheduler = CountingScheduler::default();
    let session = AnimationSession::new(preset.config(), input.clone(), scheduler.clone()).unwrap();
    (session, input, scheduler)
}

fn viewport(w: f64, h: f64) -> Viewport {
    Viewport::new(w, h).unwrap()
}

// Lifecycle

#[test]
fn start_builds_agents_and_schedules_first_frame() {
    let (mut session, input, scheduler) = session(Preset::Arrows);
    assert_eq!(session.state(), LoopState::Idle);
    session.start(viewport(800.0, 600.0)).unwrap();
    assert_eq!(session.state(), LoopState::Running);
    assert_eq!(session.agents().len(), 17 * 13);
    assert!(input.0.borrow().listening);
    assert_eq!(scheduler.0.borrow().requested, 1);
}

#[test]
fn each_tick_reschedules() {
    let (mut session, _input, scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    let mut surface = RecordingSurface::new();
    for _ in 0..5 {
        assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 221 });
    }
    assert_eq!(scheduler.0.borrow().requested, 6);
    assert_eq!(session.ticks(), 5);
}

#[test]
fn stop_is_idempotent_and_cancels_pending_frame() {
    let (mut session, input, scheduler) = session(Preset::Arrows);
    session.stop();
    assert_eq!(session.state(), LoopState::Idle);
    assert_eq!(input.0.borrow().stops, 0);

    session.start(viewport(800.0, 600.0)).unwrap();
    session.stop();
    session.stop();
    assert_eq!(session.state(), LoopState::Stopped);
    assert_eq!(input.0.borrow().stops, 1);
    assert!(!input.0.borrow().listening);
    assert_eq!(scheduler.0.borrow().cancelled, vec![FrameHandle(1)]);

    let mut surface = RecordingSurface::new();
    assert_eq!(session.tick(&mut surface), TickOutcome::Skipped);
    assert!(surface.calls().is_empty());
}

#[test]
fn stopped_session_can_start_again() {
    let (mut session, input, _scheduler) = session(Preset::Lines);
    session.start(viewport(100.0, 100.0)).unwrap();
    session.stop();
    session.start(viewport(200.0, 100.0)).unwrap();
    assert_eq!(session.state(), LoopState::Running);
    assert_eq!(input.0.borrow().starts, 2);
    assert_eq!(session.agents().len(), 5 * 3);
}

#[test]
fn failed_setup_releases_listeners() {
    let (mut session, input, scheduler) = session(Preset::Arrows);
    scheduler.0.borrow_mut().fail = true;
    assert!(session.start(viewport(800.0, 600.0)).is_err());
    assert_eq!(session.state(), LoopState::Idle);
    assert_eq!(input.0.borrow().starts, 1);
    assert_eq!(input.0.borrow().stops, 1);
    assert!(!input.0.borrow().listening);
}

#[test]
fn dropping_a_running_session_releases_everything() {
    let (mut session, input, scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    drop(session);
    assert!(!input.0.borrow().listening);
    assert_eq!(scheduler.0.borrow().cancelled.len(), 1);
}

#[test]
fn lost_surface_stops_session_once() {
    let (mut session, input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    let mut surface = RecordingSurface::new();
    session.tick(&mut surface);
    surface.detach();
    assert_eq!(session.tick(&mut surface), TickOutcome::SurfaceLost);
    assert_eq!(session.state(), LoopState::Stopped);
    assert_eq!(session.tick(&mut surface), TickOutcome::Skipped);
    assert_eq!(input.0.borrow().stops, 1);
}

// Per-tick behaviour

#[test]
fn resize_takes_effect_at_next_tick_boundary() {
    let (mut session, input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    let mut surface = RecordingSurface::new();

    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 221 });
    let first = FrameSummary::from_calls(&surface.take_calls());
    assert_eq!(first.strokes, 221);

    input.push(InputEvent::Resize {
        width: 400.0,
        height: 600.0,
    });
    assert_eq!(session.agents().len(), 221);

    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 117 });
    let second = FrameSummary::from_calls(&surface.take_calls());
    assert_eq!(second.clears, 1);
    assert_eq!(second.strokes, 117);
    assert_eq!(session.viewport(), viewport(400.0, 600.0));
}

#[test]
fn invalid_resize_is_ignored() {
    let (mut session, input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    input.push(InputEvent::Resize {
        width: -1.0,
        height: 600.0,
    });
    let mut surface = RecordingSurface::new();
    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 221 });
}

#[test]
fn zero_area_viewport_renders_nothing() {
    let (mut session, _input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(0.0, 0.0)).unwrap();
    let mut surface = RecordingSurface::new();
    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 0 });
    assert_eq!(FrameSummary::from_calls(surface.calls()).strokes, 0);
}

#[test]
fn pointer_outside_canvas_keeps_last_position() {
    let (mut session, input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    input.move_to(400.0, 300.0);
    input.move_to(900.0, 300.0);
    session.tick(&mut RecordingSurface::new());
    assert_eq!((session.pointer().x, session.pointer().y), (400.0, 300.0));
}

#[test]
fn every_agent_in_a_tick_sees_the_same_pointer() {
    let (mut session, input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    input.move_to(123.0, 456.0);
    session.tick(&mut RecordingSurface::new());
    let pointer = DVec2::new(123.0, 456.0);
    for agent in session.agents() {
        let d = pointer - agent.anchor();
        assert_eq!(agent.angle(), d.y.atan2(d.x));
    }
}

#[test]
fn hover_reveal_grows_then_retracts() {
    let (mut session, input, _scheduler) = session(Preset::Points);
    session.start(viewport(800.0, 600.0)).unwrap();
    let mut surface = RecordingSurface::new();

    session.tick(&mut surface);
    let idle = FrameSummary::from_calls(&surface.take_calls());
    assert_eq!(idle.fills, session.agents().len());
    assert_eq!(idle.strokes, 0);

    input.push(InputEvent::PointerEnter);
    input.move_to(401.0, 299.0);
    assert!(!session.hovered());
    for n in 1..=30u32 {
        session.tick(&mut surface);
        let expected = (f64::from(n) * 0.05).min(20.0);
        assert!((session.reveal_length() - expected).abs() < 1e-9);
    }
    assert!(session.hovered());
    let hovered = FrameSummary::from_calls(&surface.take_calls());
    assert_eq!(hovered.fills, 0);

    input.push(InputEvent::PointerLeave);
    for _ in 0..10 {
        session.tick(&mut surface);
    }
    assert!(!session.hovered());
    assert!((session.reveal_length() - 1.0).abs() < 1e-9);
    for _ in 0..100 {
        session.tick(&mut surface);
    }
    assert_eq!(session.reveal_length(), 0.0);
}

#[test]
fn background_is_filled_after_clear() {
    let (mut session, _input, _scheduler) = session(Preset::ArrowsPlay);
    session.start(viewport(1200.0, 800.0)).unwrap();
    let mut surface = RecordingSurface::new();
    session.tick(&mut surface);
    let calls = surface.calls();
    assert!(matches!(calls[0], DrawCall::Clear { .. }));
    assert!(matches!(calls[1], DrawCall::FillRect { .. }));
    // 11 x 7 lattice minus the 3 x 3 block under the centred overlay.
    assert_eq!(session.agents().len(), 77 - 9);
}

#[test]
fn switching_preset_rebuilds_on_next_tick() {
    let (mut session, _input, _scheduler) = session(Preset::Arrows);
    session.start(viewport(1100.0, 600.0)).unwrap();
    session.set_config(Preset::ArrowsLimit.config()).unwrap();
    assert_eq!(session.agents().len(), 23 * 13);
    assert_eq!(
        session.tick(&mut RecordingSurface::new()),
        TickOutcome::Rendered { agents: 50 }
    );
}

#[test]
fn too_dense_lattice_renders_empty_frame_and_keeps_running() {
    let (mut session, _input, scheduler) = session(Preset::Arrows);
    session.start(viewport(800.0, 600.0)).unwrap();
    let dense = quiver_core::EffectConfig {
        layout: Layout::Lattice(LatticeGrid::new(0.01)),
        ..Preset::Arrows.config()
    };
    session.set_config(dense).unwrap();

    let mut surface = RecordingSurface::new();
    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 0 });
    assert_eq!(session.state(), LoopState::Running);
    let summary = FrameSummary::from_calls(surface.calls());
    assert_eq!((summary.clears, summary.strokes), (1, 0));
    assert_eq!(scheduler.0.borrow().requested, 2);

    // Back to a sane spacing, the next tick rebuilds normally.
    session.set_config(Preset::Arrows.config()).unwrap();
    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 221 });
}

#[test]
fn resize_past_the_agent_limit_is_skipped() {
    let (mut session, input, _scheduler) = session(Preset::Lines);
    session.start(viewport(800.0, 600.0)).unwrap();
    input.push(InputEvent::Resize {
        width: 100_000.0,
        height: 100_000.0,
    });
    let mut surface = RecordingSurface::new();
    assert_eq!(session.tick(&mut surface), TickOutcome::Rendered { agents: 0 });
    assert_eq!(session.viewport(), viewport(100_000.0, 100_000.0));
}
