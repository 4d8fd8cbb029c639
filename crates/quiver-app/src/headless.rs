//! Windowless runs: a scripted pointer sweep rendered into a `RecordingSurface`.

use std::f64::consts::TAU;
use std::io::Write;

use quiver_core::{
    AnimationSession, EffectConfig, EngineResult, FrameSummary, RecordingSurface, TickOutcome,
    Viewport,
};
use quiver_platform::{CanvasRect, FrameHandle, FrameScheduler, InputEvent, InputSource};
use serde::Serialize;
use tracing::{info, warn};

/// Moves the pointer once per drain along a circle around the canvas centre,
/// entering the canvas on the first drain.
struct SweepInput {
    bounds: CanvasRect,
    step: u64,
    frames: u64,
    listening: bool,
}

impl SweepInput {
    fn new(bounds: CanvasRect, frames: u64) -> Self {
        Self {
            bounds,
            step: 0,
            frames: frames.max(1),
            listening: false,
        }
    }
}

impl InputSource for SweepInput {
    fn start(&mut self) -> quiver_platform::Result<()> {
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) -> quiver_platform::Result<()> {
        self.listening = false;
        Ok(())
    }

    fn drain(&mut self, out: &mut Vec<InputEvent>) {
        if !self.listening {
            return;
        }
        if self.step == 0 {
            out.push(InputEvent::PointerEnter);
        }
        let t = self.step as f64 / self.frames as f64 * TAU;
        let radius = self.bounds.width.min(self.bounds.height) * 0.35;
        out.push(InputEvent::PointerMove {
            client_x: self.bounds.left + self.bounds.width / 2.0 + radius * t.cos(),
            client_y: self.bounds.top + self.bounds.height / 2.0 + radius * t.sin(),
            bounds: self.bounds,
        });
        self.step += 1;
    }
}

/// Every request is "granted" immediately; the caller drives ticks.
#[derive(Default)]
struct ManualScheduler {
    next: u64,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> quiver_platform::Result<FrameHandle> {
        self.next += 1;
        Ok(FrameHandle(self.next))
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) -> quiver_platform::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub agents: usize,
    pub pointer: (f64, f64),
    #[serde(flatten)]
    pub summary: FrameSummary,
}

pub fn run(config: EffectConfig, size: (f64, f64), frames: u64) -> EngineResult<Vec<FrameReport>> {
    let viewport = Viewport::new(size.0, size.1)?;
    let bounds = CanvasRect::new(0.0, 0.0, viewport.width, viewport.height);
    let input = SweepInput::new(bounds, frames);
    let mut session = AnimationSession::new(config, input, ManualScheduler::default())?;
    session.start(viewport)?;

    let mut surface = RecordingSurface::new();
    let mut reports = Vec::new();
    for frame in 0..frames {
        match session.tick(&mut surface) {
            TickOutcome::Rendered { agents } => {
                let pointer = session.pointer();
                reports.push(FrameReport {
                    frame,
                    agents,
                    pointer: (pointer.x, pointer.y),
                    summary: FrameSummary::from_calls(&surface.take_calls()),
                });
            }
            outcome => {
                warn!("headless run ended early at frame {frame}: {outcome:?}");
                break;
            }
        }
    }
    session.stop();
    info!("headless run rendered {} frames", reports.len());
    Ok(reports)
}

/// One JSON object per line.
pub fn write_reports(reports: &[FrameReport], mut out: impl Write) -> std::io::Result<()> {
    for report in reports {
        serde_json::to_writer(&mut out, report)?;
        writeln!(out)?;
    }
    Ok(())
}
