//! A `Surface` that records draw calls instead of rasterising them.

use glam::DVec2;
use quiver_platform::{Rgba, Surface};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum DrawCall {
    Clear {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgba,
    },
    Stroke {
        segments: Vec<(DVec2, DVec2)>,
        width: f64,
        color: Rgba,
    },
    Fill {
        arcs: usize,
        color: Rgba,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    cursor: Option<DVec2>,
    segments: Vec<(DVec2, DVec2)>,
    arcs: usize,
    detached: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Simulates the target going away: every later fallible call errors.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    fn check_attached(&self) -> quiver_platform::Result<()> {
        if self.detached {
            return Err("recording surface detached".into());
        }
        Ok(())
    }

    fn reset_path(&mut self) {
        self.cursor = None;
        self.segments.clear();
        self.arcs = 0;
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) -> quiver_platform::Result<()> {
        self.check_attached()?;
        self.calls.push(DrawCall::Clear { x, y, width, height });
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgba,
    ) -> quiver_platform::Result<()> {
        self.check_attached()?;
        self.calls.push(DrawCall::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
        Ok(())
    }

    fn begin_path(&mut self) {
        self.reset_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = Some(DVec2::new(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let to = DVec2::new(x, y);
        if let Some(from) = self.cursor {
            self.segments.push((from, to));
        }
        self.cursor = Some(to);
    }

    fn arc(&mut self, _cx: f64, _cy: f64, _radius: f64, _start_angle: f64, _end_angle: f64) {
        self.arcs += 1;
    }

    fn stroke(&mut self, width: f64, color: Rgba) -> quiver_platform::Result<()> {
        self.check_attached()?;
        self.calls.push(DrawCall::Stroke {
            segments: self.segments.clone(),
            width,
            color,
        });
        Ok(())
    }

    fn fill(&mut self, color: Rgba) -> quiver_platform::Result<()> {
        self.check_attached()?;
        self.calls.push(DrawCall::Fill { arcs: self.arcs, color });
        Ok(())
    }
}

/// Per-frame counts, cheap to log or serialise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameSummary {
    pub clears: usize,
    pub strokes: usize,
    pub segments: usize,
    pub fills: usize,
}

impl FrameSummary {
    pub fn from_calls(calls: &[DrawCall]) -> Self {
        calls.iter().fold(Self::default(), |mut acc, call| {
            match call {
                DrawCall::Clear { .. } => acc.clears += 1,
                DrawCall::FillRect { .. } => acc.fills += 1,
                DrawCall::Stroke { segments, .. } => {
                    acc.strokes += 1;
                    acc.segments += segments.len();
                }
                DrawCall::Fill { .. } => acc.fills += 1,
            }
            acc
        })
    }
}
