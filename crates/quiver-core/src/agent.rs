//! Pointer-reactive visual elements.
//!
//! Every agent reads only its own anchor, its own previous state and the
//! shared per-tick [`FrameInput`]; agents never look at each other.

use std::f64::consts::TAU;

use glam::DVec2;
use quiver_platform::{Rgba, Surface};

use crate::config::{ArrowGlyph, Behavior, Layout};
use crate::error::EngineResult;
use crate::grid;
use crate::viewport::Viewport;

/// Below this distance the pointer is considered to sit on the anchor.
const MIN_DIRECTION_LENGTH: f64 = 1e-9;

/// Shared state every agent sees during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub pointer: DVec2,
    pub hovered: bool,
    /// Current length of hover-revealed segments.
    pub reveal_length: f64,
}

/// Stroke parameters shared by an agent set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub glyph: ArrowGlyph,
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    kind: Behavior,
    anchor: DVec2,
    /// Filtered pointer offset; only the eased kind carries it across ticks.
    offset: DVec2,
    angle: f64,
    alpha: f64,
    length: f64,
    hovered: bool,
}

impl Agent {
    pub fn new(kind: Behavior, anchor: DVec2) -> Self {
        Self {
            kind,
            anchor,
            offset: DVec2::ZERO,
            angle: 0.0,
            alpha: 1.0,
            length: 0.0,
            hovered: false,
        }
    }

    pub fn anchor(&self) -> DVec2 {
        self.anchor
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Drawn segment length for the segment kinds.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn update(&mut self, frame: &FrameInput) {
        let target = frame.pointer - self.anchor;
        if !target.is_finite() {
            return;
        }
        match self.kind {
            Behavior::Immediate => {
                self.offset = target;
                self.angle = target.y.atan2(target.x);
            }
            Behavior::Eased { ease } => {
                self.offset += (target - self.offset) * ease;
                self.angle = self.offset.y.atan2(self.offset.x);
            }
            Behavior::Faded { max_distance } => {
                self.offset = target;
                self.angle = target.y.atan2(target.x);
                self.alpha = fade_alpha(target.length(), max_distance);
            }
            Behavior::Segment { length } => {
                self.offset = target;
                self.length = if target.length() < MIN_DIRECTION_LENGTH { 0.0 } else { length };
            }
            Behavior::HoverReveal { .. } => {
                self.offset = target;
                self.hovered = frame.hovered;
                self.length = if target.length() < MIN_DIRECTION_LENGTH {
                    0.0
                } else {
                    frame.reveal_length
                };
            }
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, style: &Style) -> quiver_platform::Result<()> {
        match self.kind {
            Behavior::Immediate | Behavior::Eased { .. } => {
                self.draw_arrow(surface, style, style.color)
            }
            Behavior::Faded { .. } => {
                self.draw_arrow(surface, style, style.color.fade(self.alpha as f32))
            }
            Behavior::Segment { .. } => self.draw_segment(surface, style),
            Behavior::HoverReveal { dot_radius, .. } => {
                if self.hovered {
                    self.draw_segment(surface, style)
                } else {
                    surface.begin_path();
                    surface.arc(self.anchor.x, self.anchor.y, dot_radius, 0.0, TAU);
                    surface.fill(style.color)
                }
            }
        }
    }

    fn draw_arrow(
        &self,
        surface: &mut dyn Surface,
        style: &Style,
        color: Rgba,
    ) -> quiver_platform::Result<()> {
        let g = style.glyph;
        let rotation = DVec2::from_angle(self.angle);
        let place = |x: f64, y: f64| self.anchor + rotation.rotate(DVec2::new(x, y));
        let tip = place(g.tip, 0.0);
        let tail = place(g.tail, 0.0);
        let barb_left = place(g.barb_x, -g.barb_y);
        let barb_right = place(g.barb_x, g.barb_y);

        surface.begin_path();
        surface.move_to(tip.x, tip.y);
        surface.line_to(tail.x, tail.y);
        surface.move_to(tip.x, tip.y);
        surface.line_to(barb_left.x, barb_left.y);
        surface.move_to(tip.x, tip.y);
        surface.line_to(barb_right.x, barb_right.y);
        surface.stroke(style.width, color)
    }

    fn draw_segment(
        &self,
        surface: &mut dyn Surface,
        style: &Style,
    ) -> quiver_platform::Result<()> {
        if self.length <= 0.0 {
            return Ok(());
        }
        let end = self.anchor + self.offset.normalize_or_zero() * self.length;
        surface.begin_path();
        surface.move_to(self.anchor.x, self.anchor.y);
        surface.line_to(end.x, end.y);
        surface.stroke(style.width, style.color)
    }
}

/// `1` on the pointer, `0` at and beyond `max_distance`, linear in between.
pub fn fade_alpha(distance: f64, max_distance: f64) -> f64 {
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

/// All agents for one viewport. Rebuilt wholesale on resize.
#[derive(Debug, Clone, Default)]
pub struct AgentSet {
    viewport: Viewport,
    agents: Vec<Agent>,
}

impl AgentSet {
    pub fn build(viewport: Viewport, layout: &Layout, kind: Behavior) -> EngineResult<Self> {
        let agents = grid::anchors(viewport, layout)?
            .into_iter()
            .map(|anchor| Agent::new(kind, anchor))
            .collect();
        Ok(Self { viewport, agents })
    }

    /// No agents, but still clears `viewport` each tick.
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            agents: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Agent> {
        self.agents.iter_mut()
    }
}

impl<'a> IntoIterator for &'a AgentSet {
    type Item = &'a Agent;
    type IntoIter = std::slice::Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}
