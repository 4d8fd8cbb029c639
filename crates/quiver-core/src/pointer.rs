use glam::DVec2;
use quiver_platform::CanvasRect;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Latest pointer position in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
}

impl PointerState {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// How client coordinates become canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerMapping {
    /// Subtract the canvas' top-left corner. Canvas pixels equal CSS pixels.
    #[default]
    Offset,
    /// Subtract the corner, then scale by `CanvasRect::pixel_ratio` so the
    /// result lands in backing-store pixels.
    BackingScale,
}

/// Single writer of the shared pointer state. Out-of-bounds moves leave the
/// state frozen at its last in-bounds value.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    mapping: PointerMapping,
    state: PointerState,
}

impl PointerTracker {
    pub fn new(mapping: PointerMapping) -> Self {
        Self {
            mapping,
            state: PointerState::default(),
        }
    }

    pub fn current(&self) -> PointerState {
        self.state
    }

    pub fn set_mapping(&mut self, mapping: PointerMapping) {
        self.mapping = mapping;
    }

    pub fn on_move(
        &mut self,
        client_x: f64,
        client_y: f64,
        bounds: CanvasRect,
    ) -> Option<PointerState> {
        if !client_x.is_finite() || !client_y.is_finite() {
            warn!("ignoring non-finite pointer ({client_x}, {client_y})");
            return None;
        }
        if !bounds.contains(client_x, client_y) {
            return None;
        }
        let mut local = DVec2::new(client_x - bounds.left, client_y - bounds.top);
        let ratio = bounds.pixel_ratio;
        if self.mapping == PointerMapping::BackingScale && ratio.is_finite() && ratio > 0.0 {
            local *= ratio;
        }
        self.state = PointerState::new(local.x, local.y);
        Some(self.state)
    }
}
