use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Canvas size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> EngineResult<Self> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(width) || !valid(height) {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Tracks the current viewport. A successful `resize` invalidates whatever
/// agent set was built for the previous size; the owner rebuilds it.
#[derive(Debug, Clone, Default)]
pub struct ViewportManager {
    current: Viewport,
}

impl ViewportManager {
    pub fn new(initial: Viewport) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn resize(&mut self, width: f64, height: f64) -> EngineResult<Viewport> {
        let next = Viewport::new(width, height)?;
        debug!(
            "viewport {}x{} -> {}x{}",
            self.current.width, self.current.height, next.width, next.height
        );
        self.current = next;
        Ok(next)
    }
}
