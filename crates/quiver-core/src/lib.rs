//! Quiver core engine: host-agnostic grid layout, pointer tracking and the
//! agent update/render loop behind the arrow, line and point effects.
//!
//! ```text
//! Viewport ──► grid::anchors ──► AgentSet
//! InputSource ──► PointerTracker ─┐
//!                                 ▼
//! FrameScheduler ──► AnimationSession::tick ──► Agent::update
//!                                                 │
//!                                                 ▼
//!                                  Surface ◄── Agent::render
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod grid;
pub mod hover;
pub mod pointer;
pub mod preset;
pub mod recording;
pub mod session;
pub mod viewport;

pub use agent::{Agent, AgentSet, FrameInput, Style};
pub use config::{
    ArrowGlyph, Behavior, EffectConfig, ExclusionRect, LatticeAlign, LatticeGrid, Layout,
};
pub use grid::MAX_AGENTS;
pub use error::{EngineError, EngineResult};
pub use pointer::{PointerMapping, PointerState, PointerTracker};
pub use preset::Preset;
pub use recording::{DrawCall, FrameSummary, RecordingSurface};
pub use session::{AnimationSession, LoopState, TickOutcome};
pub use viewport::{Viewport, ViewportManager};
