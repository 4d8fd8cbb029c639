//! The per-frame update/render loop.

use quiver_platform::{FrameHandle, FrameScheduler, InputEvent, InputSource, Surface};
use tracing::{debug, info, trace, warn};

use crate::agent::{AgentSet, FrameInput, Style};
use crate::config::{Behavior, EffectConfig};
use crate::error::{EngineError, EngineResult};
use crate::hover::HoverRamp;
use crate::pointer::{PointerState, PointerTracker};
use crate::viewport::{Viewport, ViewportManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running; nothing was drawn.
    Skipped,
    Rendered { agents: usize },
    /// The surface failed mid-frame and the session stopped itself.
    SurfaceLost,
}

/// One running effect: owns the pointer, the agent set and the lifecycle of
/// the host's listeners and frame callback.
pub struct AnimationSession<I: InputSource, F: FrameScheduler> {
    config: EffectConfig,
    input: I,
    scheduler: F,
    state: LoopState,
    viewport: ViewportManager,
    pending_viewport: Option<Viewport>,
    rebuild_pending: bool,
    pointer: PointerTracker,
    hovered: bool,
    reveal: HoverRamp,
    agents: AgentSet,
    frame: Option<FrameHandle>,
    events: Vec<InputEvent>,
    ticks: u64,
}

impl<I: InputSource, F: FrameScheduler> AnimationSession<I, F> {
    pub fn new(config: EffectConfig, input: I, scheduler: F) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            input,
            scheduler,
            state: LoopState::Idle,
            viewport: ViewportManager::default(),
            pending_viewport: None,
            rebuild_pending: false,
            pointer: PointerTracker::new(config.pointer_mapping),
            hovered: false,
            reveal: reveal_ramp(&config.behavior),
            agents: AgentSet::default(),
            frame: None,
            events: Vec::new(),
            ticks: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.current()
    }

    pub fn agents(&self) -> &AgentSet {
        &self.agents
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer.current()
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn reveal_length(&self) -> f64 {
        self.reveal.value()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Idle or Stopped -> Running. Listeners are released again if any later
    /// setup step fails.
    pub fn start(&mut self, viewport: Viewport) -> EngineResult<()> {
        if self.state == LoopState::Running {
            return Ok(());
        }
        self.input
            .start()
            .map_err(|e| EngineError::Platform(e.to_string()))?;

        self.viewport = ViewportManager::new(viewport);
        self.pending_viewport = None;
        self.rebuild_pending = false;
        self.rebuild();

        match self.scheduler.request_frame() {
            Ok(handle) => self.frame = Some(handle),
            Err(e) => {
                if let Err(stop_err) = self.input.stop() {
                    warn!("failed to release input after setup error: {stop_err}");
                }
                return Err(EngineError::Platform(e.to_string()));
            }
        }

        self.state = LoopState::Running;
        info!(
            "session started: {}x{} viewport, {} agents",
            viewport.width,
            viewport.height,
            self.agents.len()
        );
        Ok(())
    }

    /// Cancels the pending frame and releases listeners. Safe to call any
    /// number of times, including before `start`.
    pub fn stop(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        self.release();
        self.state = LoopState::Stopped;
        info!("session stopped after {} ticks", self.ticks);
    }

    /// Swaps the effect; the agent set is rebuilt at the next tick boundary.
    pub fn set_config(&mut self, config: EffectConfig) -> EngineResult<()> {
        config.validate()?;
        self.config = config;
        self.pointer.set_mapping(config.pointer_mapping);
        self.reveal = reveal_ramp(&config.behavior);
        self.rebuild_pending = true;
        Ok(())
    }

    /// Applies one host event. Pointer and hover changes are visible to the
    /// next tick; resizes are staged and swapped in at the next tick boundary.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove {
                client_x,
                client_y,
                bounds,
            } => {
                self.pointer.on_move(client_x, client_y, bounds);
            }
            InputEvent::Resize { width, height } => match Viewport::new(width, height) {
                Ok(next) => self.pending_viewport = Some(next),
                Err(e) => warn!("ignoring resize: {e}"),
            },
            InputEvent::PointerEnter => self.hovered = true,
            InputEvent::PointerLeave => self.hovered = false,
        }
    }

    pub fn tick(&mut self, surface: &mut dyn Surface) -> TickOutcome {
        if self.state != LoopState::Running {
            return TickOutcome::Skipped;
        }
        self.frame = None;

        let mut events = std::mem::take(&mut self.events);
        self.input.drain(&mut events);
        for event in events.drain(..) {
            self.handle_event(event);
        }
        self.events = events;

        if let Some(next) = self.pending_viewport.take() {
            if let Err(e) = self.viewport.resize(next.width, next.height) {
                warn!("ignoring resize: {e}");
            }
            self.rebuild_pending = true;
        }
        if self.rebuild_pending {
            self.rebuild_pending = false;
            self.rebuild();
        }

        let frame = FrameInput {
            pointer: self.pointer.current().as_vec(),
            hovered: self.hovered,
            reveal_length: self.reveal.advance(self.hovered),
        };

        if let Err(e) = self.draw(surface, &frame) {
            warn!("surface lost, stopping session: {e}");
            self.stop();
            return TickOutcome::SurfaceLost;
        }
        self.ticks += 1;
        trace!("tick {} rendered {} agents", self.ticks, self.agents.len());

        match self.scheduler.request_frame() {
            Ok(handle) => self.frame = Some(handle),
            Err(e) => {
                warn!("could not schedule next frame, stopping session: {e}");
                self.stop();
            }
        }
        TickOutcome::Rendered {
            agents: self.agents.len(),
        }
    }

    fn draw(
        &mut self,
        surface: &mut dyn Surface,
        frame: &FrameInput,
    ) -> quiver_platform::Result<()> {
        let viewport = self.agents.viewport();
        surface.clear(0.0, 0.0, viewport.width, viewport.height)?;
        if let Some(background) = self.config.background {
            surface.fill_rect(0.0, 0.0, viewport.width, viewport.height, background)?;
        }
        let style = Style {
            glyph: self.config.glyph,
            color: self.config.stroke_color,
            width: self.config.stroke_width,
        };
        for agent in self.agents.iter_mut() {
            agent.update(frame);
            agent.render(surface, &style)?;
        }
        Ok(())
    }

    fn rebuild(&mut self) {
        let viewport = self.viewport.current();
        self.agents = match AgentSet::build(viewport, &self.config.layout, self.config.behavior) {
            Ok(agents) => agents,
            Err(e) => {
                warn!("skipping layout for {}x{}: {e}", viewport.width, viewport.height);
                AgentSet::empty(viewport)
            }
        };
        debug!(
            "rebuilt agent set: {} agents for {}x{}",
            self.agents.len(),
            viewport.width,
            viewport.height
        );
    }

    fn release(&mut self) {
        if let Some(handle) = self.frame.take() {
            if let Err(e) = self.scheduler.cancel_frame(handle) {
                warn!("failed to cancel frame {handle:?}: {e}");
            }
        }
        if let Err(e) = self.input.stop() {
            warn!("failed to stop input source: {e}");
        }
    }
}

impl<I: InputSource, F: FrameScheduler> Drop for AnimationSession<I, F> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn reveal_ramp(behavior: &Behavior) -> HoverRamp {
    match *behavior {
        Behavior::HoverReveal { max_length, step, .. } => HoverRamp::new(max_length, step),
        _ => HoverRamp::new(0.0, 0.0),
    }
}
