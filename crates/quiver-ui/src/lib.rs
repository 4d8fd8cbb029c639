use crossbeam_channel::{Receiver, Sender};
use quiver_core::{AnimationSession, EffectConfig, LoopState, Preset, TickOutcome, Viewport};
use quiver_platform::{CanvasRect, FrameScheduler, InputEvent, Surface};
use tracing::{info, warn};

pub mod host;

use crate::host::{EguiInput, RepaintScheduler, ShapeSurface};

pub enum UiCommand {
    Show,
    SelectPreset(Preset),
    LoadConfig(Box<EffectConfig>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    EffectChanged(String),
    SessionStopped,
}

pub struct UiHandles {
    pub command_sender: Sender<UiCommand>,
    pub event_receiver: Receiver<UiEvent>,
}

struct UiEndpoints {
    command_receiver: Receiver<UiCommand>,
    event_sender: Sender<UiEvent>,
}

/// Creates the channel pair for talking to the window from other threads.
pub fn ui_channels() -> (
    UiHandles,
    impl FnOnce(EffectConfig, Option<Preset>) -> quiver_platform::Result<()>,
) {
    let (command_sender, command_receiver) = crossbeam_channel::unbounded::<UiCommand>();
    let (event_sender, event_receiver) = crossbeam_channel::unbounded::<UiEvent>();
    let endpoints = UiEndpoints {
        command_receiver,
        event_sender,
    };
    let run = move |config: EffectConfig, preset: Option<Preset>| run_ui(config, preset, endpoints);
    (
        UiHandles {
            command_sender,
            event_receiver,
        },
        run,
    )
}

/// Opens the window and blocks until it is closed. Must run on the main thread.
fn run_ui(
    config: EffectConfig,
    preset: Option<Preset>,
    endpoints: UiEndpoints,
) -> quiver_platform::Result<()> {
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Quiver",
        native_options,
        Box::new(move |creation_context| {
            let (pending_command_sender, pending_command_receiver) =
                crossbeam_channel::unbounded::<UiCommand>();
            let egui_context = creation_context.egui_ctx.clone();
            let command_receiver = endpoints.command_receiver;
            std::thread::spawn(move || {
                // Block on incoming commands from other threads and wake egui per message
                while let Ok(incoming) = command_receiver.recv() {
                    match incoming {
                        UiCommand::Show => {
                            info!("UI forwarder: Show -> Visible(true) + Focus");
                            egui_context.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                            egui_context.send_viewport_cmd(egui::ViewportCommand::Focus);
                        }
                        other => {
                            if pending_command_sender.send(other).is_err() {
                                break;
                            }
                        }
                    }
                    egui_context.request_repaint();
                }
            });

            let session = AnimationSession::new(
                config,
                EguiInput::new(),
                RepaintScheduler::new(creation_context.egui_ctx.clone()),
            )
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;
            Ok(Box::new(QuiverApp {
                session,
                preset,
                pending_command_receiver,
                event_sender: endpoints.event_sender,
                canvas: None,
                hovered: false,
            }))
        }),
    )
    .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { e.to_string().into() })
}

pub struct QuiverApp {
    session: AnimationSession<EguiInput, RepaintScheduler>,
    preset: Option<Preset>,
    pending_command_receiver: Receiver<UiCommand>,
    event_sender: Sender<UiEvent>,
    canvas: Option<egui::Rect>,
    hovered: bool,
}

impl QuiverApp {
    fn apply_config(&mut self, config: EffectConfig, label: String) {
        match self.session.set_config(config) {
            Ok(()) => {
                info!("UI: switched effect to {label}");
                let _ = self.event_sender.send(UiEvent::EffectChanged(label));
            }
            Err(e) => warn!("UI: rejected effect {label}: {e}"),
        }
    }

    fn process_commands(&mut self) {
        while let Ok(command) = self.pending_command_receiver.try_recv() {
            match command {
                UiCommand::Show => {}
                UiCommand::SelectPreset(preset) => {
                    self.preset = Some(preset);
                    self.apply_config(preset.config(), preset.name().to_owned());
                }
                UiCommand::LoadConfig(config) => {
                    self.preset = None;
                    self.apply_config(*config, "custom config".to_owned());
                }
            }
        }
    }

    fn preset_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut selected = self.preset;
            for preset in Preset::ALL {
                ui.selectable_value(&mut selected, Some(preset), preset.name());
            }
            if selected != self.preset {
                if let Some(preset) = selected {
                    self.preset = selected;
                    self.apply_config(preset.config(), preset.name().to_owned());
                }
            }
        });
    }

    /// Translates this frame's egui input into session events.
    fn feed_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let rect = response.rect;
        if self.session.state() != LoopState::Running {
            return;
        }
        let input = self.session.input_mut();
        if self.canvas != Some(rect) {
            input.push(InputEvent::Resize {
                width: f64::from(rect.width()),
                height: f64::from(rect.height()),
            });
            self.canvas = Some(rect);
        }
        let hovered = response.hovered();
        if hovered != self.hovered {
            input.push(if hovered {
                InputEvent::PointerEnter
            } else {
                InputEvent::PointerLeave
            });
            self.hovered = hovered;
        }
        if let Some(pos) = ctx.input(|i| i.pointer.latest_pos()) {
            input.push(InputEvent::PointerMove {
                client_x: f64::from(pos.x),
                client_y: f64::from(pos.y),
                bounds: CanvasRect::new(
                    f64::from(rect.left()),
                    f64::from(rect.top()),
                    f64::from(rect.width()),
                    f64::from(rect.height()),
                ),
            });
        }
    }
}

impl eframe::App for QuiverApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_commands();

        egui::TopBottomPanel::top("presets").show(context, |ui| self.preset_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(context, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                if self.session.state() != LoopState::Running {
                    let rect = response.rect;
                    let viewport = Viewport::new(f64::from(rect.width()), f64::from(rect.height()));
                    match viewport.and_then(|v| self.session.start(v)) {
                        Ok(()) => self.canvas = Some(rect),
                        Err(e) => {
                            warn!("UI: failed to start session: {e}");
                            return;
                        }
                    }
                }
                self.feed_input(context, &response);

                let mut surface = ShapeSurface::new(response.rect.min);
                let outcome = tick_and_report(&mut self.session, &mut surface, &self.event_sender);
                if let TickOutcome::Rendered { .. } = outcome {
                    painter.extend(surface.into_shapes());
                }
            });
    }
}

/// One tick, plus a `SessionStopped` event if that tick ended the run for
/// any reason (lost surface, failed reschedule).
fn tick_and_report<F: FrameScheduler>(
    session: &mut AnimationSession<EguiInput, F>,
    surface: &mut dyn Surface,
    events: &Sender<UiEvent>,
) -> TickOutcome {
    let was_running = session.state() == LoopState::Running;
    let outcome = session.tick(surface);
    if was_running && session.state() != LoopState::Running {
        warn!("UI: session stopped after {outcome:?}");
        let _ = events.send(UiEvent::SessionStopped);
    }
    outcome
}
