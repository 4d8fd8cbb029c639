use std::cell::RefCell;
use std::rc::{Rc, Weak};

use quiver_core::{AnimationSession, EffectConfig, LoopState, Preset, TickOutcome, Viewport};
use tracing::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::error::WebError;
use crate::input::DomInput;
use crate::raf::RafScheduler;

type WebSession = AnimationSession<DomInput, RafScheduler>;

/// One effect bound to a canvas. The loop runs until `stop` is called, the
/// canvas leaves the document, or the object is freed from JS (dropping the
/// session cancels the pending frame and removes the listeners).
#[wasm_bindgen]
pub struct QuiverEffect {
    canvas: HtmlCanvasElement,
    session: Rc<RefCell<WebSession>>,
}

#[wasm_bindgen]
impl QuiverEffect {
    /// Binds `preset` to the canvas with id `canvas_id`, sizes the canvas to
    /// the window and starts animating.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, preset: &str) -> Result<QuiverEffect, JsValue> {
        let config = preset.parse::<Preset>().map_err(WebError::from)?.config();
        Ok(Self::with_config(canvas_id, config)?)
    }

    /// Same as the constructor, with an effect described in TOML.
    #[wasm_bindgen(js_name = fromToml)]
    pub fn from_toml(canvas_id: &str, toml: &str) -> Result<QuiverEffect, JsValue> {
        let config = EffectConfig::from_toml_str(toml).map_err(WebError::from)?;
        Ok(Self::with_config(canvas_id, config)?)
    }

    pub fn stop(&self) -> Result<(), JsValue> {
        self.session()?.stop();
        Ok(())
    }

    /// Resumes a stopped effect at the canvas's current size.
    pub fn start(&self) -> Result<(), JsValue> {
        let viewport = canvas_viewport(&self.canvas)?;
        self.session()?.start(viewport).map_err(WebError::from)?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.session
            .try_borrow()
            .map(|s| s.state() == LoopState::Running)
            .unwrap_or(true)
    }

    #[wasm_bindgen(js_name = setPreset)]
    pub fn set_preset(&self, name: &str) -> Result<(), JsValue> {
        let preset = name.parse::<Preset>().map_err(WebError::from)?;
        self.session()?.set_config(preset.config()).map_err(WebError::from)?;
        info!("switched to {preset}");
        Ok(())
    }

    #[wasm_bindgen(js_name = loadConfig)]
    pub fn load_config(&self, toml: &str) -> Result<(), JsValue> {
        let config = EffectConfig::from_toml_str(toml).map_err(WebError::from)?;
        self.session()?.set_config(config).map_err(WebError::from)?;
        Ok(())
    }
}

impl QuiverEffect {
    fn with_config(canvas_id: &str, config: EffectConfig) -> Result<QuiverEffect, WebError> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let document = window.document().ok_or(WebError::NoDocument)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| WebError::CanvasNotFound(canvas_id.to_owned()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| WebError::NotACanvas(canvas_id.to_owned()))?;

        fit_to_window(&window, &canvas)?;
        let viewport = canvas_viewport(&canvas)?;
        let mut surface = CanvasSurface::new(canvas.clone())?;

        let scheduler = RafScheduler::new(window.clone());
        let callback = scheduler.callback();
        let input = DomInput::new(window, canvas.clone());
        let session = Rc::new(RefCell::new(AnimationSession::new(config, input, scheduler)?));

        let weak: Weak<RefCell<WebSession>> = Rc::downgrade(&session);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
            let Some(session) = weak.upgrade() else {
                return;
            };
            let Ok(mut session) = session.try_borrow_mut() else {
                warn!("frame fired while the effect was borrowed; dropping it");
                return;
            };
            if session.tick(&mut surface) == TickOutcome::SurfaceLost {
                web_sys::console::warn_1(&"quiver: canvas lost, animation stopped".into());
            }
        }) as Box<dyn FnMut(f64)>));

        session.borrow_mut().start(viewport)?;
        info!("effect attached to #{canvas_id}");
        Ok(QuiverEffect {
            canvas,
            session,
        })
    }

    fn session(&self) -> Result<std::cell::RefMut<'_, WebSession>, WebError> {
        self.session.try_borrow_mut().map_err(|_| WebError::Busy)
    }
}

fn fit_to_window(window: &Window, canvas: &HtmlCanvasElement) -> Result<(), WebError> {
    let width = window
        .inner_width()
        .map_err(|e| WebError::js("innerWidth", &e))?
        .as_f64()
        .unwrap_or_default();
    let height = window
        .inner_height()
        .map_err(|e| WebError::js("innerHeight", &e))?
        .as_f64()
        .unwrap_or_default();
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    Ok(())
}

fn canvas_viewport(canvas: &HtmlCanvasElement) -> Result<Viewport, WebError> {
    Ok(Viewport::new(f64::from(canvas.width()), f64::from(canvas.height()))?)
}
