use std::cell::RefCell;
use std::rc::Rc;

use quiver_platform::{InputEvent, InputSource};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::canvas_rect_from;
use crate::error::WebError;

type Queue = Rc<RefCell<Vec<InputEvent>>>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Pointer moves and resizes come from the window, hover from the canvas.
/// Events queue up between frames and are handed over on `drain`.
pub struct DomInput {
    window: Window,
    canvas: HtmlCanvasElement,
    queue: Queue,
    listeners: Vec<Listener>,
}

impl DomInput {
    pub fn new(window: Window, canvas: HtmlCanvasElement) -> Self {
        Self {
            window,
            canvas,
            queue: Rc::new(RefCell::new(Vec::new())),
            listeners: Vec::new(),
        }
    }

    fn listen(
        &mut self,
        target: EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), WebError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|e| WebError::js("addEventListener", &e))?;
        self.listeners.push(Listener { target, kind, callback });
        Ok(())
    }

    fn register(&mut self) -> Result<(), WebError> {
        let window_target: EventTarget = self.window.clone().into();
        let canvas_target: EventTarget = self.canvas.clone().into();

        let queue = Rc::clone(&self.queue);
        let canvas = self.canvas.clone();
        self.listen(window_target.clone(), "mousemove", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let rect = canvas.get_bounding_client_rect();
            let bounds = canvas_rect_from(
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
                f64::from(canvas.width()),
            );
            queue.borrow_mut().push(InputEvent::PointerMove {
                client_x: f64::from(mouse.client_x()),
                client_y: f64::from(mouse.client_y()),
                bounds,
            });
        })?;

        let queue = Rc::clone(&self.queue);
        let canvas = self.canvas.clone();
        let window = self.window.clone();
        self.listen(window_target, "resize", move |_| {
            let (Some(width), Some(height)) = (
                window.inner_width().ok().and_then(|v| v.as_f64()),
                window.inner_height().ok().and_then(|v| v.as_f64()),
            ) else {
                warn!("resize without readable window size");
                return;
            };
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
            queue.borrow_mut().push(InputEvent::Resize { width, height });
        })?;

        let queue = Rc::clone(&self.queue);
        self.listen(canvas_target.clone(), "mouseenter", move |_| {
            queue.borrow_mut().push(InputEvent::PointerEnter);
        })?;

        let queue = Rc::clone(&self.queue);
        self.listen(canvas_target, "mouseleave", move |_| {
            queue.borrow_mut().push(InputEvent::PointerLeave);
        })?;
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), WebError> {
        let mut first_error = None;
        for listener in self.listeners.drain(..) {
            if let Err(e) = listener
                .target
                .remove_event_listener_with_callback(
                    listener.kind,
                    listener.callback.as_ref().unchecked_ref(),
                )
            {
                first_error.get_or_insert(WebError::js("removeEventListener", &e));
            }
        }
        self.queue.borrow_mut().clear();
        first_error.map_or(Ok(()), Err)
    }
}

impl InputSource for DomInput {
    fn start(&mut self) -> quiver_platform::Result<()> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.register() {
            // Don't leave half the listeners behind.
            let _ = self.unregister();
            return Err(e.into());
        }
        debug!("registered {} DOM listeners", self.listeners.len());
        Ok(())
    }

    fn stop(&mut self) -> quiver_platform::Result<()> {
        self.unregister()?;
        Ok(())
    }

    fn drain(&mut self, out: &mut Vec<InputEvent>) {
        out.append(&mut self.queue.borrow_mut());
    }
}

impl Drop for DomInput {
    fn drop(&mut self) {
        if let Err(e) = self.unregister() {
            warn!("failed to remove DOM listeners: {e}");
        }
    }
}
