use std::cell::RefCell;
use std::rc::Rc;

use quiver_platform::{FrameHandle, FrameScheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::WebError;

/// Slot for the frame callback. It is filled after the session exists, since
/// the callback needs a handle back to the session it ticks.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    pub fn callback(&self) -> FrameCallback {
        Rc::clone(&self.callback)
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> quiver_platform::Result<FrameHandle> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or(WebError::Js {
                what: "requestAnimationFrame",
                message: "no frame callback installed".into(),
            })?;
        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| WebError::js("requestAnimationFrame", &e))?;
        Ok(FrameHandle(id as u32 as u64))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> quiver_platform::Result<()> {
        self.window
            .cancel_animation_frame(handle.0 as u32 as i32)
            .map_err(|e| WebError::js("cancelAnimationFrame", &e))?;
        Ok(())
    }
}
