use thiserror::Error;
use wasm_bindgen::JsValue;

/// Browser-side failures. JS exceptions are kept as their debug text so the
/// error stays `Send + Sync` for the platform traits.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("window is not available")]
    NoWindow,

    #[error("document is not available")]
    NoDocument,

    #[error("no canvas element with id {0:?}")]
    CanvasNotFound(String),

    #[error("element {0:?} is not a canvas")]
    NotACanvas(String),

    #[error("2d context unavailable: {0}")]
    Context(String),

    #[error("canvas is no longer attached to the document")]
    Detached,

    #[error("effect is busy rendering a frame")]
    Busy,

    #[error("{what} failed: {message}")]
    Js { what: &'static str, message: String },

    #[error(transparent)]
    Engine(#[from] quiver_core::EngineError),
}

impl WebError {
    pub fn js(what: &'static str, value: &JsValue) -> Self {
        WebError::Js {
            what,
            message: format!("{value:?}"),
        }
    }
}

impl From<WebError> for JsValue {
    fn from(e: WebError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
