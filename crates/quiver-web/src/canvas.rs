use quiver_platform::{Rgba, Surface};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::WebError;

pub fn get_2d_context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, WebError> {
    canvas
        .get_context("2d")
        .map_err(|e| WebError::Context(format!("{e:?}")))?
        .ok_or_else(|| WebError::Context("getContext(\"2d\") returned null".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| WebError::Context("not a CanvasRenderingContext2d".into()))
}

/// `Surface` over a canvas 2D context. Drawing into a canvas that has been
/// removed from the document is reported as `WebError::Detached`.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    deferred: Option<WebError>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, WebError> {
        let ctx = get_2d_context(&canvas)?;
        Ok(Self {
            canvas,
            ctx,
            deferred: None,
        })
    }

    fn check(&mut self) -> quiver_platform::Result<()> {
        if let Some(e) = self.deferred.take() {
            return Err(e.into());
        }
        if !self.canvas.is_connected() {
            return Err(WebError::Detached.into());
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) -> quiver_platform::Result<()> {
        self.check()?;
        self.ctx.clear_rect(x, y, width, height);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgba,
    ) -> quiver_platform::Result<()> {
        self.check()?;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x, y, width, height);
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) {
        // Surfaced by the next stroke or fill.
        if let Err(e) = self.ctx.arc(cx, cy, radius, start_angle, end_angle) {
            self.deferred.get_or_insert(WebError::js("arc", &e));
        }
    }

    fn stroke(&mut self, width: f64, color: Rgba) -> quiver_platform::Result<()> {
        self.check()?;
        self.ctx.set_line_width(width);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.stroke();
        Ok(())
    }

    fn fill(&mut self, color: Rgba) -> quiver_platform::Result<()> {
        self.check()?;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mounted_canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document
            .create_element("canvas")
            .unwrap()
            .dyn_into::<HtmlCanvasElement>()
            .unwrap();
        document.body().unwrap().append_child(&canvas).unwrap();
        canvas
    }

    #[wasm_bindgen_test]
    fn removed_canvas_reports_detached() {
        let canvas = mounted_canvas();
        let mut surface = CanvasSurface::new(canvas.clone()).unwrap();
        surface.clear(0.0, 0.0, 10.0, 10.0).unwrap();
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(5.0, 5.0);
        surface.stroke(1.0, Rgba::BLACK).unwrap();

        canvas.remove();
        let err = surface.clear(0.0, 0.0, 10.0, 10.0).unwrap_err();
        assert_eq!(err.to_string(), WebError::Detached.to_string());
        assert!(surface.fill(Rgba::BLACK).is_err());
    }

    #[wasm_bindgen_test]
    fn failed_arc_surfaces_on_next_fill() {
        let canvas = mounted_canvas();
        let mut surface = CanvasSurface::new(canvas.clone()).unwrap();
        surface.begin_path();
        // Negative radius throws IndexSizeError.
        surface.arc(5.0, 5.0, -1.0, 0.0, 1.0);
        assert!(surface.fill(Rgba::BLACK).is_err());
        assert!(surface.fill(Rgba::BLACK).is_ok());
        canvas.remove();
    }
}
