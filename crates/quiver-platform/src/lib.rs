//! Host abstraction traits so `quiver-core` stays independent of any window or browser.

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Straight (non-premultiplied) colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with its alpha multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: self.a * factor.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS `rgba()` string as expected by canvas `strokeStyle`/`fillStyle`.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }
}

/// Bounding rectangle of the canvas in client (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Backing-store pixels per CSS pixel (`canvas.width / rect.width`).
    pub pixel_ratio: f64,
}

impl CanvasRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(self, pixel_ratio: f64) -> Self {
        Self {
            pixel_ratio,
            ..self
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// Everything a host can tell the engine about the outside world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove {
        client_x: f64,
        client_y: f64,
        bounds: CanvasRect,
    },
    Resize {
        width: f64,
        height: f64,
    },
    PointerEnter,
    PointerLeave,
}

/// Opaque id of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Immediate-mode 2D drawing target (canvas 2D context, egui painter, recorder).
///
/// Path building never fails; `clear`, `fill_rect`, `stroke` and `fill` report
/// a lost or torn-down target through their `Result`.
pub trait Surface {
    fn clear(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()>;
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) -> Result<()>;
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64);
    fn stroke(&mut self, width: f64, color: Rgba) -> Result<()>;
    fn fill(&mut self, color: Rgba) -> Result<()>;
}

/// Source of pointer, hover and resize events. Listeners are registered in
/// `start` and released in `stop`; events queue up until `drain`.
pub trait InputSource {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn drain(&mut self, out: &mut Vec<InputEvent>);
}

/// "Call me again roughly once per display refresh."
pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rect_edges_are_inclusive() {
        let rect = CanvasRect::new(0.0, 0.0, 800.0, 600.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(800.0, 600.0));
        assert!(!rect.contains(800.5, 300.0));
        assert!(!rect.contains(400.0, -0.1));
    }

    #[test]
    fn fade_scales_alpha_only() {
        let c = Rgba::new(0.2, 0.4, 0.6, 0.8).fade(0.5);
        assert_eq!((c.r, c.g, c.b), (0.2, 0.4, 0.6));
        assert!((c.a - 0.4).abs() < 1e-6);
        assert_eq!(Rgba::WHITE.fade(-3.0).a, 0.0);
    }

    #[test]
    fn css_string_uses_byte_channels() {
        assert_eq!(Rgba::BLACK.to_css(), "rgba(0, 0, 0, 1)");
        assert_eq!(Rgba::new(1.0, 1.0, 1.0, 0.5).to_css(), "rgba(255, 255, 255, 0.5)");
    }
}
