//! Browser host for the quiver effects: a 2D canvas surface, DOM listeners
//! and a `requestAnimationFrame` loop, exported to JS as `QuiverEffect`.
//!
//! Everything that touches the DOM only builds for `wasm32`; the rest stays
//! host-testable.

pub mod error;

pub use error::WebError;

use quiver_platform::CanvasRect;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod canvas;
        mod effect;
        mod input;
        mod raf;

        pub use effect::QuiverEffect;
    }
}

/// Canvas bounds as reported by `getBoundingClientRect`, plus the ratio of
/// backing-store pixels to CSS pixels. A collapsed canvas maps 1:1.
pub fn canvas_rect_from(
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    backing_width: f64,
) -> CanvasRect {
    let rect = CanvasRect::new(left, top, width, height);
    if width > 0.0 && backing_width > 0.0 {
        rect.with_pixel_ratio(backing_width / width)
    } else {
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_follows_backing_store() {
        let rect = canvas_rect_from(10.0, 20.0, 400.0, 300.0, 800.0);
        assert_eq!(rect.pixel_ratio, 2.0);
        assert_eq!(rect.right(), 410.0);
        assert_eq!(rect.bottom(), 320.0);
    }

    #[test]
    fn collapsed_canvas_maps_one_to_one() {
        assert_eq!(canvas_rect_from(0.0, 0.0, 0.0, 0.0, 300.0).pixel_ratio, 1.0);
        assert_eq!(canvas_rect_from(0.0, 0.0, 200.0, 100.0, 0.0).pixel_ratio, 1.0);
    }
}
