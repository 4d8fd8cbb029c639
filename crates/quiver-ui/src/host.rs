//! egui-backed implementations of the platform traits.

use egui::{Color32, Pos2, Rect, Shape, Stroke, Vec2};
use quiver_platform::{FrameHandle, FrameScheduler, InputEvent, InputSource, Rgba, Surface};
use tracing::debug;

pub fn to_color32(color: Rgba) -> Color32 {
    let [r, g, b, a] = color.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Collects one frame of drawing as egui shapes, offset by the canvas origin.
/// egui repaints from scratch every frame, so `clear` only drops what was
/// collected so far.
pub struct ShapeSurface {
    origin: Vec2,
    shapes: Vec<Shape>,
    cursor: Option<Pos2>,
    segments: Vec<[Pos2; 2]>,
    arcs: Vec<(Pos2, f32)>,
}

impl ShapeSurface {
    pub fn new(origin: Pos2) -> Self {
        Self {
            origin: origin.to_vec2(),
            shapes: Vec::new(),
            cursor: None,
            segments: Vec::new(),
            arcs: Vec::new(),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }

    fn point(&self, x: f64, y: f64) -> Pos2 {
        Pos2::new(x as f32, y as f32) + self.origin
    }
}

impl Surface for ShapeSurface {
    fn clear(
        &mut self,
        _x: f64,
        _y: f64,
        _width: f64,
        _height: f64,
    ) -> quiver_platform::Result<()> {
        self.shapes.clear();
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
        let min = self.point(x, y);
        let rect = Rect::from_min_size(min, Vec2::new(width as f32, height as f32));
        self.shapes.push(Shape::rect_filled(rect, 0.0, to_color32(color)));
        Ok(())
    }

    fn begin_path(&mut self) {
        self.cursor = None;
        self.segments.clear();
        self.arcs.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = Some(self.point(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let to = self.point(x, y);
        if let Some(from) = self.cursor {
            self.segments.push([from, to]);
        }
        self.cursor = Some(to);
    }

    // Only full circles are needed by the effects.
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, _start_angle: f64, _end_angle: f64) {
        let centre = self.point(cx, cy);
        self.arcs.push((centre, radius as f32));
    }

    fn stroke(&mut self, width: f64, color: Rgba) -> quiver_platform::Result<()> {
        let stroke = Stroke::new(width as f32, to_color32(color));
        self.shapes
            .extend(self.segments.iter().map(|&seg| Shape::line_segment(seg, stroke)));
        Ok(())
    }

    fn fill(&mut self, color: Rgba) -> quiver_platform::Result<()> {
        let color = to_color32(color);
        let dots = self
            .arcs
            .iter()
            .map(|&(centre, radius)| Shape::circle_filled(centre, radius, color));
        self.shapes.extend(dots);
        Ok(())
    }
}

/// Input gathered by the egui app each frame and handed to the session on
/// its next tick. Events arriving while stopped are dropped.
#[derive(Debug, Default)]
pub struct EguiInput {
    listening: bool,
    queue: Vec<InputEvent>,
}

impl EguiInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        if self.listening {
            self.queue.push(event);
        }
    }
}

impl InputSource for EguiInput {
    fn start(&mut self) -> quiver_platform::Result<()> {
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) -> quiver_platform::Result<()> {
        self.listening = false;
        self.queue.clear();
        Ok(())
    }

    fn drain(&mut self, out: &mut Vec<InputEvent>) {
        out.append(&mut self.queue);
    }
}

/// Asks egui for another frame. A requested repaint cannot be withdrawn, so
/// cancelling only forgets the handle; a stopped session skips the frame.
pub struct RepaintScheduler {
    ctx: egui::Context,
    next: u64,
}

impl RepaintScheduler {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx, next: 0 }
    }
}

impl FrameScheduler for RepaintScheduler {
    fn request_frame(&mut self) -> quiver_platform::Result<FrameHandle> {
        self.next += 1;
        self.ctx.request_repaint();
        Ok(FrameHandle(self.next))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> quiver_platform::Result<()> {
        debug!("repaint {handle:?} abandoned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strokes_become_offset_line_segments() {
        let mut surface = ShapeSurface::new(Pos2::new(10.0, 20.0));
        surface.begin_path();
        surface.move_to(0.0, 0.0);
        surface.line_to(5.0, 0.0);
        surface.move_to(0.0, 0.0);
        surface.line_to(0.0, 5.0);
        surface.stroke(2.0, Rgba::BLACK).unwrap();
        assert_eq!(surface.shapes().len(), 2);
        match &surface.shapes()[0] {
            Shape::LineSegment { points, stroke } => {
                assert_eq!(points[0], Pos2::new(10.0, 20.0));
                assert_eq!(points[1], Pos2::new(15.0, 20.0));
                assert_eq!(stroke.width, 2.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn clear_drops_collected_shapes() {
        let mut surface = ShapeSurface::new(Pos2::ZERO);
        surface.begin_path();
        surface.arc(1.0, 1.0, 2.0, 0.0, std::f64::consts::TAU);
        surface.fill(Rgba::BLACK).unwrap();
        assert_eq!(surface.shapes().len(), 1);
        surface.clear(0.0, 0.0, 10.0, 10.0).unwrap();
        assert!(surface.shapes().is_empty());
    }

    #[test]
    fn input_is_ignored_until_started() {
        let mut input = EguiInput::new();
        input.push(InputEvent::PointerEnter);
        let mut out = Vec::new();
        input.drain(&mut out);
        assert!(out.is_empty());

        input.start().unwrap();
        input.push(InputEvent::PointerEnter);
        input.drain(&mut out);
        assert_eq!(out, vec![InputEvent::PointerEnter]);
    }

    #[test]
    fn colour_conversion_keeps_alpha() {
        let c = to_color32(Rgba::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(c.a(), 0);
        assert_eq!(to_color32(Rgba::BLACK), Color32::BLACK);
    }
}
