/// Manually stepped reveal: moves `step` per tick toward `max` while hovered
/// and back toward `0` otherwise. Not a spring; the speed is the step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverRamp {
    value: f64,
    max: f64,
    step: f64,
}

impl HoverRamp {
    pub fn new(max: f64, step: f64) -> Self {
        Self { value: 0.0, max, step }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn advance(&mut self, hovered: bool) -> f64 {
        self.value = if hovered {
            (self.value + self.step).min(self.max)
        } else {
            (self.value - self.step).max(0.0)
        };
        self.value
    }
}
