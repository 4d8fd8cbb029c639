//! Effect configuration, loadable from TOML.

use std::path::Path;

use quiver_platform::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::MAX_AGENTS;
use crate::pointer::PointerMapping;

/// Centred rectangle with no anchors, sized in fractions of the viewport
/// *width* (CSS `vw`) on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRect {
    pub width_vw: f64,
    pub height_vw: f64,
}

/// Where the lattice's first anchor sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatticeAlign {
    /// Leftover space split evenly on both sides.
    #[default]
    Centred,
    /// First anchor on the top-left corner; leftover space on the right and bottom.
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeGrid {
    pub spacing: f64,
    #[serde(default)]
    pub exclusion: Option<ExclusionRect>,
    #[serde(default)]
    pub align: LatticeAlign,
}

impl LatticeGrid {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            exclusion: None,
            align: LatticeAlign::Centred,
        }
    }

    pub fn with_exclusion(self, exclusion: ExclusionRect) -> Self {
        Self {
            exclusion: Some(exclusion),
            ..self
        }
    }

    pub fn with_align(self, align: LatticeAlign) -> Self {
        Self { align, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Layout {
    /// Centred lattice with a fixed spacing; density follows the viewport.
    Lattice(LatticeGrid),
    /// Fixed number of rows and columns spread evenly over the viewport.
    Fixed { rows: u32, cols: u32 },
    /// Fixed number of equally sized cells laid out from the top-left corner
    /// with `gap` between neighbours; anchors sit at the cell centres.
    Cells {
        rows: u32,
        cols: u32,
        cell_width: f64,
        cell_height: f64,
        gap: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Behavior {
    /// Arrow points straight at the pointer.
    Immediate,
    /// Arrow direction follows the pointer through a first-order low-pass filter.
    Eased { ease: f64 },
    /// Arrow fades out linearly with distance from the pointer.
    Faded { max_distance: f64 },
    /// Fixed-length segment from the anchor toward the pointer.
    Segment { length: f64 },
    /// Dot while the pointer is outside; segment that grows while hovered.
    HoverReveal {
        max_length: f64,
        step: f64,
        dot_radius: f64,
    },
}

/// Arrow drawn along +x before rotation: shaft from `tail` to `tip`, barbs
/// from `tip` back to `(barb_x, ±barb_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowGlyph {
    pub tip: f64,
    pub tail: f64,
    pub barb_x: f64,
    pub barb_y: f64,
}

impl Default for ArrowGlyph {
    fn default() -> Self {
        Self {
            tip: 20.0,
            tail: -20.0,
            barb_x: 5.0,
            barb_y: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub layout: Layout,
    pub behavior: Behavior,
    #[serde(default)]
    pub glyph: ArrowGlyph,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Rgba,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub pointer_mapping: PointerMapping,
    #[serde(default)]
    pub background: Option<Rgba>,
}

fn default_stroke_color() -> Rgba {
    Rgba::BLACK
}

fn default_stroke_width() -> f64 {
    1.0
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Lattice(LatticeGrid::new(50.0)),
            behavior: Behavior::Immediate,
            glyph: ArrowGlyph::default(),
            stroke_color: default_stroke_color(),
            stroke_width: 2.0,
            pointer_mapping: PointerMapping::Offset,
            background: None,
        }
    }
}

impl EffectConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: EffectConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> EngineResult<()> {
        match self.layout {
            Layout::Lattice(grid) => {
                if !grid.spacing.is_finite() || grid.spacing <= 0.0 {
                    return Err(EngineError::InvalidSpacing(grid.spacing));
                }
                if let Some(rect) = grid.exclusion {
                    let frac = |v: f64| (0.0..=1.0).contains(&v);
                    if !frac(rect.width_vw) || !frac(rect.height_vw) {
                        return Err(EngineError::InvalidExclusion {
                            width_vw: rect.width_vw,
                            height_vw: rect.height_vw,
                        });
                    }
                }
            }
            Layout::Fixed { rows, cols } => check_grid_size(rows, cols)?,
            Layout::Cells {
                rows,
                cols,
                cell_width,
                cell_height,
                gap,
            } => {
                check_grid_size(rows, cols)?;
                for (what, value) in [("width", cell_width), ("height", cell_height)] {
                    if !value.is_finite() || value <= 0.0 {
                        return Err(EngineError::InvalidCell { what, value });
                    }
                }
                if !gap.is_finite() || gap < 0.0 {
                    return Err(EngineError::InvalidCell {
                        what: "gap",
                        value: gap,
                    });
                }
            }
        }

        let non_negative = |what: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidBehavior { what, value })
            }
        };
        match self.behavior {
            Behavior::Immediate => {}
            Behavior::Eased { ease } => {
                if !(0.0..=1.0).contains(&ease) {
                    return Err(EngineError::InvalidEase(ease));
                }
            }
            Behavior::Faded { max_distance } => {
                if !max_distance.is_finite() || max_distance <= 0.0 {
                    return Err(EngineError::InvalidFade(max_distance));
                }
            }
            Behavior::Segment { length } => non_negative("segment length", length)?,
            Behavior::HoverReveal {
                max_length,
                step,
                dot_radius,
            } => {
                non_negative("reveal length", max_length)?;
                non_negative("dot radius", dot_radius)?;
                if !step.is_finite() || step <= 0.0 {
                    return Err(EngineError::InvalidBehavior {
                        what: "reveal step",
                        value: step,
                    });
                }
            }
        }

        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(EngineError::InvalidStroke(self.stroke_width));
        }
        let g = self.glyph;
        let parts = [("tip", g.tip), ("tail", g.tail), ("barb_x", g.barb_x), ("barb_y", g.barb_y)];
        for (what, value) in parts {
            if !value.is_finite() {
                return Err(EngineError::InvalidGlyph { what, value });
            }
        }
        check_color("stroke", self.stroke_color)?;
        if let Some(background) = self.background {
            check_color("background", background)?;
        }
        Ok(())
    }
}

fn check_grid_size(rows: u32, cols: u32) -> EngineResult<()> {
    if rows == 0 || cols == 0 {
        return Err(EngineError::InvalidGrid { rows, cols });
    }
    let count = u64::from(rows) * u64::from(cols);
    if count > MAX_AGENTS as u64 {
        return Err(EngineError::TooManyAgents {
            requested: count as f64,
            max: MAX_AGENTS,
        });
    }
    Ok(())
}

fn check_color(what: &'static str, color: Rgba) -> EngineResult<()> {
    for value in [color.r, color.g, color.b, color.a] {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::InvalidColor { what, value });
        }
    }
    Ok(())
}
