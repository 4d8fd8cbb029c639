//! Built-in effects.

use std::fmt;
use std::str::FromStr;

use quiver_platform::Rgba;

use crate::config::{
    ArrowGlyph, Behavior, EffectConfig, ExclusionRect, LatticeAlign, LatticeGrid, Layout,
};
use crate::error::EngineError;
use crate::pointer::PointerMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Arrows,
    ArrowsOpacity,
    ArrowsLimit,
    ArrowsPlay,
    Lines,
    Points,
    CanvasGrid,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Arrows,
        Preset::ArrowsOpacity,
        Preset::ArrowsLimit,
        Preset::ArrowsPlay,
        Preset::Lines,
        Preset::Points,
        Preset::CanvasGrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Arrows => "arrows",
            Preset::ArrowsOpacity => "arrows-opacity",
            Preset::ArrowsLimit => "arrows-limit",
            Preset::ArrowsPlay => "arrows-play",
            Preset::Lines => "lines",
            Preset::Points => "points",
            Preset::CanvasGrid => "canvas-grid",
        }
    }

    pub fn from_name(name: &str) -> Option<Preset> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn config(self) -> EffectConfig {
        let base = EffectConfig {
            layout: Layout::Lattice(LatticeGrid::new(50.0)),
            behavior: Behavior::Immediate,
            glyph: ArrowGlyph::default(),
            stroke_color: Rgba::BLACK,
            stroke_width: 2.0,
            pointer_mapping: PointerMapping::Offset,
            background: None,
        };
        match self {
            Preset::Arrows => base,
            Preset::ArrowsOpacity => EffectConfig {
                layout: Layout::Lattice(LatticeGrid::new(75.0).with_align(LatticeAlign::Origin)),
                behavior: Behavior::Faded { max_distance: 300.0 },
                glyph: ArrowGlyph {
                    tip: 30.0,
                    tail: -30.0,
                    barb_x: 5.0,
                    barb_y: 30.0,
                },
                stroke_width: 5.0,
                ..base
            },
            Preset::ArrowsLimit => EffectConfig {
                layout: Layout::Fixed { rows: 5, cols: 10 },
                behavior: Behavior::Eased { ease: 0.1 * 0.35 },
                glyph: ArrowGlyph {
                    tip: 50.0,
                    tail: -50.0,
                    barb_x: 10.0,
                    barb_y: 40.0,
                },
                stroke_color: Rgba::WHITE,
                background: Some(Rgba::new(0.067, 0.094, 0.153, 1.0)),
                ..base
            },
            Preset::ArrowsPlay => EffectConfig {
                layout: Layout::Lattice(LatticeGrid::new(120.0).with_exclusion(ExclusionRect {
                    width_vw: 0.35,
                    height_vw: 0.25,
                })),
                glyph: ArrowGlyph {
                    tip: 30.0,
                    tail: -30.0,
                    barb_x: 10.0,
                    barb_y: 20.0,
                },
                stroke_color: Rgba::WHITE,
                stroke_width: 5.0,
                background: Some(Rgba::BLACK),
                ..base
            },
            Preset::Lines => EffectConfig {
                behavior: Behavior::Segment { length: 20.0 },
                stroke_width: 1.0,
                ..base
            },
            Preset::Points => EffectConfig {
                behavior: Behavior::HoverReveal {
                    max_length: 20.0,
                    step: 0.05,
                    dot_radius: 2.0,
                },
                stroke_width: 1.0,
                ..base
            },
            // 50x50 arrow image scaled to 60% x 80%.
            Preset::CanvasGrid => EffectConfig {
                layout: Layout::Cells {
                    rows: 3,
                    cols: 8,
                    cell_width: 30.0,
                    cell_height: 40.0,
                    gap: 20.0,
                },
                glyph: ArrowGlyph {
                    tip: 15.0,
                    tail: -15.0,
                    barb_x: 3.0,
                    barb_y: 12.0,
                },
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::from_name(s).ok_or_else(|| EngineError::UnknownPreset(s.to_owned()))
    }
}
