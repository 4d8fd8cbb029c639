//! Anchor placement for an agent set.

use glam::DVec2;

use crate::config::{ExclusionRect, LatticeAlign, LatticeGrid, Layout};
use crate::error::{EngineError, EngineResult};
use crate::viewport::Viewport;

/// Largest agent set a layout may produce. Anything denser is refused before
/// allocating.
pub const MAX_AGENTS: usize = 100_000;

/// Derived lattice numbers for one viewport. `cols`/`rows` count cells, so the
/// lattice has `cols + 1` anchors per row and `rows + 1` rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeMetrics {
    pub cols: u32,
    pub rows: u32,
    pub x_padding: f64,
    pub y_padding: f64,
}

impl LatticeMetrics {
    /// Fails with `TooManyAgents` when the lattice would exceed [`MAX_AGENTS`].
    pub fn compute(viewport: Viewport, grid: &LatticeGrid) -> EngineResult<Self> {
        let spacing = grid.spacing;
        let cols = (viewport.width / spacing).floor();
        let rows = (viewport.height / spacing).floor();
        let requested = (cols + 1.0) * (rows + 1.0);
        // Also catches NaN.
        if !(requested <= MAX_AGENTS as f64) {
            return Err(EngineError::TooManyAgents {
                requested,
                max: MAX_AGENTS,
            });
        }
        let (x_padding, y_padding) = match grid.align {
            LatticeAlign::Centred => (
                (viewport.width - cols * spacing) / 2.0,
                (viewport.height - rows * spacing) / 2.0,
            ),
            LatticeAlign::Origin => (0.0, 0.0),
        };
        Ok(Self {
            cols: cols as u32,
            rows: rows as u32,
            x_padding,
            y_padding,
        })
    }

    pub fn anchor_count(&self) -> usize {
        (self.cols as usize + 1) * (self.rows as usize + 1)
    }
}

/// Anchors for `layout` in row-major order. Empty for a zero-area viewport.
pub fn anchors(viewport: Viewport, layout: &Layout) -> EngineResult<Vec<DVec2>> {
    if viewport.is_empty() {
        return Ok(Vec::new());
    }
    match *layout {
        Layout::Lattice(grid) => lattice(viewport, &grid),
        Layout::Fixed { rows, cols } => {
            check_count(rows, cols)?;
            Ok(fixed(viewport, rows, cols))
        }
        Layout::Cells {
            rows,
            cols,
            cell_width,
            cell_height,
            gap,
        } => {
            check_count(rows, cols)?;
            let cell = DVec2::new(cell_width, cell_height);
            Ok(cells(rows, cols, cell, gap))
        }
    }
}

fn check_count(rows: u32, cols: u32) -> EngineResult<()> {
    let requested = u64::from(rows) * u64::from(cols);
    if requested > MAX_AGENTS as u64 {
        return Err(EngineError::TooManyAgents {
            requested: requested as f64,
            max: MAX_AGENTS,
        });
    }
    Ok(())
}

fn lattice(viewport: Viewport, grid: &LatticeGrid) -> EngineResult<Vec<DVec2>> {
    let metrics = LatticeMetrics::compute(viewport, grid)?;
    let excluded = grid.exclusion.map(|rect| Exclusion::centred(viewport, rect));
    let mut out = Vec::with_capacity(metrics.anchor_count());
    // Inclusive bounds: a viewport narrower than one cell still gets a line of anchors.
    for row in 0..=metrics.rows {
        for col in 0..=metrics.cols {
            let anchor = DVec2::new(
                f64::from(col) * grid.spacing + metrics.x_padding,
                f64::from(row) * grid.spacing + metrics.y_padding,
            );
            if excluded.is_some_and(|ex| ex.contains(anchor)) {
                continue;
            }
            out.push(anchor);
        }
    }
    Ok(out)
}

fn fixed(viewport: Viewport, rows: u32, cols: u32) -> Vec<DVec2> {
    let spacing_x = viewport.width / (f64::from(cols) + 1.0);
    let spacing_y = viewport.height / (f64::from(rows) + 1.0);
    let mut out = Vec::with_capacity(rows as usize * cols as usize);
    for y in 1..=rows {
        for x in 1..=cols {
            out.push(DVec2::new(f64::from(x) * spacing_x, f64::from(y) * spacing_y));
        }
    }
    out
}

fn cells(rows: u32, cols: u32, cell: DVec2, gap: f64) -> Vec<DVec2> {
    let pitch = cell + DVec2::splat(gap);
    let mut out = Vec::with_capacity(rows as usize * cols as usize);
    for row in 0..rows {
        for col in 0..cols {
            out.push(DVec2::new(f64::from(col), f64::from(row)) * pitch + cell / 2.0);
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Exclusion {
    min: DVec2,
    max: DVec2,
}

impl Exclusion {
    fn centred(viewport: Viewport, rect: ExclusionRect) -> Self {
        let size = DVec2::new(rect.width_vw, rect.height_vw) * viewport.width;
        let centre = DVec2::new(viewport.width, viewport.height) / 2.0;
        Self {
            min: centre - size / 2.0,
            max: centre + size / 2.0,
        }
    }

    fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice_layout(spacing: f64) -> Layout {
        Layout::Lattice(LatticeGrid::new(spacing))
    }

    fn viewport(w: f64, h: f64) -> Viewport {
        Viewport::new(w, h).unwrap()
    }

    #[test]
    fn lattice_count_matches_inclusive_formula() {
        let cases = [
            (800.0, 600.0, 50.0),
            (400.0, 600.0, 50.0),
            (1023.0, 77.0, 13.5),
            (1.0, 1.0, 0.3),
        ];
        for (w, h, s) in cases {
            let anchors = anchors(viewport(w, h), &lattice_layout(s)).unwrap();
            let expected = ((w / s).floor() as usize + 1) * ((h / s).floor() as usize + 1);
            assert_eq!(anchors.len(), expected, "{w}x{h} @ {s}");
            for a in &anchors {
                assert!(a.x >= 0.0 && a.x <= w && a.y >= 0.0 && a.y <= h, "{a:?} outside {w}x{h}");
            }
        }
    }

    #[test]
    fn lattice_is_centred() {
        let anchors = anchors(viewport(820.0, 610.0), &lattice_layout(50.0)).unwrap();
        let first = anchors[0];
        let last = anchors[anchors.len() - 1];
        assert_eq!(first, DVec2::new(10.0, 5.0));
        assert_eq!(last, DVec2::new(810.0, 605.0));
    }

    #[test]
    fn spacing_wider_than_viewport_yields_single_anchor() {
        let anchors = anchors(viewport(30.0, 20.0), &lattice_layout(50.0)).unwrap();
        assert_eq!(anchors, vec![DVec2::new(15.0, 10.0)]);
    }

    #[test]
    fn zero_area_viewport_has_no_anchors() {
        assert!(anchors(viewport(0.0, 600.0), &lattice_layout(50.0)).unwrap().is_empty());
        let fixed = Layout::Fixed { rows: 5, cols: 10 };
        assert!(anchors(viewport(800.0, 0.0), &fixed).unwrap().is_empty());
    }

    #[test]
    fn fixed_grid_spreads_interior_points() {
        let fixed = Layout::Fixed { rows: 5, cols: 10 };
        let anchors = anchors(viewport(1100.0, 600.0), &fixed).unwrap();
        assert_eq!(anchors.len(), 50);
        assert_eq!(anchors[0], DVec2::new(100.0, 100.0));
        assert_eq!(anchors[49], DVec2::new(1000.0, 500.0));
    }

    #[test]
    fn exclusion_rect_removes_centre_anchors() {
        let vp = viewport(1200.0, 800.0);
        let layout = Layout::Lattice(LatticeGrid::new(120.0).with_exclusion(ExclusionRect {
            width_vw: 0.35,
            height_vw: 0.25,
        }));
        let all = anchors(vp, &lattice_layout(120.0)).unwrap();
        let kept = anchors(vp, &layout).unwrap();
        // Exclusion spans x in [390, 810], y in [250, 550].
        let removed: Vec<_> = all.iter().filter(|a| !kept.contains(a)).collect();
        assert!(!removed.is_empty());
        for a in removed {
            assert!((390.0..=810.0).contains(&a.x) && (250.0..=550.0).contains(&a.y));
        }
        let excluded = |a: &DVec2| (390.0..=810.0).contains(&a.x) && (250.0..=550.0).contains(&a.y);
        assert!(!kept.iter().any(excluded));
    }

    #[test]
    fn dense_lattice_is_refused_before_allocating() {
        let grid = LatticeGrid::new(1e-7);
        assert!(matches!(
            LatticeMetrics::compute(viewport(800.0, 600.0), &grid),
            Err(EngineError::TooManyAgents { .. })
        ));
        // 80_001 x 60_001 anchors would fit in neither u32 math nor memory.
        assert!(anchors(viewport(800.0, 600.0), &lattice_layout(0.01)).is_err());
        // Just under the limit still builds.
        let ok = anchors(viewport(315.0, 315.0), &lattice_layout(1.0)).unwrap();
        assert_eq!(ok.len(), 316 * 316);
    }

    #[test]
    fn huge_fixed_grid_is_refused() {
        let layout = Layout::Fixed {
            rows: u32::MAX,
            cols: u32::MAX,
        };
        assert!(matches!(
            anchors(viewport(800.0, 600.0), &layout),
            Err(EngineError::TooManyAgents { .. })
        ));
    }

    #[test]
    fn origin_aligned_lattice_starts_at_corner() {
        let layout = Layout::Lattice(LatticeGrid::new(75.0).with_align(LatticeAlign::Origin));
        let anchors = anchors(viewport(800.0, 600.0), &layout).unwrap();
        assert_eq!(anchors.len(), 11 * 9);
        assert_eq!(anchors[0], DVec2::ZERO);
        assert_eq!(anchors[1], DVec2::new(75.0, 0.0));
        assert_eq!(anchors[anchors.len() - 1], DVec2::new(750.0, 600.0));
    }

    #[test]
    fn cells_are_centred_in_gapped_grid() {
        let layout = Layout::Cells {
            rows: 3,
            cols: 8,
            cell_width: 30.0,
            cell_height: 40.0,
            gap: 20.0,
        };
        let anchors = anchors(viewport(800.0, 600.0), &layout).unwrap();
        assert_eq!(anchors.len(), 24);
        assert_eq!(anchors[0], DVec2::new(15.0, 20.0));
        assert_eq!(anchors[1], DVec2::new(65.0, 20.0));
        assert_eq!(anchors[8], DVec2::new(15.0, 80.0));
        assert_eq!(anchors[23], DVec2::new(365.0, 140.0));
    }
}
