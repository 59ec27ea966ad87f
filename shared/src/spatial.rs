use crate::geo::{Bounds, LonLat, polygon_contains};
use crate::registry::Feature;

const GRID_COLS: usize = 32;
const GRID_ROWS: usize = 32;

/// A flat 2D grid over lon/lat space for feature hit-testing.
/// Cells hold indices of features whose bounding box overlaps them; the
/// exact polygon test runs only on those candidates.
#[derive(Debug, Clone)]
pub struct FeatureGrid {
    cells: Vec<Vec<usize>>,
    bounds: Vec<Bounds>,
    min: LonLat,
    cell_w: f64,
    cell_h: f64,
}

impl FeatureGrid {
    pub fn build(features: &[Feature]) -> Self {
        let mut world = Bounds::empty();
        for f in features {
            world.union(&f.bounds);
        }
        if world.is_empty() {
            return Self {
                cells: Vec::new(),
                bounds: Vec::new(),
                min: LonLat::new(0.0, 0.0),
                cell_w: 1.0,
                cell_h: 1.0,
            };
        }

        // Pad so points on the outer edge still land inside a cell
        let pad = 1e-6;
        let min = LonLat::new(world.min.lon - pad, world.min.lat - pad);
        let cell_w = (world.max.lon + pad - min.lon) / GRID_COLS as f64;
        let cell_h = (world.max.lat + pad - min.lat) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        let mut bounds = Vec::with_capacity(features.len());

        for (idx, f) in features.iter().enumerate() {
            bounds.push(f.bounds);
            if f.bounds.is_empty() {
                continue;
            }
            let col_start = ((f.bounds.min.lon - min.lon) / cell_w).floor().max(0.0) as usize;
            let col_end = ((f.bounds.max.lon - min.lon) / cell_w)
                .ceil()
                .min(GRID_COLS as f64) as usize;
            let row_start = ((f.bounds.min.lat - min.lat) / cell_h).floor().max(0.0) as usize;
            let row_end = ((f.bounds.max.lat - min.lat) / cell_h)
                .ceil()
                .min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end.max(row_start + 1).min(GRID_ROWS) {
                for col in col_start..col_end.max(col_start + 1).min(GRID_COLS) {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            bounds,
            min,
            cell_w,
            cell_h,
        }
    }

    /// Index of the feature containing `p`, if any. Later features win
    /// ties since they are drawn on top.
    pub fn find_at(&self, features: &[Feature], p: LonLat) -> Option<usize> {
        if self.cells.is_empty() {
            return None;
        }

        let col = ((p.lon - self.min.lon) / self.cell_w).floor();
        let row = ((p.lat - self.min.lat) / self.cell_h).floor();
        if !col.is_finite() || !row.is_finite() {
            return None;
        }
        if col < 0.0 || row < 0.0 || col >= GRID_COLS as f64 || row >= GRID_ROWS as f64 {
            return None;
        }

        let cell = &self.cells[row as usize * GRID_COLS + col as usize];
        cell.iter().rev().copied().find(|&idx| {
            self.bounds[idx].contains(p)
                && features
                    .get(idx)
                    .is_some_and(|f| f.polygons.iter().any(|poly| polygon_contains(poly, p)))
        })
    }
}
