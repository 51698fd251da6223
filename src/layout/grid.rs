use std::collections::{HashMap, HashSet};

use super::geometry::rects_overlap;
use super::{Point, Rect};

/// Uniform-cell spatial hash over obstacle rectangles. Cells store indices
/// into a caller-owned rectangle list, so the grid never owns geometry.
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    cell: f32,
    /// Maps grid cell (ix, iy) to indices into the obstacle list.
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl ObstacleGrid {
    pub fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(1.0),
            cells: HashMap::new(),
        }
    }

    pub fn from_rects(cell: f32, rects: &[Rect]) -> Self {
        let mut grid = Self::new(cell);
        for (idx, rect) in rects.iter().enumerate() {
            grid.insert(idx, rect);
        }
        grid
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn key(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.cell).floor() as i32, (y / self.cell).floor() as i32)
    }

    /// Cell span touched by `rect`, inclusive of the far edge.
    fn span(&self, rect: &Rect) -> ((i32, i32), (i32, i32)) {
        (
            self.key(rect.0, rect.1),
            self.key(rect.0 + rect.2, rect.1 + rect.3),
        )
    }

    pub fn insert(&mut self, idx: usize, rect: &Rect) {
        let ((x0, y0), (x1, y1)) = self.span(rect);
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                self.cells.entry((ix, iy)).or_default().push(idx);
            }
        }
    }

    /// Indices of obstacles sharing a cell with `rect`, each reported once.
    pub fn query(&self, rect: &Rect) -> impl Iterator<Item = usize> + '_ {
        let ((x0, y0), (x1, y1)) = self.span(rect);
        let mut seen = HashSet::new();
        (x0..=x1)
            .flat_map(move |ix| (y0..=y1).map(move |iy| (ix, iy)))
            .flat_map(move |key| {
                self.cells
                    .get(&key)
                    .map(|v| v.as_slice())
                    .unwrap_or(&[])
                    .iter()
                    .copied()
            })
            .filter(move |idx| seen.insert(*idx))
    }

    /// True as soon as one candidate really overlaps `rect`.
    pub fn query_overlap(&self, rect: &Rect, rects: &[Rect]) -> bool {
        self.query(rect)
            .filter_map(|idx| rects.get(idx))
            .any(|other| rects_overlap(rect, other))
    }

    /// Candidates from the 3×3 cell neighborhood of `pt`, deduplicated in
    /// first-seen order (column by column).
    pub fn candidates_near_point(&self, pt: Point) -> Vec<usize> {
        let (ix, iy) = self.key(pt.0, pt.1);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(ix + dx, iy + dy)) else {
                    continue;
                };
                for &idx in bucket {
                    if seen.insert(idx) {
                        out.push(idx);
                    }
                }
            }
        }
        out
    }
}
