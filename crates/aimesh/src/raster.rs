// raster.rs - scanline rasterization of grid-space triangles into a heightmap
//
// Each triangle is projected onto (x, row = z). Its three edges are walked
// row by row to find the leftmost and rightmost crossing per row, then every
// covered cell of the row is raised to the height interpolated at the left
// crossing. The whole row gets that single height; there is no interpolation
// across the span.

use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use crate::bounds::{GridPoint, GridTriangle};
use crate::heightmap::HeightmapGrid;

const SCAN_EMPTY_LEFT: f64 = 1e10;
const SCAN_EMPTY_RIGHT: f64 = -1e10;

/// Triangles handed to one rayon job at minimum; each job owns a scan buffer.
const PARALLEL_MIN_BATCH: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SpanBound {
    x: f64,
    height: f64,
}

/// Per-row left/right span bounds for the triangle being drawn.
///
/// Sized once to the grid height and reset row by row after every fill, so
/// the buffer can be reused for the next triangle.
#[derive(Clone, Debug)]
pub struct ScanRows {
    left: Vec<SpanBound>,
    right: Vec<SpanBound>,
}

impl ScanRows {
    pub fn new(size: usize) -> Self {
        Self {
            left: vec![Self::empty_left(); size],
            right: vec![Self::empty_right(); size],
        }
    }

    fn empty_left() -> SpanBound {
        SpanBound {
            x: SCAN_EMPTY_LEFT,
            height: SCAN_EMPTY_LEFT,
        }
    }

    fn empty_right() -> SpanBound {
        SpanBound {
            x: SCAN_EMPTY_RIGHT,
            height: SCAN_EMPTY_RIGHT,
        }
    }

    fn size(&self) -> usize {
        self.left.len()
    }

    /// Record where the edge `a`-`b` crosses each integer row it spans.
    fn walk_edge(&mut self, a: GridPoint, b: GridPoint) {
        let (low, high) = if a.row > b.row { (b, a) } else { (a, b) };
        let size = self.size() as i64;

        if high.row < 0.0 || low.row >= size as f64 {
            return;
        }

        let dy = high.row - low.row;
        if dy == 0.0 {
            return;
        }

        let inv_dy = 1.0 / dy;
        let delta_x = (high.x - low.x) * inv_dy;
        let delta_h = (high.height - low.height) * inv_dy;

        // first row strictly after the low endpoint
        let lead = 1.0 - (low.row - low.row.floor());
        let mut x = low.x + delta_x * lead;
        let mut height = low.height + delta_h * lead;
        let mut start = low.row.floor() as i64 + 1;
        let end = (high.row.floor() as i64).min(size - 1);

        if start < 0 {
            x += delta_x * (-start) as f64;
            height += delta_h * (-start) as f64;
            start = 0;
        }

        for row in start..=end {
            let row = row as usize;
            if x < self.left[row].x {
                self.left[row] = SpanBound { x, height };
            }
            if x > self.right[row].x {
                self.right[row] = SpanBound { x, height };
            }
            x += delta_x;
            height += delta_h;
        }
    }

    fn reset_row(&mut self, row: usize) {
        self.left[row] = Self::empty_left();
        self.right[row] = Self::empty_right();
    }
}

/// Scanline rasterizer for one conversion run.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    scan: ScanRows,
}

impl Rasterizer {
    pub fn new(size: usize) -> Self {
        Self {
            scan: ScanRows::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.scan.size()
    }

    /// Rasterize a grid-space triangle, calling `plot(column, row, height)` for
    /// every covered cell. `plot` is expected to keep the maximum height.
    pub fn draw_triangle(&mut self, triangle: &GridTriangle, mut plot: impl FnMut(usize, usize, f32)) {
        let [p1, p2, p3] = *triangle;

        self.scan.walk_edge(p1, p2);
        self.scan.walk_edge(p2, p3);
        self.scan.walk_edge(p3, p1);

        let last = self.size() as i64 - 1;
        let min_row = p1.row.min(p2.row).min(p3.row);
        let max_row = p1.row.max(p2.row).max(p3.row);
        let start = (min_row.floor() as i64).max(0);
        let end = (max_row.floor() as i64).min(last);

        for row in start..=end {
            let row = row as usize;
            let left = self.scan.left[row];
            let right = self.scan.right[row];

            if left.x < right.x {
                let first = (left.x.floor() as i64).max(0);
                let stop = (right.x.floor() as i64).min(last);
                let height = left.height as f32;
                for column in first..=stop {
                    plot(column as usize, row, height);
                }
            }

            self.scan.reset_row(row);
        }
    }

    /// Rasterize into `grid`, keeping the highest height per cell.
    pub fn draw_into(&mut self, triangle: &GridTriangle, grid: &mut HeightmapGrid) {
        self.draw_triangle(triangle, |column, row, height| {
            grid.update_if_higher(column, row, height)
        });
    }
}

/// Rasterize every triangle, in order, into a fresh grid.
pub fn rasterize(triangles: &[GridTriangle], size: usize, no_data: f32) -> HeightmapGrid {
    let mut grid = HeightmapGrid::new(size, no_data);
    let mut rasterizer = Rasterizer::new(size);
    for triangle in triangles {
        rasterizer.draw_into(triangle, &mut grid);
    }
    grid
}

/// Same result as [`rasterize`], with triangles spread over `threads` workers.
///
/// Every worker owns its own scan buffer; grid cells are raised with an
/// atomic compare-and-swap maximum, so the order triangles land in does not
/// matter.
pub fn rasterize_parallel(
    triangles: &[GridTriangle],
    size: usize,
    no_data: f32,
    threads: usize,
) -> HeightmapGrid {
    if threads <= 1 {
        return rasterize(triangles, size, no_data);
    }

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("Failed to create thread pool: {}, using single-threaded", e);
            return rasterize(triangles, size, no_data);
        }
    };

    let cells: Vec<AtomicU32> = (0..size * size)
        .map(|_| AtomicU32::new(no_data.to_bits()))
        .collect();

    pool.install(|| {
        triangles
            .par_iter()
            .with_min_len(PARALLEL_MIN_BATCH)
            .for_each_init(
                || Rasterizer::new(size),
                |rasterizer, triangle| {
                    rasterizer.draw_triangle(triangle, |column, row, height| {
                        atomic_max(&cells[row * size + column], height)
                    });
                },
            );
    });

    let cells = cells
        .into_iter()
        .map(|cell| f32::from_bits(cell.into_inner()))
        .collect();
    HeightmapGrid::from_cells(size, no_data, cells)
}

fn atomic_max(cell: &AtomicU32, value: f32) {
    let mut current = cell.load(Ordering::Relaxed);
    while value > f32::from_bits(current) {
        match cell.compare_exchange_weak(current, value.to_bits(), Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return,
            Err(actual) => current = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightmap::NO_DATA_HEIGHT;

    // (x, height, row) per corner
    fn tri(a: (f64, f64, f64), b: (f64, f64, f64), c: (f64, f64, f64)) -> GridTriangle {
        [a, b, c].map(|(x, height, row)| GridPoint { x, row, height })
    }

    #[test]
    fn test_right_triangle_fill() {
        let size = 1024;
        let triangle = tri((0.0, 5.0, 0.0), (1024.0, 5.0, 0.0), (0.0, 5.0, 1024.0));
        let grid = rasterize(&[triangle], size, NO_DATA_HEIGHT);

        // row 0 lies on the horizontal edge and gets no crossings
        assert!((0..size).all(|x| grid.is_no_data(x, 0)));
        for row in 1..size {
            let last_column = size - row;
            for x in 0..size {
                let expected = if x <= last_column.min(size - 1) {
                    5.0
                } else {
                    NO_DATA_HEIGHT
                };
                assert_eq!(grid.get(x, row), Some(expected), "cell ({x}, {row})");
            }
        }
    }

    #[test]
    fn test_left_edge_height_fills_whole_span() {
        // left edge at height 1, right edge rising to 9
        let triangle = tri((0.0, 1.0, 0.0), (8.0, 9.0, 8.0), (0.0, 1.0, 8.0));
        let grid = rasterize(&[triangle], 16, NO_DATA_HEIGHT);

        for row in 1..=7 {
            for x in 0..=row {
                assert_eq!(grid.get(x, row), Some(1.0), "cell ({x}, {row})");
            }
            assert!(grid.is_no_data(row + 1, row));
        }
    }

    #[test]
    fn test_overlap_keeps_maximum_in_any_order() {
        let low = tri((0.0, 2.0, 0.0), (16.0, 2.0, 0.0), (0.0, 2.0, 16.0));
        let high = tri((0.0, 6.0, 4.0), (12.0, 6.0, 4.0), (0.0, 6.0, 16.0));

        let forward = rasterize(&[low, high], 16, NO_DATA_HEIGHT);
        let backward = rasterize(&[high, low], 16, NO_DATA_HEIGHT);
        assert_eq!(forward, backward);

        // row 6 is covered by both
        assert_eq!(forward.get(2, 6), Some(6.0));
        // row 2 only by the low triangle
        assert_eq!(forward.get(2, 2), Some(2.0));
    }

    #[test]
    fn test_scan_rows_reset_between_triangles() {
        let mut grid = HeightmapGrid::new(16, NO_DATA_HEIGHT);
        let mut rasterizer = Rasterizer::new(16);
        rasterizer.draw_into(&tri((0.0, 3.0, 0.0), (8.0, 3.0, 0.0), (0.0, 3.0, 8.0)), &mut grid);

        assert!(rasterizer.scan.left.iter().all(|b| b.x == SCAN_EMPTY_LEFT));
        assert!(rasterizer.scan.right.iter().all(|b| b.x == SCAN_EMPTY_RIGHT));

        // a second, disjoint triangle must not pick up the first one's spans
        rasterizer.draw_into(&tri((12.0, 4.0, 0.0), (15.0, 4.0, 0.0), (12.0, 4.0, 3.0)), &mut grid);
        assert!(grid.is_no_data(10, 1));
        assert_eq!(grid.get(12, 1), Some(4.0));
        assert_eq!(grid.get(0, 1), Some(3.0));
    }

    #[test]
    fn test_triangles_outside_rows_draw_nothing() {
        let above = tri((0.0, 1.0, -10.0), (8.0, 1.0, -10.0), (0.0, 1.0, -2.0));
        let below = tri((0.0, 1.0, 16.0), (8.0, 1.0, 16.0), (0.0, 1.0, 30.0));
        let grid = rasterize(&[above, below], 16, NO_DATA_HEIGHT);
        assert_eq!(grid.coverage(), 0);
    }

    #[test]
    fn test_partially_visible_triangle_is_clipped() {
        // spans rows -8..8 and columns up to 20 on a 16 grid
        let triangle = tri((0.0, 2.0, -8.0), (20.0, 2.0, -8.0), (0.0, 2.0, 8.0));
        let grid = rasterize(&[triangle], 16, NO_DATA_HEIGHT);

        assert!(grid.coverage() > 0);
        // row 0 is 8 rows into the triangle: right edge at x = 10
        assert_eq!(grid.get(10, 0), Some(2.0));
        assert!(grid.is_no_data(11, 0));
        assert!((8..16).all(|row| grid.is_no_data(0, row)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut triangles = Vec::new();
        for i in 0..600 {
            let offset = (i % 40) as f64;
            let h = ((i * 37) % 101) as f64 - 50.0;
            triangles.push(tri(
                (offset, h, offset * 0.5),
                (offset + 24.0, h + 3.0, offset),
                (offset * 0.25, h - 2.0, offset + 20.0),
            ));
        }

        let sequential = rasterize(&triangles, 64, NO_DATA_HEIGHT);
        let parallel = rasterize_parallel(&triangles, 64, NO_DATA_HEIGHT, 4);
        assert_eq!(sequential, parallel);
        assert!(sequential.coverage() > 0);
    }

    #[test]
    fn test_atomic_max_handles_negative_values() {
        let cell = AtomicU32::new(NO_DATA_HEIGHT.to_bits());
        atomic_max(&cell, -5.0);
        atomic_max(&cell, -7.0);
        assert_eq!(f32::from_bits(cell.load(Ordering::Relaxed)), -5.0);
        atomic_max(&cell, 3.0);
        assert_eq!(f32::from_bits(cell.load(Ordering::Relaxed)), 3.0);
    }
}
