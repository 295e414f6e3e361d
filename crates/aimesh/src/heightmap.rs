use crate::bounds::Normalization;

/// Height written into cells no triangle covers.
pub const NO_DATA_HEIGHT: f32 = -99999.99;

/// Default grid side length, in cells.
pub const DEFAULT_TEXTURE_SIZE: usize = 1024;

/// Fixed-size square grid of heights, stored row-major.
///
/// Cells start at the no-data sentinel and only ever move up.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapGrid {
    size: usize,
    no_data: f32,
    cells: Vec<f32>,
}

impl HeightmapGrid {
    pub fn new(size: usize, no_data: f32) -> Self {
        Self {
            size,
            no_data,
            cells: vec![no_data; size * size],
        }
    }

    pub(crate) fn from_cells(size: usize, no_data: f32, cells: Vec<f32>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self {
            size,
            no_data,
            cells,
        }
    }

    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell values, `size * size` long.
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, x: usize, row: usize) -> Option<f32> {
        self.index(x, row).map(|idx| self.cells[idx])
    }

    /// Raise the cell at (`x`, `row`) to `value`. Lower or equal values and
    /// out-of-range positions are ignored.
    pub fn update_if_higher(&mut self, x: usize, row: usize, value: f32) {
        if let Some(idx) = self.index(x, row) {
            let cell = &mut self.cells[idx];
            if value > *cell {
                *cell = value;
            }
        }
    }

    pub fn is_no_data(&self, x: usize, row: usize) -> bool {
        self.get(x, row) == Some(self.no_data)
    }

    /// Number of cells holding real height data.
    pub fn coverage(&self) -> usize {
        self.cells.iter().filter(|&&h| h != self.no_data).count()
    }

    fn index(&self, x: usize, row: usize) -> Option<usize> {
        (x < self.size && row < self.size).then(|| row * self.size + x)
    }
}

/// A rasterized grid together with the transform that produced it, for
/// terrain-height lookups in world coordinates.
#[derive(Clone, Debug)]
pub struct Heightmap {
    pub grid: HeightmapGrid,
    pub normalization: Normalization,
}

impl Heightmap {
    /// Height of the cell under world position (`x`, `z`), or `None` when the
    /// position is off the grid or no triangle covered that cell.
    pub fn height_at_world(&self, x: f64, z: f64) -> Option<f32> {
        let (col, row) = self.normalization.to_grid(x, z);
        if !(col >= 0.0 && row >= 0.0) {
            return None;
        }
        let (col, row) = (col.floor() as usize, row.floor() as usize);
        if self.grid.is_no_data(col, row) {
            return None;
        }
        self.grid.get(col, row)
    }
}
