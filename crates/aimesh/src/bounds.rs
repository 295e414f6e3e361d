// bounds.rs - planar bounding box and grid-space normalization
//
// Everything after decoding runs in double precision. Grid coordinates are
// only ever floored at cell boundaries, so rounding them to f32 here would
// move edge crossings between rows and columns.

use crate::error::FormatError;
use crate::mesh::{Triangle, Vertex};

/// Planar extents of the mesh. `low_y`/`high_y` span the world z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub low_x: f64,
    pub high_x: f64,
    pub low_y: f64,
    pub high_y: f64,
}

impl BoundingBox {
    /// Min/max of x and z over every vertex; heights do not contribute.
    /// `None` for an empty triangle list.
    pub fn from_triangles(triangles: &[Triangle]) -> Option<Self> {
        let mut vertices = triangles.iter().flat_map(|tri| tri.vertices());
        let first = vertices.next()?;
        let init = Self {
            low_x: first.x as f64,
            high_x: first.x as f64,
            low_y: first.z as f64,
            high_y: first.z as f64,
        };

        Some(vertices.fold(init, |bounds, v| Self {
            low_x: bounds.low_x.min(v.x as f64),
            high_x: bounds.high_x.max(v.x as f64),
            low_y: bounds.low_y.min(v.z as f64),
            high_y: bounds.high_y.max(v.z as f64),
        }))
    }

    pub fn map_width(&self) -> f64 {
        self.high_x - self.low_x
    }

    pub fn map_height(&self) -> f64 {
        self.high_y - self.low_y
    }
}

/// A vertex in grid space: column, row and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub row: f64,
    pub height: f64,
}

pub type GridTriangle = [GridPoint; 3];

/// World-to-grid transform: `x' = (x - origin_x) * scale`, `row = (z - origin_z) * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub origin_x: f64,
    pub origin_z: f64,
    pub scale: f64,
}

impl Normalization {
    /// Derive the uniform scale that maps the larger planar dimension onto
    /// `texture_size` cells.
    ///
    /// When the mesh is wider than it is deep, the z origin is pinned to 0
    /// rather than `low_y`. Downstream grids are laid out with this offset,
    /// so it is kept as is.
    pub fn fit(bounds: &BoundingBox, texture_size: usize) -> Result<Self, FormatError> {
        let width = bounds.map_width();
        let height = bounds.map_height();
        if width == 0.0 || height == 0.0 {
            return Err(FormatError::DegenerateBounds { width, height });
        }

        let size = texture_size as f64;
        let normalization = if height < width {
            Self {
                origin_x: bounds.low_x,
                origin_z: 0.0,
                scale: (1.0 / width) * size,
            }
        } else {
            Self {
                origin_x: bounds.low_x,
                origin_z: bounds.low_y,
                scale: (1.0 / height) * size,
            }
        };

        if !normalization.scale.is_finite() {
            return Err(FormatError::DegenerateBounds { width, height });
        }
        Ok(normalization)
    }

    pub fn apply(&self, v: Vertex) -> GridPoint {
        let (x, row) = self.to_grid(v.x as f64, v.z as f64);
        GridPoint {
            x,
            row,
            height: v.y as f64,
        }
    }

    /// Grid-space (column, row) of a world position.
    pub fn to_grid(&self, x: f64, z: f64) -> (f64, f64) {
        ((x - self.origin_x) * self.scale, (z - self.origin_z) * self.scale)
    }
}

/// Output of the normalizer: the grid-space triangles plus the original
/// map dimensions.
#[derive(Clone, Debug)]
pub struct NormalizedMesh {
    pub bounds: BoundingBox,
    pub normalization: Normalization,
    pub triangles: Vec<GridTriangle>,
}

impl NormalizedMesh {
    pub fn map_width(&self) -> f64 {
        self.bounds.map_width()
    }

    pub fn map_height(&self) -> f64 {
        self.bounds.map_height()
    }
}

pub fn normalize(triangles: &[Triangle], texture_size: usize) -> Result<NormalizedMesh, FormatError> {
    let bounds = BoundingBox::from_triangles(triangles).ok_or(FormatError::DegenerateBounds {
        width: 0.0,
        height: 0.0,
    })?;
    let normalization = Normalization::fit(&bounds, texture_size)?;

    tracing::debug!(
        "Bounds x=[{}, {}] z=[{}, {}] map={}x{} scale={}",
        bounds.low_x,
        bounds.high_x,
        bounds.low_y,
        bounds.high_y,
        bounds.map_width(),
        bounds.map_height(),
        normalization.scale
    );

    let triangles = triangles
        .iter()
        .map(|tri| tri.vertices().map(|v| normalization.apply(v)))
        .collect();

    Ok(NormalizedMesh {
        bounds,
        normalization,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: (f32, f32, f32), b: (f32, f32, f32), c: (f32, f32, f32)) -> Triangle {
        Triangle::new(
            Vertex::new(a.0, a.1, a.2),
            Vertex::new(b.0, b.1, b.2),
            Vertex::new(c.0, c.1, c.2),
        )
    }

    fn point(x: f64, height: f64, row: f64) -> GridPoint {
        GridPoint { x, row, height }
    }

    #[test]
    fn test_right_triangle_scenario() {
        let triangles = [tri((0.0, 5.0, 0.0), (10.0, 5.0, 0.0), (0.0, 5.0, 10.0))];
        let mesh = normalize(&triangles, 1024).unwrap();

        assert_eq!(
            mesh.bounds,
            BoundingBox {
                low_x: 0.0,
                high_x: 10.0,
                low_y: 0.0,
                high_y: 10.0
            }
        );
        assert_eq!(mesh.map_width(), 10.0);
        assert_eq!(mesh.map_height(), 10.0);
        assert!((mesh.normalization.scale - 102.4).abs() < 1e-12);

        assert_eq!(
            mesh.triangles[0],
            [
                point(0.0, 5.0, 0.0),
                point(1024.0, 5.0, 0.0),
                point(0.0, 5.0, 1024.0)
            ]
        );
    }

    #[test]
    fn test_height_is_ignored_by_bounds() {
        let triangles = [tri((1.0, -500.0, 2.0), (3.0, 900.0, 4.0), (2.0, 0.0, 8.0))];
        let bounds = BoundingBox::from_triangles(&triangles).unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                low_x: 1.0,
                high_x: 3.0,
                low_y: 2.0,
                high_y: 8.0
            }
        );
    }

    #[test]
    fn test_wide_mesh_pins_z_origin() {
        // width 200 > depth 50
        let triangles = [tri((100.0, 1.0, 30.0), (300.0, 2.0, 30.0), (100.0, 3.0, 80.0))];
        let mesh = normalize(&triangles, 1000).unwrap();

        assert_eq!(mesh.normalization.origin_x, 100.0);
        assert_eq!(mesh.normalization.origin_z, 0.0);
        assert_eq!(mesh.normalization.scale, 5.0);

        assert_eq!(
            mesh.triangles[0],
            [
                point(0.0, 1.0, 150.0),
                point(1000.0, 2.0, 150.0),
                point(0.0, 3.0, 400.0)
            ]
        );
    }

    #[test]
    fn test_deep_mesh_keeps_both_origins() {
        // depth 200 >= width 50
        let triangles = [tri((10.0, 0.0, -100.0), (60.0, 0.0, -100.0), (10.0, 0.0, 100.0))];
        let mesh = normalize(&triangles, 1000).unwrap();

        assert_eq!(mesh.normalization.origin_x, 10.0);
        assert_eq!(mesh.normalization.origin_z, -100.0);
        assert_eq!(mesh.normalization.scale, 5.0);

        let out = mesh.triangles[0];
        assert_eq!(out[1], point(250.0, 0.0, 0.0));
        assert_eq!(out[2], point(0.0, 0.0, 1000.0));
    }

    #[test]
    fn test_grid_coordinates_keep_double_precision() {
        // z range 2^26 wide gives scale 2^-16; 65535 + 2^25 is not a float,
        // so a single-precision offset would land exactly on row 513.
        let triangles = [
            tri((0.0, 0.0, -33_554_432.0), (0.0, 0.0, 33_554_432.0), (0.0, 0.0, 0.0)),
            tri((33_554_432.0, 7.0, 65_535.0), (29_360_128.0, 7.0, 4_259_840.0), (37_748_736.0, 7.0, 4_259_840.0)),
        ];
        let mesh = normalize(&triangles, 1024).unwrap();

        assert_eq!(mesh.normalization.scale, 1.0 / 65536.0);
        assert_eq!(mesh.map_width(), 37_748_736.0);
        assert_eq!(mesh.map_height(), 67_108_864.0);

        let apex = mesh.triangles[1][0];
        assert_eq!(apex.x, 512.0);
        assert_eq!(apex.row, 33_619_967.0 / 65536.0);
        assert!(apex.row < 513.0);
    }

    #[test]
    fn test_degenerate_bounds() {
        let flat_line = [tri((0.0, 1.0, 5.0), (10.0, 1.0, 5.0), (3.0, 1.0, 5.0))];
        assert_eq!(
            normalize(&flat_line, 1024).unwrap_err(),
            FormatError::DegenerateBounds {
                width: 10.0,
                height: 0.0
            }
        );

        assert!(matches!(
            normalize(&[], 1024),
            Err(FormatError::DegenerateBounds { .. })
        ));
    }
}
