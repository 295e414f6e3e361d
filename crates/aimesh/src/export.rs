use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavMeshError, Result};
use crate::heightmap::HeightmapGrid;
use crate::mesh::Triangle;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDimensions {
    pub width: f64,
    pub height: f64,
}

/// The record written for downstream consumers: the heightmap, the world-space
/// map size, and the untransformed triangle vertices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavMeshExport {
    /// Row-major, `texture_size²` cells.
    pub height_map: Vec<f32>,
    pub dimensions: MapDimensions,
    /// Nine floats per triangle: v1, v2, v3 each as x, y, z.
    pub vertices: Vec<f32>,
}

impl NavMeshExport {
    /// `triangles` must be the decoded, world-space triangles, not the
    /// normalized ones.
    pub fn new(grid: &HeightmapGrid, dimensions: MapDimensions, triangles: &[Triangle]) -> Self {
        let vertices = triangles
            .iter()
            .flat_map(|tri| tri.vertices())
            .flat_map(|v| [v.x, v.y, v.z])
            .collect();

        Self {
            height_map: grid.cells().to_vec(),
            dimensions,
            vertices,
        }
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Serialize fully in memory, then write; a serialization failure leaves
    /// `path` untouched.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| NavMeshError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
