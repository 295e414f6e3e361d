// aimesh - AIMesh navigation mesh ingestion
//
// Decodes the binary AIMesh triangle file, normalizes the triangles onto a
// square grid and rasterizes them into a heightmap for terrain-height
// lookups. The pipeline runs once per input; nothing is kept between runs.

pub mod bounds;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod mesh;
pub mod raster;
pub mod settings;

use std::path::Path;

pub use bounds::{BoundingBox, GridPoint, GridTriangle, Normalization, NormalizedMesh};
pub use error::{FormatError, NavMeshError, Result};
pub use export::{MapDimensions, NavMeshExport};
pub use heightmap::{Heightmap, HeightmapGrid, NO_DATA_HEIGHT};
pub use mesh::{MeshFile, Triangle, Vertex};
pub use settings::ConvertSettings;

/// Everything produced by one conversion run.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub mesh: MeshFile,
    pub bounds: BoundingBox,
    pub heightmap: Heightmap,
}

impl Conversion {
    pub fn dimensions(&self) -> MapDimensions {
        MapDimensions {
            width: self.bounds.map_width(),
            height: self.bounds.map_height(),
        }
    }

    /// Assemble the output record, carrying the original world-space vertices.
    pub fn export(&self) -> NavMeshExport {
        NavMeshExport::new(&self.heightmap.grid, self.dimensions(), &self.mesh.triangles)
    }
}

/// Decode, normalize and rasterize an in-memory AIMesh file.
pub fn convert(bytes: &[u8], settings: &ConvertSettings) -> Result<Conversion> {
    settings.validate()?;

    let mesh = MeshFile::from_bytes(bytes)?;
    tracing::info!(
        "Loaded AIMesh '{}' v{} with {} triangles",
        mesh.magic_str(),
        mesh.version,
        mesh.triangle_count()
    );

    let normalized = bounds::normalize(&mesh.triangles, settings.texture_size)?;
    tracing::info!(
        "Map dimensions {}x{}, grid {}x{}",
        normalized.map_width(),
        normalized.map_height(),
        settings.texture_size,
        settings.texture_size
    );

    let grid = raster::rasterize_parallel(
        &normalized.triangles,
        settings.texture_size,
        settings.no_data_height,
        settings.threads,
    );
    tracing::info!(
        "Rasterized {} triangles, {} of {} cells have height data",
        normalized.triangles.len(),
        grid.coverage(),
        grid.size() * grid.size()
    );

    Ok(Conversion {
        mesh,
        bounds: normalized.bounds,
        heightmap: Heightmap {
            grid,
            normalization: normalized.normalization,
        },
    })
}

/// Convert `input` and write the pretty-printed JSON record to `output`.
///
/// `output` is only created once the whole record has been built.
pub fn convert_file(input: &Path, output: &Path, settings: &ConvertSettings) -> Result<Conversion> {
    let bytes = std::fs::read(input).map_err(|source| NavMeshError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), input.display());

    let conversion = convert(&bytes, settings)?;
    conversion.export().write_json(output)?;
    Ok(conversion)
}
