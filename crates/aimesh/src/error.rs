use std::path::PathBuf;

use aimesh_shared::util::BufferError;
use thiserror::Error;

pub type Result<T, E = NavMeshError> = std::result::Result<T, E>;

/// The input bytes do not describe a mesh that can be processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("buffer holds {actual} bytes but {triangles} triangles need {expected}")]
    Truncated {
        expected: usize,
        actual: usize,
        triangles: usize,
    },

    #[error(transparent)]
    UnexpectedEof(#[from] BufferError),

    /// Zero-area planar bounds (or no triangles at all) give no usable scale.
    #[error("degenerate bounding box: width {width}, height {height}")]
    DegenerateBounds { width: f64, height: f64 },
}

#[derive(Debug, Error)]
pub enum NavMeshError {
    #[error("invalid AIMesh data")]
    Format(#[from] FormatError),

    #[error("unable to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize navmesh export")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Settings(String),
}
