use aimesh_shared::config::Config;

use crate::error::{NavMeshError, Result};
use crate::heightmap::{DEFAULT_TEXTURE_SIZE, NO_DATA_HEIGHT};

/// Environment override prefix for config keys, e.g. `AIMesh_Grid_TextureSize`.
pub const CONFIG_ENV_PREFIX: &str = "AIMesh_";

const MAX_TEXTURE_SIZE: usize = 16384;

/// Parameters of one conversion run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertSettings {
    /// Side length of the square heightmap, in cells.
    pub texture_size: usize,
    pub no_data_height: f32,
    /// Rasterizer workers; 1 draws triangles sequentially on the calling thread.
    pub threads: usize,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
            no_data_height: NO_DATA_HEIGHT,
            threads: 1,
        }
    }
}

impl ConvertSettings {
    /// Read `Grid.TextureSize`, `Grid.NoDataHeight` and `Rasterize.Threads`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = Self::default();
        let texture_size = config.get_int_default("Grid.TextureSize", defaults.texture_size as i32);
        let threads = config.get_int_default("Rasterize.Threads", defaults.threads as i32);

        let settings = Self {
            texture_size: usize::try_from(texture_size).map_err(|_| {
                NavMeshError::Settings(format!("Grid.TextureSize must be positive, got {texture_size}"))
            })?,
            no_data_height: config.get_float_default("Grid.NoDataHeight", defaults.no_data_height),
            threads: usize::try_from(threads).map_err(|_| {
                NavMeshError::Settings(format!("Rasterize.Threads must be positive, got {threads}"))
            })?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.texture_size == 0 || self.texture_size > MAX_TEXTURE_SIZE {
            return Err(NavMeshError::Settings(format!(
                "texture size must be in 1..={MAX_TEXTURE_SIZE}, got {}",
                self.texture_size
            )));
        }
        if self.threads == 0 {
            return Err(NavMeshError::Settings("thread count must be at least 1".into()));
        }
        if !self.no_data_height.is_finite() {
            return Err(NavMeshError::Settings(format!(
                "no-data height must be finite, got {}",
                self.no_data_height
            )));
        }
        Ok(())
    }
}
