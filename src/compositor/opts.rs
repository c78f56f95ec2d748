use std::path::Path;

use crate::diff::damage::DiffOpts;
use crate::foundation::core::Color;
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::raster_cache::key::TransformMatch;
use crate::raster_cache::opts::RasterCacheOpts;
use crate::render::surface_pool::SurfacePoolOpts;

/// Environment override for [`RasterCacheOpts::access_threshold`].
pub const ENV_ACCESS_THRESHOLD: &str = "LAMINA_RASTER_CACHE_ACCESS_THRESHOLD";
/// Environment override for [`RasterCacheOpts::transform_match`] (`exact` or `snap_translation`).
pub const ENV_TRANSFORM_MATCH: &str = "LAMINA_RASTER_CACHE_TRANSFORM_MATCH";
/// Environment override for [`CompositorOpts::partial_repaint`] (`1`/`0`/`true`/`false`).
pub const ENV_PARTIAL_REPAINT: &str = "LAMINA_PARTIAL_REPAINT";

/// Options of a [`Compositor`](crate::Compositor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Raster cache policy.
    pub raster_cache: RasterCacheOpts,
    /// Offscreen pixmap pool used by snapshots and frame scratch buffers.
    pub pool: SurfacePoolOpts,
    /// Damage computation.
    pub diff: DiffOpts,
    /// Repaint only damaged pixels when the surface still holds the previous frame.
    pub partial_repaint: bool,
    /// Straight RGBA8 color damaged pixels are cleared to before painting.
    pub clear_rgba: [u8; 4],
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            raster_cache: RasterCacheOpts::default(),
            pool: SurfacePoolOpts::default(),
            diff: DiffOpts::default(),
            partial_repaint: true,
            clear_rgba: [0, 0, 0, 0],
        }
    }
}

impl CompositorOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> LaminaResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> LaminaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LaminaError::validation(format!("read options '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `LAMINA_*` environment overrides.
    pub fn with_env_overrides(self) -> LaminaResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LaminaResult<Self> {
        if let Some(v) = lookup(ENV_ACCESS_THRESHOLD) {
            let n = v.trim().parse::<u32>().map_err(|_| {
                LaminaError::validation(format!(
                    "{ENV_ACCESS_THRESHOLD} must be an integer, got '{v}'"
                ))
            })?;
            self.raster_cache.access_threshold = n;
        }
        if let Some(v) = lookup(ENV_TRANSFORM_MATCH) {
            self.raster_cache.transform_match = TransformMatch::parse(&v).ok_or_else(|| {
                LaminaError::validation(format!(
                    "{ENV_TRANSFORM_MATCH} must be 'exact' or 'snap_translation', got '{v}'"
                ))
            })?;
        }
        if let Some(v) = lookup(ENV_PARTIAL_REPAINT) {
            self.partial_repaint = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(LaminaError::validation(format!(
                        "{ENV_PARTIAL_REPAINT} must be a boolean, got '{v}'"
                    )));
                }
            };
        }
        Ok(self)
    }

    /// Set the raster cache policy.
    pub fn with_raster_cache(mut self, opts: RasterCacheOpts) -> Self {
        self.raster_cache = opts;
        self
    }

    /// Set the pool configuration.
    pub fn with_pool(mut self, opts: SurfacePoolOpts) -> Self {
        self.pool = opts;
        self
    }

    /// Set the damage options.
    pub fn with_diff(mut self, opts: DiffOpts) -> Self {
        self.diff = opts;
        self
    }

    /// Enable or disable partial repaint.
    pub fn with_partial_repaint(mut self, on: bool) -> Self {
        self.partial_repaint = on;
        self
    }

    /// Set the clear color.
    pub fn with_clear(mut self, color: Color) -> Self {
        self.clear_rgba = [color.r, color.g, color.b, color.a];
        self
    }

    pub(crate) fn clear_color(&self) -> Color {
        let [r, g, b, a] = self.clear_rgba;
        Color::rgba8(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/opts.rs"]
mod tests;
