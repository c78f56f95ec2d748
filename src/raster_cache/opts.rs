use crate::raster_cache::key::TransformMatch;

/// Raster cache policy knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterCacheOpts {
    /// Consecutive frames a (layer, transform) pair must be requested before it is cached.
    pub access_threshold: u32,
    /// Draw-op count at or above which a subtree is cached on first sight.
    pub complexity_threshold: usize,
    /// Upper bound on snapshots rasterized per frame.
    pub max_rasterizations_per_frame: usize,
    /// Transform matching policy for entry reuse.
    pub transform_match: TransformMatch,
}

impl Default for RasterCacheOpts {
    fn default() -> Self {
        Self {
            access_threshold: 2,
            complexity_threshold: 8,
            max_rasterizations_per_frame: 3,
            transform_match: TransformMatch::SnapTranslation,
        }
    }
}

impl RasterCacheOpts {
    /// Set the consecutive-access threshold.
    pub fn with_access_threshold(mut self, frames: u32) -> Self {
        self.access_threshold = frames;
        self
    }

    /// Set the complexity threshold.
    pub fn with_complexity_threshold(mut self, ops: usize) -> Self {
        self.complexity_threshold = ops;
        self
    }

    /// Set the per-frame rasterization budget.
    pub fn with_max_rasterizations_per_frame(mut self, n: usize) -> Self {
        self.max_rasterizations_per_frame = n;
        self
    }

    /// Set the transform matching policy.
    pub fn with_transform_match(mut self, policy: TransformMatch) -> Self {
        self.transform_match = policy;
        self
    }
}
