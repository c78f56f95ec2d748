use std::collections::HashMap;

use crate::foundation::core::{FrameIndex, PixelSize};
use crate::foundation::error::LaminaResult;

/// Pool configuration for cached offscreen pixmaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained pixmaps per size bucket.
    pub max_surfaces_per_bucket: usize,
    /// Buckets untouched for this many frames are released by [`SurfacePool::trim_idle`].
    pub max_idle_frames: u64,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
            max_idle_frames: 60,
        }
    }
}

impl SurfacePoolOpts {
    /// Set the global retained byte cap.
    pub fn with_max_pool_bytes(mut self, bytes: usize) -> Self {
        self.max_pool_bytes = bytes;
        self
    }

    /// Set the per-bucket cap.
    pub fn with_max_surfaces_per_bucket(mut self, n: usize) -> Self {
        self.max_surfaces_per_bucket = n;
        self
    }

    /// Set the idle trimming horizon.
    pub fn with_max_idle_frames(mut self, frames: u64) -> Self {
        self.max_idle_frames = frames;
        self
    }
}

/// Pool counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Pixmaps currently held by the pool.
    pub retained_surfaces: usize,
    /// Bytes currently held by the pool.
    pub retained_bytes: usize,
    /// Fresh allocations made by [`SurfacePool::borrow`].
    pub alloc_surfaces: u64,
    /// Bytes allocated by [`SurfacePool::borrow`].
    pub alloc_bytes: u64,
    /// Releases that were dropped because a cap was hit.
    pub dropped_on_release: u64,
    /// Pixmaps dropped by idle trimming.
    pub trimmed: u64,
}

struct Bucket {
    size: PixelSize,
    surfaces: Vec<vello_cpu::Pixmap>,
    last_used: FrameIndex,
}

/// Bounded pooled allocator for CPU pixmaps, keyed by pixel size.
///
/// Borrow/release happen per offscreen pass, never per pixel.
pub struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    now: FrameIndex,

    // Hash lookup is fine at pass granularity.
    bucket_idx_by_size: HashMap<PixelSize, usize>,
    buckets: Vec<Bucket>,
}

impl SurfacePool {
    /// Create an empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            now: FrameIndex::default(),
            bucket_idx_by_size: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    /// Current counters.
    pub fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    /// Advance the pool clock; buckets touched afterwards count as used in `frame`.
    pub fn set_frame(&mut self, frame: FrameIndex) {
        self.now = frame;
    }

    /// Take a pixmap of `size` from the pool, allocating when none is retained.
    ///
    /// Reused pixmaps keep their previous contents.
    pub fn borrow(&mut self, size: PixelSize) -> LaminaResult<vello_cpu::Pixmap> {
        let bytes = size.rgba8_len();
        if let Some(&bi) = self.bucket_idx_by_size.get(&size) {
            let bucket = &mut self.buckets[bi];
            bucket.last_used = self.now;
            if let Some(p) = bucket.surfaces.pop() {
                self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
                self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(bytes);
                return Ok(p);
            }
        }

        let (w, h) = size.to_u16()?;
        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes as u64);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    /// Return a pixmap to the pool; it is dropped when a cap would be exceeded.
    pub fn release(&mut self, pixmap: vello_cpu::Pixmap) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let size = PixelSize::new(u32::from(pixmap.width()), u32::from(pixmap.height()));
        let bytes = size.rgba8_len();

        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match self.bucket_idx_by_size.get(&size).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Bucket {
                    size,
                    surfaces: Vec::new(),
                    last_used: self.now,
                });
                self.bucket_idx_by_size.insert(size, i);
                i
            }
        };

        let bucket = &mut self.buckets[bi];
        bucket.last_used = self.now;
        if bucket.surfaces.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.surfaces.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drop every bucket that has not been used for more than `max_idle_frames` frames.
    pub fn trim_idle(&mut self) {
        let now = self.now.0;
        let max_idle = self.opts.max_idle_frames;
        let mut trimmed = 0usize;
        let mut trimmed_bytes = 0usize;
        self.buckets.retain(|b| {
            let keep = now.saturating_sub(b.last_used.0) <= max_idle;
            if !keep {
                trimmed += b.surfaces.len();
                trimmed_bytes += b.surfaces.len() * b.size.rgba8_len();
            }
            keep
        });
        self.reindex();
        if trimmed == 0 {
            return;
        }
        tracing::debug!(trimmed, trimmed_bytes, "surface pool trimmed idle buckets");
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(trimmed);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(trimmed_bytes);
        self.stats.trimmed = self.stats.trimmed.saturating_add(trimmed as u64);
    }

    fn reindex(&mut self) {
        self.bucket_idx_by_size.clear();
        for (i, b) in self.buckets.iter().enumerate() {
            self.bucket_idx_by_size.insert(b.size, i);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
