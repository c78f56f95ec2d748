use std::collections::HashMap;

use crate::foundation::core::{Affine, FrameIndex, Rect};
use crate::foundation::ids::LayerId;
use crate::foundation::math::Fingerprint;
use crate::paint::canvas::Canvas;
use crate::paint::paint::BlendMode;
use crate::raster_cache::key::RasterCacheKey;
use crate::raster_cache::opts::RasterCacheOpts;
use crate::snapshot::contents::{Contents, PixelAligned};
use crate::snapshot::snapshotter::{ContentSnapshotter, Snapshot};

/// Cache counters. Totals are cumulative since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterCacheStats {
    /// Probes that found a snapshot.
    pub hits: u64,
    /// Probes that found none.
    pub misses: u64,
    /// Entries removed by the end-of-frame sweep.
    pub evictions: u64,
    /// Snapshots rasterized.
    pub rasterizations: u64,
    /// Live entries, with or without a snapshot.
    pub entries: usize,
    /// Bytes held by live snapshots.
    pub retained_bytes: usize,
}

#[derive(Debug)]
struct Entry {
    snapshot: Option<Snapshot>,
    /// Layer paint bounds at rasterization time.
    bounds: Rect,
    /// Content the snapshot was rasterized from, when the prober tracks it.
    content: Option<Fingerprint>,
    last_access: FrameIndex,
    access_count: u32,
}

/// Cross-frame store of rasterized layer snapshots keyed by identity and transform class.
///
/// Entries live exactly as long as they are probed every frame: [`RasterCache::end_frame`]
/// sweeps everything not touched since [`RasterCache::begin_frame`].
#[derive(Debug)]
pub struct RasterCache {
    opts: RasterCacheOpts,
    entries: HashMap<RasterCacheKey, Entry>,
    frame: FrameIndex,
    rasterized_this_frame: usize,
    stats: RasterCacheStats,
}

impl RasterCache {
    /// Create an empty cache.
    pub fn new(opts: RasterCacheOpts) -> Self {
        Self {
            opts,
            entries: HashMap::new(),
            frame: FrameIndex::default(),
            rasterized_this_frame: 0,
            stats: RasterCacheStats::default(),
        }
    }

    /// Policy in effect.
    pub fn opts(&self) -> RasterCacheOpts {
        self.opts
    }

    /// Start a frame; probes from here on mark entries as used in `frame`.
    pub fn begin_frame(&mut self, frame: FrameIndex) {
        self.frame = frame;
        self.rasterized_this_frame = 0;
    }

    fn key(&self, layer: LayerId, matrix: Affine) -> RasterCacheKey {
        RasterCacheKey::new(layer, matrix, self.opts.transform_match)
    }

    /// Preroll probe: mark `(layer, matrix)` accessed this frame and return the cached paint
    /// bounds on a hit.
    pub fn touch(&mut self, layer: LayerId, matrix: Affine) -> Option<Rect> {
        self.touch_content(layer, matrix, None)
    }

    /// [`RasterCache::touch`] that also checks the snapshot against the current `content` of the
    /// layer; a snapshot of different content is dropped and the probe misses.
    pub(crate) fn touch_content(
        &mut self,
        layer: LayerId,
        matrix: Affine,
        content: Option<Fingerprint>,
    ) -> Option<Rect> {
        let key = self.key(layer, matrix);
        let frame = self.frame;
        let entry = self.entries.entry(key).or_insert(Entry {
            snapshot: None,
            bounds: Rect::ZERO,
            content,
            last_access: frame,
            access_count: 0,
        });
        if content.is_some() && entry.content != content {
            if entry.snapshot.take().is_some() {
                tracing::debug!(?layer, "raster cache entry stale: content changed");
            }
            entry.content = content;
        }
        if entry.access_count == 0 {
            entry.access_count = 1;
        } else if entry.last_access != frame {
            entry.access_count = if entry.last_access.next() == frame {
                entry.access_count.saturating_add(1)
            } else {
                1
            };
            entry.last_access = frame;
        }

        if entry.snapshot.is_some() {
            self.stats.hits += 1;
            tracing::trace!(?layer, "raster cache hit");
            Some(entry.bounds)
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Decide whether to rasterize `contents` for `(layer, matrix)` after a missed probe, and do
    /// so when the cost policy and the per-frame budget allow it.
    ///
    /// Returns `true` when a snapshot is available afterwards.
    pub fn prepare(
        &mut self,
        layer: LayerId,
        matrix: Affine,
        bounds: Rect,
        complexity: usize,
        contents: &dyn Contents,
        snapshotter: &mut ContentSnapshotter,
    ) -> bool {
        let key = self.key(layer, matrix);
        let policy = self.opts.transform_match;
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        if entry.snapshot.is_some() {
            return true;
        }

        let worth = complexity >= self.opts.complexity_threshold
            || entry.access_count >= self.opts.access_threshold;
        if !worth {
            tracing::trace!(
                ?layer,
                complexity,
                accesses = entry.access_count,
                "raster cache skip: not worth caching yet"
            );
            return false;
        }
        if self.rasterized_this_frame >= self.opts.max_rasterizations_per_frame {
            tracing::trace!(?layer, "raster cache skip: frame budget exhausted");
            return false;
        }

        let aligned = PixelAligned(contents);
        let Some(snapshot) = snapshotter.render_to_snapshot(&aligned, policy.raster_matrix(matrix))
        else {
            return false;
        };
        tracing::debug!(
            ?layer,
            size = ?snapshot.texture.size(),
            complexity,
            "raster cache rasterized entry"
        );
        entry.snapshot = Some(snapshot);
        entry.bounds = bounds;
        self.rasterized_this_frame += 1;
        self.stats.rasterizations += 1;
        true
    }

    /// Cached snapshot for `(layer, matrix)`, without touching access state.
    pub fn get(&self, layer: LayerId, matrix: Affine) -> Option<&Snapshot> {
        self.entries
            .get(&self.key(layer, matrix))
            .and_then(|e| e.snapshot.as_ref())
    }

    /// Return `true` when an entry (with or without snapshot) exists for `(layer, matrix)`.
    pub fn contains(&self, layer: LayerId, matrix: Affine) -> bool {
        self.entries.contains_key(&self.key(layer, matrix))
    }

    /// Draw the snapshot cached for `layer` under the canvas's current matrix.
    ///
    /// Returns `false` (and draws nothing) when there is none.
    pub fn draw(&self, layer: LayerId, canvas: &mut dyn Canvas, opacity: f32) -> bool {
        let matrix = canvas.total_matrix();
        let Some(snapshot) = self.get(layer, matrix) else {
            return false;
        };
        let base = self.opts.transform_match.draw_base(matrix);
        snapshot.draw(canvas, base, opacity, BlendMode::SrcOver);
        true
    }

    /// Sweep every entry not accessed during the current frame. Returns the eviction count.
    pub fn end_frame(&mut self) -> usize {
        let frame = self.frame;
        let before = self.entries.len();
        self.entries.retain(|_, e| e.last_access == frame);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.entries.len(), "raster cache sweep");
        }
        self.stats.evictions += evicted as u64;
        evicted
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current counters.
    pub fn stats(&self) -> RasterCacheStats {
        RasterCacheStats {
            entries: self.entries.len(),
            retained_bytes: self
                .entries
                .values()
                .filter_map(|e| e.snapshot.as_ref())
                .map(|s| s.texture.byte_len())
                .sum(),
            ..self.stats
        }
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new(RasterCacheOpts::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster_cache/cache.rs"]
mod tests;
