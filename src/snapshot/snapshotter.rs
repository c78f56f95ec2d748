use crate::foundation::core::{Affine, PixelSize, Rect, rect_is_empty, rects_overlap};
use crate::paint::canvas::Canvas;
use crate::paint::cpu_canvas::CpuCanvas;
use crate::paint::paint::BlendMode;
use crate::paint::texture::Texture;
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::render::target::{OffscreenTarget, RenderOptions};
use crate::snapshot::contents::Contents;

/// Rasterized content plus the transform that places it back in the space it was rendered for.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Rendered pixels; the texture origin is the coverage origin.
    pub texture: Texture,
    /// Placement transform; a pure translation by the coverage origin.
    pub transform: Affine,
}

impl Snapshot {
    /// Bounds of the snapshot in placement space.
    pub fn bounds(&self) -> Rect {
        self.transform
            .transform_rect_bbox(self.texture.size().to_rect())
    }

    /// Draw the snapshot onto `canvas` at its placement, relative to `base`.
    pub(crate) fn draw(
        &self,
        canvas: &mut dyn Canvas,
        base: Affine,
        opacity: f32,
        blend_mode: BlendMode,
    ) {
        canvas.save();
        canvas.set_matrix(base * self.transform);
        canvas.draw_texture(&self.texture, opacity, blend_mode);
        canvas.restore();
    }
}

/// Snapshot counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Snapshots produced.
    pub rendered: u64,
    /// Requests that produced nothing (no coverage, zero size, failed render).
    pub skipped: u64,
}

/// On-demand offscreen renderer turning [`Contents`] into [`Snapshot`]s.
pub struct ContentSnapshotter {
    pool: SurfacePool,
    sample_count: u32,
    stats: SnapshotStats,
}

impl ContentSnapshotter {
    /// Create a snapshotter with its own offscreen pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            pool: SurfacePool::new(opts),
            sample_count: 1,
            stats: SnapshotStats::default(),
        }
    }

    /// Counters.
    pub fn stats(&self) -> SnapshotStats {
        self.stats
    }

    /// Counters of the offscreen pool.
    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    pub(crate) fn pool_mut(&mut self) -> &mut SurfacePool {
        &mut self.pool
    }

    /// Return `true` when `contents` under `transform` would land inside `target`.
    pub fn should_render(&self, contents: &dyn Contents, transform: Affine, target: Rect) -> bool {
        match contents.coverage(transform) {
            Some(coverage) => rects_overlap(coverage, target),
            None => false,
        }
    }

    /// Render `contents` under `transform` into a texture sized to its coverage.
    pub fn render_to_snapshot(
        &mut self,
        contents: &dyn Contents,
        transform: Affine,
    ) -> Option<Snapshot> {
        self.render_to_snapshot_with_blend(contents, transform, BlendMode::SrcOver)
    }

    /// Like [`ContentSnapshotter::render_to_snapshot`], for output that will be composited with
    /// `blend_mode`.
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn render_to_snapshot_with_blend(
        &mut self,
        contents: &dyn Contents,
        transform: Affine,
        blend_mode: BlendMode,
    ) -> Option<Snapshot> {
        let snapshot = self.try_render(contents, transform, blend_mode);
        match &snapshot {
            Some(_) => self.stats.rendered += 1,
            None => self.stats.skipped += 1,
        }
        snapshot
    }

    fn try_render(
        &mut self,
        contents: &dyn Contents,
        transform: Affine,
        blend_mode: BlendMode,
    ) -> Option<Snapshot> {
        let coverage = contents.coverage(transform)?;
        if rect_is_empty(coverage) || !coverage.is_finite() {
            return None;
        }
        let size = PixelSize::ceil(coverage.size());
        if size.is_empty() {
            return None;
        }

        let mut canvas = match CpuCanvas::new(size) {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(?size, %err, "snapshot target rejected");
                return None;
            }
        };
        let target = OffscreenTarget {
            size,
            sample_count: self.sample_count,
        };
        let options = RenderOptions::from_target_and_blend(&target, blend_mode);

        let origin = coverage.origin();
        canvas.translate(-origin.x, -origin.y);
        if !contents.render(&mut canvas, transform, &options) {
            return None;
        }

        let mut pixmap = match self.pool.borrow(size) {
            Ok(p) => p,
            Err(err) => {
                tracing::debug!(?size, %err, "snapshot pixmap allocation failed");
                return None;
            }
        };
        canvas.finish_into(&mut pixmap);
        Some(Snapshot {
            texture: Texture::from_pixmap(pixmap),
            transform: Affine::translate(origin.to_vec2()),
        })
    }

    /// Return a snapshot's pixels to the pool when nothing else holds them.
    pub fn recycle(&mut self, snapshot: Snapshot) {
        if let Some(pixmap) = snapshot.texture.into_pixmap() {
            self.pool.release(pixmap);
        }
    }
}

impl Default for ContentSnapshotter {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/snapshotter.rs"]
mod tests;
