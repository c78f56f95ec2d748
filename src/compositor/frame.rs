use crate::compositor::opts::CompositorOpts;
use crate::compositor::tree::LayerTree;
use crate::diff::damage::Damage;
use crate::diff::region::PaintRegionMap;
use crate::foundation::core::{FrameIndex, rect_is_empty};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::context::{PaintContext, PrerollContext};
use crate::paint::canvas::Canvas;
use crate::paint::cpu_canvas::{CpuCanvas, blit_region};
use crate::paint::paint::Paint;
use crate::raster_cache::cache::{RasterCache, RasterCacheStats};
use crate::render::capabilities::{BASELINE_FEATURES, Capabilities, CpuCapabilities, require_features};
use crate::render::surface::SurfaceProducer;
use crate::render::target::RenderTarget;
use crate::snapshot::snapshotter::ContentSnapshotter;

/// What one [`Compositor::draw_frame`] call did.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Index of the frame drawn.
    pub frame: FrameIndex,
    /// Pixels repainted, in device space.
    pub damage: Damage,
    /// The whole surface was repainted regardless of the diff.
    pub full_repaint: bool,
    /// A surface was acquired and submitted.
    pub presented: bool,
    /// Layers that emitted draws.
    pub layers_painted: usize,
    /// Some layer reads back the surface it paints onto.
    pub surface_needs_readback: bool,
    /// Raster cache entries swept at the end of the frame.
    pub evicted: usize,
    /// Raster cache counters after the frame.
    pub raster_cache: RasterCacheStats,
}

/// Per-surface frame driver.
///
/// Owns everything that persists between frames: the raster cache, the previous tree and its
/// paint regions, and the snapshot pool. Each [`Compositor::draw_frame`] runs preroll, diff and
/// paint over a new tree, then keeps that tree as the baseline of the next frame.
pub struct Compositor {
    opts: CompositorOpts,
    raster_cache: RasterCache,
    snapshotter: ContentSnapshotter,
    history: PaintRegionMap,
    last_tree: Option<LayerTree>,
    frame: FrameIndex,
}

impl Compositor {
    /// Create a compositor for the built-in CPU rasterizer.
    pub fn new(opts: CompositorOpts) -> LaminaResult<Self> {
        Self::with_capabilities(opts, &CpuCapabilities)
    }

    /// Create a compositor after checking that `caps` provides the baseline feature set.
    pub fn with_capabilities(opts: CompositorOpts, caps: &dyn Capabilities) -> LaminaResult<Self> {
        require_features(caps, BASELINE_FEATURES)?;
        tracing::debug!(backend = caps.name(), ?opts, "compositor ready");
        Ok(Self {
            opts,
            raster_cache: RasterCache::new(opts.raster_cache),
            snapshotter: ContentSnapshotter::new(opts.pool),
            history: PaintRegionMap::default(),
            last_tree: None,
            frame: FrameIndex::default(),
        })
    }

    /// Options in effect.
    pub fn opts(&self) -> CompositorOpts {
        self.opts
    }

    /// Index the next frame will get.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Persistent raster cache.
    pub fn raster_cache(&self) -> &RasterCache {
        &self.raster_cache
    }

    /// Snapshot renderer shared by the cache and effect layers.
    pub fn snapshotter(&self) -> &ContentSnapshotter {
        &self.snapshotter
    }

    /// Paint regions recorded by the last presented frame.
    pub fn history(&self) -> &PaintRegionMap {
        &self.history
    }

    /// Tree of the last presented frame.
    pub fn last_tree(&self) -> Option<&LayerTree> {
        self.last_tree.as_ref()
    }

    /// Forget the previous frame and every cached snapshot; the next frame repaints fully.
    pub fn reset(&mut self) {
        self.raster_cache.clear();
        self.history = PaintRegionMap::default();
        self.last_tree = None;
    }

    /// Composite `tree` onto a surface from `producer`.
    ///
    /// When the producer has no surface the frame is skipped: the cache still advances, but
    /// the previous tree stays the diff baseline since nothing new reached the screen.
    #[tracing::instrument(skip_all, fields(frame = self.frame.0))]
    pub fn draw_frame(
        &mut self,
        mut tree: LayerTree,
        producer: &mut dyn SurfaceProducer,
    ) -> LaminaResult<FrameReport> {
        let size = tree.frame_size();
        if size.is_empty() {
            return Err(LaminaError::validation("frame size must be non-zero"));
        }
        let frame = self.frame;
        let bounds = size.to_rect();
        self.raster_cache.begin_frame(frame);
        self.snapshotter.pool_mut().set_frame(frame);

        let surface_needs_readback = {
            let mut ctx = PrerollContext::new(bounds)
                .with_raster_cache(&mut self.raster_cache)
                .with_snapshotter(&mut self.snapshotter);
            tree.preroll(&mut ctx);
            ctx.surface_needs_readback
        };

        let diff = tree.diff(self.last_tree.as_ref(), &self.history, self.opts.diff);
        let mut canvas = CpuCanvas::new(size)?;

        let Some(mut surface) = producer.produce_surface(size) else {
            tracing::debug!(?size, "no surface available; frame skipped");
            let evicted = self.raster_cache.end_frame();
            self.frame = frame.next();
            return Ok(FrameReport {
                frame,
                damage: Damage::default(),
                full_repaint: false,
                presented: false,
                layers_painted: 0,
                surface_needs_readback,
                evicted,
                raster_cache: self.raster_cache.stats(),
            });
        };

        // Without a baseline tree nobody knows what the retained pixels show.
        let full_repaint = !self.opts.partial_repaint
            || self.last_tree.is_none()
            || !surface.has_previous_contents()
            || surface.size() != size;
        let damage = if full_repaint {
            Damage::full(bounds)
        } else {
            diff.damage.clipped_to(bounds)
        };

        let mut layers_painted = 0;
        if !damage.is_empty() {
            let frame_damage = damage.frame_damage();
            canvas.save();
            canvas.clip_rect(frame_damage);
            let clear = self.opts.clear_color();
            if clear.a > 0 {
                canvas.draw_rect(frame_damage, &Paint::fill(clear));
            }

            let mut ctx = PaintContext::new(&mut canvas)
                .with_raster_cache(&self.raster_cache)
                .with_snapshotter(&mut self.snapshotter);
            tree.paint(&mut ctx);
            layers_painted = ctx.layers_painted();
            canvas.restore();

            let mut scratch = self.snapshotter.pool_mut().borrow(size)?;
            canvas.finish_into(&mut scratch);
            for rect in damage.rects() {
                if !rect_is_empty(*rect) {
                    blit_region(&scratch, surface.pixmap_mut(), *rect);
                }
            }
            self.snapshotter.pool_mut().release(scratch);
        }

        producer.submit_surfaces(vec![surface]);
        let evicted = self.raster_cache.end_frame();
        self.snapshotter.pool_mut().trim_idle();
        self.history = diff.regions;
        self.last_tree = Some(tree);
        self.frame = frame.next();

        let report = FrameReport {
            frame,
            damage,
            full_repaint,
            presented: true,
            layers_painted,
            surface_needs_readback,
            evicted,
            raster_cache: self.raster_cache.stats(),
        };
        tracing::debug!(
            frame = frame.0,
            full_repaint,
            frame_damage = ?report.damage.frame_damage(),
            layers_painted,
            cache_entries = report.raster_cache.entries,
            "frame composited"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/frame.rs"]
mod tests;
