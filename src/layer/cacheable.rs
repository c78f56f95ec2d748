use crate::foundation::core::{Affine, Rect, rects_overlap};
use crate::foundation::ids::LayerId;
use crate::layer::Layer;
use crate::layer::contents::LayerContents;
use crate::layer::context::{PaintContext, PrerollContext};

/// Decorator that lets the raster cache stand in for the wrapped layer.
#[derive(Clone, Debug)]
pub struct CacheableLayer {
    pub(crate) id: LayerId,
    pub(crate) parent: Option<LayerId>,
    pub(crate) inner: Box<Layer>,
    pub(crate) paint_bounds: Rect,
    cache_hit: bool,
}

impl CacheableLayer {
    /// Wrap `inner`.
    pub fn new(inner: impl Into<Layer>) -> Self {
        let id = LayerId::next();
        let mut inner = inner.into();
        inner.set_parent(Some(id));
        Self {
            id,
            parent: None,
            inner: Box::new(inner),
            paint_bounds: Rect::ZERO,
            cache_hit: false,
        }
    }

    /// Identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Wrapped layer.
    pub fn inner(&self) -> &Layer {
        &self.inner
    }

    /// Mutable wrapped layer.
    pub fn inner_mut(&mut self) -> &mut Layer {
        &mut self.inner
    }

    /// Whether the last preroll was served from the raster cache.
    pub fn was_cache_hit(&self) -> bool {
        self.cache_hit
    }

    pub(crate) fn preroll(&mut self, ctx: &mut PrerollContext<'_>, matrix: Affine) {
        self.cache_hit = false;
        let cacheable = !ctx.has_platform_view
            && !ctx.has_texture_layer
            && !self.inner.contains_platform_view()
            && !self.inner.contains_texture_layer();

        if cacheable
            && let Some(cache) = ctx.raster_cache.as_deref_mut()
            && let Some(bounds) =
                cache.touch_content(self.id, matrix, Some(self.inner.content_fingerprint()))
        {
            self.cache_hit = true;
            self.paint_bounds = bounds;
            ctx.subtree_can_inherit_opacity = true;
            // The skipped subtree still reads back when painted from its source.
            if self.inner.contains_readback() {
                ctx.surface_needs_readback = true;
            }
            return;
        }

        self.inner.preroll(ctx, matrix);
        self.paint_bounds = self.inner.paint_bounds();
        if !cacheable || !rects_overlap(matrix.transform_rect_bbox(self.paint_bounds), ctx.cull_rect)
        {
            return;
        }

        let (Some(cache), Some(snapshotter)) =
            (ctx.raster_cache.as_deref_mut(), ctx.snapshotter.as_deref_mut())
        else {
            return;
        };
        let contents = LayerContents::single(&self.inner);
        let prepared = cache.prepare(
            self.id,
            matrix,
            self.paint_bounds,
            self.inner.complexity(),
            &contents,
            snapshotter,
        );
        if prepared {
            ctx.subtree_can_inherit_opacity = true;
        }
    }

    pub(crate) fn paint(&self, ctx: &mut PaintContext<'_>) {
        if let Some(cache) = ctx.raster_cache
            && cache.draw(self.id, ctx.canvas, ctx.inherited_opacity)
        {
            ctx.layers_painted += 1;
            return;
        }
        self.inner.paint(ctx);
    }
}
