use std::ops::{Deref, DerefMut};

use crate::foundation::core::{Affine, Rect, rect_intersect};
use crate::layer::mutators::MutatorsStack;
use crate::paint::canvas::Canvas;
use crate::raster_cache::cache::RasterCache;
use crate::snapshot::snapshotter::ContentSnapshotter;

/// Top-down traversal state for one preroll pass.
///
/// Ambient flags flow downward and are scoped with [`PrerollContext::scope`]; the
/// `surface_needs_readback` and `subtree_can_inherit_opacity` outputs flow upward.
pub struct PrerollContext<'a> {
    pub(crate) raster_cache: Option<&'a mut RasterCache>,
    pub(crate) snapshotter: Option<&'a mut ContentSnapshotter>,
    /// Ancestor clip/transform/opacity operations.
    pub mutators: MutatorsStack,
    /// Visible region in device space.
    pub cull_rect: Rect,
    /// An ancestor (or the current node) embeds a platform view.
    pub has_platform_view: bool,
    /// An ancestor (or the current node) is a texture layer.
    pub has_texture_layer: bool,
    /// Some node reads back the surface it paints onto.
    pub surface_needs_readback: bool,
    /// The node just prerolled can absorb an inherited opacity without a group layer.
    pub subtree_can_inherit_opacity: bool,
}

impl<'a> PrerollContext<'a> {
    /// Start a traversal that culls to `cull_rect` (device space), without caching.
    pub fn new(cull_rect: Rect) -> Self {
        Self {
            raster_cache: None,
            snapshotter: None,
            mutators: MutatorsStack::default(),
            cull_rect,
            has_platform_view: false,
            has_texture_layer: false,
            surface_needs_readback: false,
            subtree_can_inherit_opacity: false,
        }
    }

    /// Probe and populate `cache` during the traversal.
    pub fn with_raster_cache(mut self, cache: &'a mut RasterCache) -> Self {
        self.raster_cache = Some(cache);
        self
    }

    /// Render snapshots with `snapshotter`.
    pub fn with_snapshotter(mut self, snapshotter: &'a mut ContentSnapshotter) -> Self {
        self.snapshotter = Some(snapshotter);
        self
    }

    /// Save ambient state; it is restored when the returned scope drops.
    ///
    /// Restored: `has_platform_view`, `has_texture_layer`, the mutators stack and the cull rect.
    pub fn scope(&mut self) -> PrerollScope<'_, 'a> {
        let saved = AmbientState {
            has_platform_view: self.has_platform_view,
            has_texture_layer: self.has_texture_layer,
            mutators_len: self.mutators.len(),
            cull_rect: self.cull_rect,
        };
        PrerollScope { ctx: self, saved }
    }

    /// Narrow the cull rect by a clip `local` to `matrix`.
    pub fn clip_cull_rect(&mut self, matrix: Affine, local: Rect) {
        self.cull_rect = rect_intersect(self.cull_rect, matrix.transform_rect_bbox(local));
    }

    /// Cull rect mapped back into the space `matrix` maps from, or `None` when `matrix` is
    /// singular.
    pub fn local_cull_rect(&self, matrix: Affine) -> Option<Rect> {
        if matrix.determinant().abs() <= f64::EPSILON {
            return None;
        }
        Some(matrix.inverse().transform_rect_bbox(self.cull_rect))
    }
}

#[derive(Clone, Copy, Debug)]
struct AmbientState {
    has_platform_view: bool,
    has_texture_layer: bool,
    mutators_len: usize,
    cull_rect: Rect,
}

/// Ambient-state guard returned by [`PrerollContext::scope`].
pub struct PrerollScope<'c, 'a> {
    ctx: &'c mut PrerollContext<'a>,
    saved: AmbientState,
}

impl<'a> Deref for PrerollScope<'_, 'a> {
    type Target = PrerollContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for PrerollScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for PrerollScope<'_, '_> {
    fn drop(&mut self) {
        self.ctx.has_platform_view = self.saved.has_platform_view;
        self.ctx.has_texture_layer = self.saved.has_texture_layer;
        self.ctx.mutators.truncate(self.saved.mutators_len);
        self.ctx.cull_rect = self.saved.cull_rect;
    }
}

/// State for one paint pass.
pub struct PaintContext<'a> {
    /// Drawing target.
    pub canvas: &'a mut dyn Canvas,
    /// Opacity ancestors asked this subtree to apply.
    pub inherited_opacity: f32,
    pub(crate) raster_cache: Option<&'a RasterCache>,
    pub(crate) snapshotter: Option<&'a mut ContentSnapshotter>,
    pub(crate) layers_painted: usize,
}

impl<'a> PaintContext<'a> {
    /// Paint onto `canvas` with no cache and no offscreen support.
    pub fn new(canvas: &'a mut dyn Canvas) -> Self {
        Self {
            canvas,
            inherited_opacity: 1.0,
            raster_cache: None,
            snapshotter: None,
            layers_painted: 0,
        }
    }

    /// Draw cached snapshots from `cache`.
    pub fn with_raster_cache(mut self, cache: &'a RasterCache) -> Self {
        self.raster_cache = Some(cache);
        self
    }

    /// Use `snapshotter` for effects that need rasterized input.
    pub fn with_snapshotter(mut self, snapshotter: &'a mut ContentSnapshotter) -> Self {
        self.snapshotter = Some(snapshotter);
        self
    }

    /// Layers that emitted draws so far.
    pub fn layers_painted(&self) -> usize {
        self.layers_painted
    }

    /// Run `f` with the inherited opacity replaced by `opacity`.
    pub(crate) fn with_inherited_opacity<R>(
        &mut self,
        opacity: f32,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.inherited_opacity;
        self.inherited_opacity = opacity;
        let out = f(self);
        self.inherited_opacity = saved;
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/context.rs"]
mod tests;
