//! Retained layer tree: a closed set of node variants sharing one protocol.
//!
//! Each frame runs [`Layer::preroll`] (bounds and flags, top-down), [`Layer::diff`] against the
//! previous frame's tree, then [`Layer::paint`] for nodes that intersect the damage.

pub(crate) mod cacheable;
pub(crate) mod container;
pub(crate) mod contents;
pub(crate) mod context;
pub(crate) mod leaf;
pub(crate) mod mutators;

use crate::diff::context::DiffContext;
use crate::foundation::core::{Affine, Rect, rect_is_empty};
use crate::foundation::ids::LayerId;
use crate::foundation::math::{Fingerprint, StableHasher};
use crate::layer::cacheable::CacheableLayer;
use crate::layer::container::{ContainerKind, ContainerLayer};
use crate::layer::context::{PaintContext, PrerollContext};
use crate::layer::leaf::LeafLayer;

/// A node of the retained tree.
#[derive(Clone, Debug)]
pub enum Layer {
    /// Draws a recorded picture.
    Leaf(LeafLayer),
    /// Groups children under a transform, clip, opacity, blend or platform view.
    Container(ContainerLayer),
    /// Lets the raster cache stand in for the wrapped layer.
    Cacheable(CacheableLayer),
}

impl From<LeafLayer> for Layer {
    fn from(l: LeafLayer) -> Self {
        Self::Leaf(l)
    }
}

impl From<ContainerLayer> for Layer {
    fn from(l: ContainerLayer) -> Self {
        Self::Container(l)
    }
}

impl From<CacheableLayer> for Layer {
    fn from(l: CacheableLayer) -> Self {
        Self::Cacheable(l)
    }
}

impl Layer {
    /// Stable identity.
    pub fn id(&self) -> LayerId {
        match self {
            Self::Leaf(l) => l.id,
            Self::Container(c) => c.id,
            Self::Cacheable(c) => c.id,
        }
    }

    /// Identity of the owning layer, if any.
    pub fn parent(&self) -> Option<LayerId> {
        match self {
            Self::Leaf(l) => l.parent,
            Self::Container(c) => c.parent,
            Self::Cacheable(c) => c.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<LayerId>) {
        match self {
            Self::Leaf(l) => l.parent = parent,
            Self::Container(c) => c.parent = parent,
            Self::Cacheable(c) => c.parent = parent,
        }
    }

    /// Bounds in the parent's coordinate space. Only meaningful after this frame's preroll.
    pub fn paint_bounds(&self) -> Rect {
        match self {
            Self::Leaf(l) => l.paint_bounds,
            Self::Container(c) => c.paint_bounds,
            Self::Cacheable(c) => c.paint_bounds,
        }
    }

    /// Return `true` for the raster-cache decorator.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Cacheable(_))
    }

    /// Draw-op count of the subtree; the raster cache's cost estimate.
    pub fn complexity(&self) -> usize {
        match self {
            Self::Leaf(l) => l.picture().complexity(),
            Self::Container(c) => c.children().iter().map(Layer::complexity).sum(),
            Self::Cacheable(c) => c.inner.complexity(),
        }
    }

    /// Return `true` when the subtree embeds a platform view.
    pub fn contains_platform_view(&self) -> bool {
        match self {
            Self::Leaf(l) => l.opts().has_platform_view,
            Self::Container(c) => {
                c.kind() == ContainerKind::PlatformView
                    || c.children().iter().any(Layer::contains_platform_view)
            }
            Self::Cacheable(c) => c.inner.contains_platform_view(),
        }
    }

    /// Return `true` when the subtree contains a texture-backed leaf.
    pub fn contains_texture_layer(&self) -> bool {
        match self {
            Self::Leaf(l) => l.opts().has_texture_layer,
            Self::Container(c) => c.children().iter().any(Layer::contains_texture_layer),
            Self::Cacheable(c) => c.inner.contains_texture_layer(),
        }
    }

    /// Return `true` when painting the subtree reads back the surface underneath it.
    pub fn contains_readback(&self) -> bool {
        match self {
            Self::Leaf(l) => l.opts().reads_surface,
            Self::Container(c) => {
                matches!(c.kind(), ContainerKind::Blend(_))
                    || c.children().iter().any(Layer::contains_readback)
            }
            Self::Cacheable(c) => c.inner.contains_readback(),
        }
    }

    /// Fingerprint of what the subtree draws. Identities do not contribute, so equal pictures
    /// under equal containers hash equal.
    pub(crate) fn content_fingerprint(&self) -> Fingerprint {
        let mut h = StableHasher::new();
        self.write_content(&mut h);
        h.finish()
    }

    fn write_content(&self, h: &mut StableHasher) {
        match self {
            Self::Leaf(l) => {
                let fp = l.picture().fingerprint();
                h.write_u8(0);
                h.write_u64(fp.hi);
                h.write_u64(fp.lo);
            }
            Self::Container(c) => {
                h.write_u8(1);
                match c.kind() {
                    ContainerKind::Group => h.write_u8(0),
                    ContainerKind::Transform(m) => {
                        h.write_u8(1);
                        for v in m.as_coeffs() {
                            h.write_f64(v);
                        }
                    }
                    ContainerKind::ClipRect(r) => {
                        h.write_u8(2);
                        for v in [r.x0, r.y0, r.x1, r.y1] {
                            h.write_f64(v);
                        }
                    }
                    ContainerKind::Opacity(a) => {
                        h.write_u8(3);
                        h.write_f32(a);
                    }
                    ContainerKind::Blend(mode) => {
                        h.write_u8(4);
                        h.write_u8(mode.tag());
                    }
                    ContainerKind::PlatformView => h.write_u8(5),
                }
                h.write_u32(c.children().len() as u32);
                for child in c.children() {
                    child.write_content(h);
                }
            }
            Self::Cacheable(c) => c.inner.write_content(h),
        }
    }

    /// Find the layer with identity `id` in this subtree.
    pub fn find(&self, id: LayerId) -> Option<&Layer> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Self::Leaf(_) => None,
            Self::Container(c) => c.children().iter().find_map(|child| child.find(id)),
            Self::Cacheable(c) => c.inner.find(id),
        }
    }

    /// Compute paint bounds and propagate flags. `matrix` is the accumulated transform of the
    /// parent's space.
    pub fn preroll(&mut self, ctx: &mut PrerollContext<'_>, matrix: Affine) {
        match self {
            Self::Leaf(l) => l.preroll(ctx),
            Self::Container(c) => c.preroll(ctx, matrix),
            Self::Cacheable(c) => c.preroll(ctx, matrix),
        }
    }

    /// Return `true` when painting could change any visible pixel.
    pub fn needs_painting(&self, ctx: &PaintContext<'_>) -> bool {
        let bounds = self.paint_bounds();
        !rect_is_empty(bounds) && !ctx.canvas.quick_reject(bounds)
    }

    /// Emit draws onto the context canvas. Nodes outside the clip are skipped.
    pub fn paint(&self, ctx: &mut PaintContext<'_>) {
        if !self.needs_painting(ctx) {
            return;
        }
        match self {
            Self::Leaf(l) => l.paint(ctx),
            Self::Container(c) => c.paint(ctx),
            Self::Cacheable(c) => c.paint(ctx),
        }
    }

    /// Return `true` when this layer draws exactly what `old` drew last frame.
    ///
    /// Containers compare their kind; children are matched separately by [`Layer::diff`].
    pub fn is_replacing(&self, ctx: &DiffContext<'_>, old: &Layer) -> bool {
        match (self, old) {
            (Self::Leaf(new), Self::Leaf(old)) => {
                new.is_replacing(old, ctx.opts().max_compared_ops)
            }
            (Self::Container(new), Self::Container(old)) => new.kind() == old.kind(),
            (Self::Cacheable(new), Self::Cacheable(old)) => new.inner.is_replacing(ctx, &old.inner),
            _ => false,
        }
    }

    /// Compare against `old` (the layer this one replaces, `None` when inserted) and record
    /// this frame's paint region.
    pub fn diff(&self, ctx: &mut DiffContext<'_>, old: Option<&Layer>) {
        let mut cx = ctx.subtree();
        let replaced = match old {
            Some(old) if !cx.is_subtree_dirty() && self.is_replacing(&cx, old) => Some(old),
            Some(old) => {
                if !cx.is_subtree_dirty() {
                    let prev = cx.old_region(old.id());
                    cx.mark_subtree_dirty(prev);
                }
                None
            }
            None => {
                cx.mark_subtree_dirty(None);
                None
            }
        };

        match self {
            Self::Leaf(l) => {
                let bounds = l.picture().bounds();
                cx.add_layer_bounds(bounds);
                if l.opts().reads_surface {
                    cx.add_readback_region(bounds);
                }
            }
            Self::Container(c) => {
                let old = match replaced {
                    Some(Self::Container(old)) => Some(old),
                    _ => None,
                };
                c.diff_children(&mut cx, old);
            }
            Self::Cacheable(c) => {
                let old = match replaced {
                    Some(Self::Cacheable(old)) => Some(&*old.inner),
                    _ => None,
                };
                c.inner.diff(&mut cx, old);
            }
        }

        let region = cx.current_subtree_region();
        if let (Self::Leaf(_), Some(old)) = (self, replaced) {
            cx.compare_with_previous(old.id(), &region);
        }
        cx.set_layer_paint_region(self.id(), region);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/layer.rs"]
mod tests;
