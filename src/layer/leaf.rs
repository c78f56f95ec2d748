use crate::foundation::core::{BezPath, Rect};
use crate::foundation::ids::LayerId;
use crate::layer::context::{PaintContext, PrerollContext};
use crate::paint::canvas::Canvas;
use crate::paint::display_list::{DisplayList, DisplayListBuilder, Picture};
use crate::paint::paint::{BlendMode, Paint};

/// Behavior switches of a [`LeafLayer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeafOpts {
    /// The leaf embeds a platform view; the ambient flag is forced on for its preroll.
    pub has_platform_view: bool,
    /// The leaf samples the surface it paints onto.
    pub reads_surface: bool,
    /// The picture's draws do not overlap, so an inherited opacity can be applied per draw.
    pub opacity_compatible: bool,
    /// The leaf is backed by an external texture.
    pub has_texture_layer: bool,
}

/// Layer drawing a recorded [`Picture`].
#[derive(Clone, Debug)]
pub struct LeafLayer {
    pub(crate) id: LayerId,
    pub(crate) parent: Option<LayerId>,
    picture: Picture,
    opts: LeafOpts,
    pub(crate) paint_bounds: Rect,
    parent_has_platform_view: bool,
}

impl LeafLayer {
    /// Leaf drawing `picture`.
    pub fn new(picture: Picture) -> Self {
        Self {
            id: LayerId::next(),
            parent: None,
            picture,
            opts: LeafOpts::default(),
            paint_bounds: Rect::ZERO,
            parent_has_platform_view: false,
        }
    }

    /// Leaf filling a single path.
    pub fn from_path(path: &BezPath, paint: Paint) -> Self {
        let mut b = DisplayListBuilder::new();
        b.draw_path(path, &paint);
        Self::new(b.build_picture())
    }

    /// Same leaf with `opts`.
    pub fn with_opts(mut self, opts: LeafOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Recorded content.
    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    /// Replace the recorded content, keeping the identity.
    pub fn set_picture(&mut self, picture: Picture) {
        self.picture = picture;
    }

    /// Behavior switches.
    pub fn opts(&self) -> LeafOpts {
        self.opts
    }

    /// Whether the ambient platform-view flag was set when this leaf was last prerolled.
    pub fn parent_has_platform_view(&self) -> bool {
        self.parent_has_platform_view
    }

    pub(crate) fn preroll(&mut self, ctx: &mut PrerollContext<'_>) {
        self.parent_has_platform_view = ctx.has_platform_view;
        let mut scope = ctx.scope();
        if self.opts.has_platform_view {
            scope.has_platform_view = true;
        }
        if self.opts.has_texture_layer {
            scope.has_texture_layer = true;
        }
        if self.opts.reads_surface {
            scope.surface_needs_readback = true;
        }
        self.paint_bounds = self.picture.bounds();
        scope.subtree_can_inherit_opacity = self.opts.opacity_compatible;
        tracing::trace!(id = ?self.id, bounds = ?self.paint_bounds, "leaf preroll");
    }

    pub(crate) fn paint(&self, ctx: &mut PaintContext<'_>) {
        let opacity = ctx.inherited_opacity;
        if opacity <= 0.0 {
            return;
        }
        ctx.layers_painted += 1;
        if opacity >= 1.0 {
            self.picture.play_back(ctx.canvas);
        } else if self.opts.opacity_compatible {
            self.picture.play_back_with_opacity(ctx.canvas, opacity);
        } else {
            ctx.canvas
                .save_layer(Some(self.paint_bounds), opacity, BlendMode::SrcOver);
            self.picture.play_back(ctx.canvas);
            ctx.canvas.restore();
        }
    }

    pub(crate) fn is_replacing(&self, old: &LeafLayer, max_compared_ops: usize) -> bool {
        self.opts == old.opts
            && DisplayList::content_equals(&self.picture, &old.picture, max_compared_ops)
    }
}
