use crate::diff::context::DiffContext;
use crate::foundation::core::{Affine, Rect, rect_intersect, rect_union, rects_overlap};
use crate::foundation::ids::LayerId;
use crate::layer::Layer;
use crate::layer::contents::LayerContents;
use crate::layer::context::{PaintContext, PrerollContext};
use crate::layer::mutators::Mutator;
use crate::paint::paint::BlendMode;
use crate::snapshot::contents::PixelAligned;

/// What a [`ContainerLayer`] does to its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContainerKind {
    /// Plain grouping.
    Group,
    /// Children are drawn under an extra transform.
    Transform(Affine),
    /// Children are clipped to a rect in this layer's space.
    ClipRect(Rect),
    /// Children are composited with a group opacity.
    Opacity(f32),
    /// Children are rasterized and composited onto the backdrop with a blend mode.
    Blend(BlendMode),
    /// Children are embedded in a platform view.
    PlatformView,
}

/// Layer owning an ordered list of children.
#[derive(Clone, Debug)]
pub struct ContainerLayer {
    pub(crate) id: LayerId,
    pub(crate) parent: Option<LayerId>,
    kind: ContainerKind,
    children: Vec<Layer>,
    pub(crate) paint_bounds: Rect,
    children_inherit_opacity: bool,
}

impl ContainerLayer {
    /// Empty container of `kind`.
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            id: LayerId::next(),
            parent: None,
            kind,
            children: Vec::new(),
            paint_bounds: Rect::ZERO,
            children_inherit_opacity: false,
        }
    }

    /// Empty group.
    pub fn group() -> Self {
        Self::new(ContainerKind::Group)
    }

    /// Empty transform container.
    pub fn transform(m: Affine) -> Self {
        Self::new(ContainerKind::Transform(m))
    }

    /// Empty clip container.
    pub fn clip_rect(rect: Rect) -> Self {
        Self::new(ContainerKind::ClipRect(rect))
    }

    /// Empty opacity container; `alpha` is clamped to `[0, 1]`.
    pub fn opacity(alpha: f32) -> Self {
        Self::new(ContainerKind::Opacity(alpha.clamp(0.0, 1.0)))
    }

    /// Empty blend container.
    pub fn blend(mode: BlendMode) -> Self {
        Self::new(ContainerKind::Blend(mode))
    }

    /// Empty platform-view container.
    pub fn platform_view() -> Self {
        Self::new(ContainerKind::PlatformView)
    }

    /// Same container with `child` appended.
    pub fn with_child(mut self, child: impl Into<Layer>) -> Self {
        self.add_child(child);
        self
    }

    /// Append `child`, making this container its parent.
    pub fn add_child(&mut self, child: impl Into<Layer>) {
        let mut child = child.into();
        child.set_parent(Some(self.id));
        self.children.push(child);
    }

    /// Remove and return the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Option<Layer> {
        if index >= self.children.len() {
            return None;
        }
        let mut child = self.children.remove(index);
        child.set_parent(None);
        Some(child)
    }

    /// Identity.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Container kind.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Change the kind, keeping identity and children.
    pub fn set_kind(&mut self, kind: ContainerKind) {
        self.kind = kind;
    }

    /// Children in paint order.
    pub fn children(&self) -> &[Layer] {
        &self.children
    }

    /// Mutable children in paint order.
    pub fn children_mut(&mut self) -> &mut [Layer] {
        &mut self.children
    }

    /// Whether the children can absorb an inherited opacity, as of the last preroll.
    pub fn children_inherit_opacity(&self) -> bool {
        self.children_inherit_opacity
    }

    pub(crate) fn preroll(&mut self, ctx: &mut PrerollContext<'_>, matrix: Affine) {
        let mut scope = ctx.scope();
        let mut child_matrix = matrix;
        match self.kind {
            ContainerKind::Group => {}
            ContainerKind::Transform(m) => {
                scope.mutators.push(Mutator::Transform(m));
                child_matrix = matrix * m;
            }
            ContainerKind::ClipRect(r) => {
                scope.mutators.push(Mutator::ClipRect(r));
                scope.clip_cull_rect(matrix, r);
            }
            ContainerKind::Opacity(a) => scope.mutators.push(Mutator::Opacity(a)),
            ContainerKind::Blend(_) => scope.surface_needs_readback = true,
            ContainerKind::PlatformView => scope.has_platform_view = true,
        }

        let (child_bounds, inherit) = preroll_children(&mut self.children, &mut scope, child_matrix);
        self.children_inherit_opacity = inherit;
        self.paint_bounds = match self.kind {
            ContainerKind::Transform(m) => m.transform_rect_bbox(child_bounds),
            ContainerKind::ClipRect(r) => rect_intersect(child_bounds, r),
            _ => child_bounds,
        };
        scope.subtree_can_inherit_opacity = match self.kind {
            ContainerKind::Opacity(_) => true,
            ContainerKind::Blend(_) | ContainerKind::PlatformView => false,
            _ => inherit,
        };
        tracing::trace!(
            id = ?self.id,
            kind = ?self.kind,
            bounds = ?self.paint_bounds,
            inherit,
            "container preroll"
        );
    }

    pub(crate) fn paint(&self, ctx: &mut PaintContext<'_>) {
        match self.kind {
            ContainerKind::Opacity(alpha) => self.paint_opacity(ctx, alpha),
            ContainerKind::Blend(mode) => self.paint_blend(ctx, mode),
            _ => {
                let opacity = ctx.inherited_opacity;
                if opacity < 1.0 && !self.children_inherit_opacity {
                    ctx.canvas
                        .save_layer(Some(self.paint_bounds), opacity, BlendMode::SrcOver);
                    ctx.with_inherited_opacity(1.0, |ctx| self.paint_transformed(ctx));
                    ctx.canvas.restore();
                } else {
                    self.paint_transformed(ctx);
                }
            }
        }
    }

    fn paint_transformed(&self, ctx: &mut PaintContext<'_>) {
        ctx.canvas.save();
        match self.kind {
            ContainerKind::Transform(m) => ctx.canvas.transform(m),
            ContainerKind::ClipRect(r) => ctx.canvas.clip_rect(r),
            _ => {}
        }
        self.paint_children(ctx);
        ctx.canvas.restore();
    }

    fn paint_children(&self, ctx: &mut PaintContext<'_>) {
        for child in &self.children {
            child.paint(ctx);
        }
    }

    fn paint_opacity(&self, ctx: &mut PaintContext<'_>, alpha: f32) {
        let opacity = ctx.inherited_opacity * alpha;
        if opacity <= 0.0 {
            return;
        }
        if self.children_inherit_opacity {
            ctx.with_inherited_opacity(opacity, |ctx| self.paint_children(ctx));
        } else {
            ctx.canvas
                .save_layer(Some(self.paint_bounds), opacity, BlendMode::SrcOver);
            ctx.with_inherited_opacity(1.0, |ctx| self.paint_children(ctx));
            ctx.canvas.restore();
        }
    }

    fn paint_blend(&self, ctx: &mut PaintContext<'_>, mode: BlendMode) {
        let opacity = ctx.inherited_opacity;
        if let Some(snapshotter) = ctx.snapshotter.as_deref_mut() {
            let matrix = ctx.canvas.total_matrix();
            let children = LayerContents::new(&self.children);
            let contents = PixelAligned(&children);
            let target = ctx.canvas.device_clip_bounds();
            if let Some(target) = target
                && !snapshotter.should_render(&contents, matrix, target)
            {
                return;
            }
            if let Some(snapshot) =
                snapshotter.render_to_snapshot_with_blend(&contents, matrix, mode)
            {
                ctx.layers_painted += 1;
                snapshot.draw(ctx.canvas, Affine::IDENTITY, opacity, mode);
                snapshotter.recycle(snapshot);
            }
            return;
        }

        ctx.canvas.save_layer(Some(self.paint_bounds), opacity, mode);
        ctx.with_inherited_opacity(1.0, |ctx| self.paint_children(ctx));
        ctx.canvas.restore();
    }

    pub(crate) fn diff_children(&self, cx: &mut DiffContext<'_>, old: Option<&ContainerLayer>) {
        match self.kind {
            ContainerKind::Transform(m) => cx.push_transform(m),
            ContainerKind::ClipRect(r) => cx.push_clip_rect(r),
            _ => {}
        }

        match old {
            Some(old) if !cx.is_subtree_dirty() => self.diff_matched_children(cx, old),
            _ => {
                for child in &self.children {
                    child.diff(cx, None);
                }
            }
        }

        if matches!(self.kind, ContainerKind::Blend(_)) {
            cx.mark_subtree_readback();
        }
    }

    /// Pair children by matching prefix and suffix; the unmatched middle is a structural
    /// change: removed children damage their old region, inserted ones are diffed dirty.
    fn diff_matched_children(&self, cx: &mut DiffContext<'_>, old: &ContainerLayer) {
        let new = &self.children;
        let prev = &old.children;

        let mut top = 0;
        while top < new.len() && top < prev.len() && new[top].is_replacing(cx, &prev[top]) {
            top += 1;
        }
        let (mut new_end, mut old_end) = (new.len(), prev.len());
        while new_end > top
            && old_end > top
            && new[new_end - 1].is_replacing(cx, &prev[old_end - 1])
        {
            new_end -= 1;
            old_end -= 1;
        }

        for removed in &prev[top..old_end] {
            tracing::trace!(id = ?removed.id(), "diff: child removed");
            if let Some(region) = cx.old_region(removed.id()) {
                cx.add_damage(region);
            }
        }

        for (i, child) in new.iter().enumerate() {
            if i < top {
                child.diff(cx, Some(&prev[i]));
            } else if i >= new_end {
                child.diff(cx, Some(&prev[i - new_end + old_end]));
            } else {
                tracing::trace!(id = ?child.id(), "diff: child inserted");
                child.diff(cx, None);
            }
        }
    }
}

/// Preroll `children` under `matrix`; return their bounds union and whether an inherited
/// opacity can be pushed down to all of them (each can, and none overlap).
fn preroll_children(
    children: &mut [Layer],
    ctx: &mut PrerollContext<'_>,
    matrix: Affine,
) -> (Rect, bool) {
    let mut bounds = Rect::ZERO;
    let mut inherit = true;
    let mut seen: Vec<Rect> = Vec::with_capacity(children.len());
    for child in children.iter_mut() {
        ctx.subtree_can_inherit_opacity = false;
        child.preroll(ctx, matrix);
        let child_bounds = child.paint_bounds();
        if !ctx.subtree_can_inherit_opacity || seen.iter().any(|b| rects_overlap(*b, child_bounds)) {
            inherit = false;
        }
        seen.push(child_bounds);
        bounds = rect_union(bounds, child_bounds);
    }
    (bounds, inherit)
}
