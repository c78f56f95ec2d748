use crate::foundation::core::{Affine, Rect, rect_is_empty, rect_union};
use crate::layer::Layer;
use crate::layer::context::PaintContext;
use crate::paint::canvas::Canvas;
use crate::render::target::RenderOptions;
use crate::snapshot::contents::Contents;

/// Prerolled layers viewed as snapshot [`Contents`].
///
/// Painting inside a snapshot uses no raster cache and no nested offscreen passes.
pub(crate) struct LayerContents<'l> {
    layers: &'l [Layer],
}

impl<'l> LayerContents<'l> {
    pub(crate) fn new(layers: &'l [Layer]) -> Self {
        Self { layers }
    }

    pub(crate) fn single(layer: &'l Layer) -> Self {
        Self {
            layers: std::slice::from_ref(layer),
        }
    }

    fn bounds(&self) -> Rect {
        self.layers
            .iter()
            .fold(Rect::ZERO, |acc, l| rect_union(acc, l.paint_bounds()))
    }
}

impl Contents for LayerContents<'_> {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        let bounds = self.bounds();
        if rect_is_empty(bounds) {
            return None;
        }
        Some(transform.transform_rect_bbox(bounds))
    }

    fn render(&self, canvas: &mut dyn Canvas, transform: Affine, _options: &RenderOptions) -> bool {
        canvas.save();
        canvas.transform(transform);
        let mut ctx = PaintContext::new(canvas);
        for layer in self.layers {
            layer.paint(&mut ctx);
        }
        canvas.restore();
        true
    }
}
