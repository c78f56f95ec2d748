use crate::diff::context::{DiffContext, DiffResult};
use crate::diff::damage::DiffOpts;
use crate::diff::region::PaintRegionMap;
use crate::foundation::core::{Affine, PixelSize};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::Layer;
use crate::layer::context::{PaintContext, PrerollContext};
use crate::paint::cpu_canvas::CpuCanvas;
use crate::render::surface::FrameRGBA;
use crate::snapshot::snapshotter::ContentSnapshotter;

/// One frame's layer tree: a root layer and the size of the surface it is composited onto.
#[derive(Clone, Debug)]
pub struct LayerTree {
    root: Layer,
    frame_size: PixelSize,
}

impl LayerTree {
    /// Tree drawing `root` into a `frame_size` surface.
    pub fn new(root: impl Into<Layer>, frame_size: PixelSize) -> Self {
        Self {
            root: root.into(),
            frame_size,
        }
    }

    /// Root layer.
    pub fn root(&self) -> &Layer {
        &self.root
    }

    /// Mutable root layer, for retained updates between frames.
    pub fn root_mut(&mut self) -> &mut Layer {
        &mut self.root
    }

    /// Surface size.
    pub fn frame_size(&self) -> PixelSize {
        self.frame_size
    }

    /// Run the preroll pass from the root.
    #[tracing::instrument(skip_all, fields(root = ?self.root.id()))]
    pub fn preroll(&mut self, ctx: &mut PrerollContext<'_>) {
        self.root.preroll(ctx, Affine::IDENTITY);
    }

    /// Diff against `old` (the tree of the previous frame) using its recorded `history`.
    #[tracing::instrument(skip_all, fields(root = ?self.root.id()))]
    pub fn diff(
        &self,
        old: Option<&LayerTree>,
        history: &PaintRegionMap,
        opts: DiffOpts,
    ) -> DiffResult {
        let mut cx = DiffContext::new(history, opts);
        self.root.diff(&mut cx, old.map(|t| &t.root));
        let out = cx.finish();
        tracing::debug!(
            rects = out.damage.rects().len(),
            frame_damage = ?out.damage.frame_damage(),
            "diff damage"
        );
        out
    }

    /// Run the paint pass from the root.
    #[tracing::instrument(skip_all, fields(root = ?self.root.id()))]
    pub fn paint(&self, ctx: &mut PaintContext<'_>) {
        self.root.paint(ctx);
    }

    /// Preroll and paint the whole tree into a fresh `width` x `height` image, without any
    /// raster cache or damage tracking.
    pub fn rasterize_to_image(&mut self, width: u32, height: u32) -> LaminaResult<FrameRGBA> {
        if width == 0 || height == 0 {
            return Err(LaminaError::validation(
                "rasterize_to_image requires non-zero width and height",
            ));
        }
        let size = PixelSize::new(width, height);
        let mut canvas = CpuCanvas::new(size)?;
        let mut snapshotter = ContentSnapshotter::default();

        let mut preroll = PrerollContext::new(size.to_rect());
        self.preroll(&mut preroll);

        let mut ctx = PaintContext::new(&mut canvas).with_snapshotter(&mut snapshotter);
        self.paint(&mut ctx);
        Ok(FrameRGBA::from_pixmap(&canvas.finish()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/tree.rs"]
mod tests;
