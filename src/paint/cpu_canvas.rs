use crate::foundation::core::{Affine, BezPath, PixelSize, Rect};
use crate::foundation::error::LaminaResult;
use crate::paint::canvas::{Canvas, StateStack};
use crate::paint::paint::{BlendMode, Paint};
use crate::paint::texture::Texture;

/// Rasterizing [`Canvas`] backed by `vello_cpu`.
///
/// Draws accumulate in the render context; [`CpuCanvas::finish_into`] rasterizes them into a
/// pixmap, replacing its contents.
pub struct CpuCanvas {
    ctx: vello_cpu::RenderContext,
    size: PixelSize,
    state: StateStack,
}

impl CpuCanvas {
    /// Create a canvas for a `size` target, clipped to the target bounds.
    pub fn new(size: PixelSize) -> LaminaResult<Self> {
        let (w, h) = size.to_u16()?;
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            size,
            state: StateStack::new(Some(size.to_rect())),
        })
    }

    /// Target dimensions.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Close any open saves and rasterize into `dst`.
    pub fn finish_into(mut self, dst: &mut vello_cpu::Pixmap) {
        self.restore_to_count(1);
        // Clips applied on the base state still hold layers of their own.
        let base = std::mem::take(&mut self.state.top_mut().layers);
        for _ in 0..base {
            self.ctx.pop_layer();
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(dst);
    }

    /// Close any open saves and rasterize into a fresh pixmap.
    pub fn finish(self) -> vello_cpu::Pixmap {
        let (w, h) = (self.ctx.width(), self.ctx.height());
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.finish_into(&mut pixmap);
        pixmap
    }

    fn apply_transform(&mut self) {
        let m = self.state.top().matrix;
        self.ctx.set_transform(affine_to_cpu(m));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn with_blend(&mut self, blend_mode: BlendMode, draw: impl FnOnce(&mut vello_cpu::RenderContext)) {
        if blend_mode.reads_destination() {
            self.ctx.set_blend_mode(blend_mode.to_cpu());
            draw(&mut self.ctx);
            self.ctx
                .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        } else {
            draw(&mut self.ctx);
        }
    }
}

impl Canvas for CpuCanvas {
    fn save(&mut self) {
        self.state.push();
    }

    fn save_layer(&mut self, _bounds: Option<Rect>, opacity: f32, blend_mode: BlendMode) {
        self.state.push();
        let mut layers = 0;
        if blend_mode.reads_destination() {
            self.ctx.push_blend_layer(blend_mode.to_cpu());
            layers += 1;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
            layers += 1;
        }
        self.state.top_mut().layers = layers;
    }

    fn restore(&mut self) {
        if let Some(state) = self.state.pop() {
            for _ in 0..state.layers {
                self.ctx.pop_layer();
            }
        }
    }

    fn save_count(&self) -> usize {
        self.state.depth()
    }

    fn transform(&mut self, m: Affine) {
        self.state.concat(m);
    }

    fn set_matrix(&mut self, m: Affine) {
        self.state.top_mut().matrix = m;
    }

    fn total_matrix(&self) -> Affine {
        self.state.top().matrix
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
        self.apply_transform();
        self.ctx.push_clip_layer(&rect_to_cpu_path(rect));
        self.state.top_mut().layers += 1;
    }

    fn device_clip_bounds(&self) -> Option<Rect> {
        self.state.top().clip
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        if paint.color.a == 0 {
            return;
        }
        self.apply_transform();
        let c = paint.color;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        let cpu_path = bezpath_to_cpu(path);
        self.with_blend(paint.blend_mode, |ctx| ctx.fill_path(&cpu_path));
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        if paint.color.a == 0 {
            return;
        }
        self.apply_transform();
        let c = paint.color;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        let r = rect_to_cpu(rect.abs());
        self.with_blend(paint.blend_mode, |ctx| ctx.fill_rect(&r));
    }

    fn draw_texture(&mut self, texture: &Texture, opacity: f32, blend_mode: BlendMode) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 || texture.size().is_empty() {
            return;
        }
        self.apply_transform();
        self.ctx.set_paint(texture.image_paint());
        let r = rect_to_cpu(texture.size().to_rect());
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.with_blend(blend_mode, |ctx| ctx.fill_rect(&r));
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn rect_to_cpu_path(r: Rect) -> vello_cpu::kurbo::BezPath {
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to(vello_cpu::kurbo::Point::new(r.x0, r.y0));
    p.line_to(vello_cpu::kurbo::Point::new(r.x1, r.y0));
    p.line_to(vello_cpu::kurbo::Point::new(r.x1, r.y1));
    p.line_to(vello_cpu::kurbo::Point::new(r.x0, r.y1));
    p.close_path();
    p
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Copy the pixels of `src` inside `region` (device space, rounded out) into `dst`.
///
/// Both pixmaps must have the same dimensions; otherwise nothing is copied.
pub(crate) fn blit_region(src: &vello_cpu::Pixmap, dst: &mut vello_cpu::Pixmap, region: Rect) {
    if src.width() != dst.width() || src.height() != dst.height() {
        return;
    }
    let w = usize::from(src.width());
    let h = usize::from(src.height());
    let r = region.expand();
    let x0 = r.x0.max(0.0).min(w as f64) as usize;
    let x1 = r.x1.max(0.0).min(w as f64) as usize;
    let y0 = r.y0.max(0.0).min(h as f64) as usize;
    let y1 = r.y1.max(0.0).min(h as f64) as usize;
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let src_bytes = src.data_as_u8_slice();
    let dst_bytes = dst.data_as_u8_slice_mut();
    for y in y0..y1 {
        let start = (y * w + x0) * 4;
        let end = (y * w + x1) * 4;
        dst_bytes[start..end].copy_from_slice(&src_bytes[start..end]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/cpu_canvas.rs"]
mod tests;
