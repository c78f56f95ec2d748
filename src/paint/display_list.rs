use std::sync::Arc;

use kurbo::{PathEl, Shape};

use crate::foundation::core::{Affine, BezPath, Rect, rect_union};
use crate::foundation::math::{Fingerprint, StableHasher};
use crate::paint::canvas::{Canvas, StateStack};
use crate::paint::paint::{BlendMode, Paint};
use crate::paint::texture::Texture;

/// A single recorded canvas call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::save_layer`].
    SaveLayer {
        /// Bounds hint.
        bounds: Option<Rect>,
        /// Group opacity.
        opacity: f32,
        /// Group blend mode.
        blend_mode: BlendMode,
    },
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::transform`].
    Transform(Affine),
    /// [`Canvas::set_matrix`], relative to the matrix at recording start.
    SetMatrix(Affine),
    /// [`Canvas::clip_rect`].
    ClipRect(Rect),
    /// [`Canvas::draw_path`].
    DrawPath {
        /// Path geometry.
        path: BezPath,
        /// Fill style.
        paint: Paint,
    },
    /// [`Canvas::draw_rect`].
    DrawRect {
        /// Rect geometry.
        rect: Rect,
        /// Fill style.
        paint: Paint,
    },
    /// [`Canvas::draw_texture`].
    DrawTexture {
        /// Source texture.
        texture: Texture,
        /// Draw opacity.
        opacity: f32,
        /// Compositing operator.
        blend_mode: BlendMode,
    },
}

impl DrawOp {
    /// Return `true` for ops that put pixels on the target.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawPath { .. } | Self::DrawRect { .. } | Self::DrawTexture { .. }
        )
    }
}

/// Immutable recorded sequence of canvas calls with precomputed bounds.
#[derive(Clone, Debug)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    bounds: Rect,
    fingerprint: Fingerprint,
}

/// Shared handle to a display list, as held by leaf layers.
pub type Picture = Arc<DisplayList>;

impl DisplayList {
    /// Recorded ops in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Tight bounds of everything drawn, in recording space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of ops that put pixels on the target; a proxy for raster cost.
    pub fn complexity(&self) -> usize {
        self.ops.iter().filter(|op| op.is_draw()).count()
    }

    /// Return `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Replay the recording onto `canvas` under its current matrix and clip.
    pub fn play_back(&self, canvas: &mut dyn Canvas) {
        let base = canvas.total_matrix();
        let save_count = canvas.save_count();
        for op in &self.ops {
            match op {
                DrawOp::Save => canvas.save(),
                DrawOp::SaveLayer {
                    bounds,
                    opacity,
                    blend_mode,
                } => canvas.save_layer(*bounds, *opacity, *blend_mode),
                DrawOp::Restore => {
                    if canvas.save_count() > save_count {
                        canvas.restore();
                    }
                }
                DrawOp::Transform(m) => canvas.transform(*m),
                DrawOp::SetMatrix(m) => canvas.set_matrix(base * *m),
                DrawOp::ClipRect(r) => canvas.clip_rect(*r),
                DrawOp::DrawPath { path, paint } => canvas.draw_path(path, paint),
                DrawOp::DrawRect { rect, paint } => canvas.draw_rect(*rect, paint),
                DrawOp::DrawTexture {
                    texture,
                    opacity,
                    blend_mode,
                } => canvas.draw_texture(texture, *opacity, *blend_mode),
            }
        }
        canvas.restore_to_count(save_count);
    }

    /// Replay with every top-level draw faded by `opacity`.
    ///
    /// Correct only for lists whose draws do not overlap; group layers are faded as a whole
    /// and their contents are left alone.
    pub fn play_back_with_opacity(&self, canvas: &mut dyn Canvas, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity >= 1.0 {
            self.play_back(canvas);
            return;
        }
        let base = canvas.total_matrix();
        let save_count = canvas.save_count();
        // Saves opened since the outermost open group layer, if any.
        let mut group_depth: Option<usize> = None;
        for op in &self.ops {
            let fade = if group_depth.is_some() { 1.0 } else { opacity };
            match op {
                DrawOp::Save => {
                    canvas.save();
                    if let Some(d) = group_depth.as_mut() {
                        *d += 1;
                    }
                }
                DrawOp::SaveLayer {
                    bounds,
                    opacity: layer_opacity,
                    blend_mode,
                } => {
                    canvas.save_layer(*bounds, *layer_opacity * fade, *blend_mode);
                    group_depth = Some(group_depth.map_or(0, |d| d + 1));
                }
                DrawOp::Restore => {
                    if canvas.save_count() > save_count {
                        canvas.restore();
                    }
                    group_depth = match group_depth {
                        Some(0) | None => None,
                        Some(d) => Some(d - 1),
                    };
                }
                DrawOp::Transform(m) => canvas.transform(*m),
                DrawOp::SetMatrix(m) => canvas.set_matrix(base * *m),
                DrawOp::ClipRect(r) => canvas.clip_rect(*r),
                DrawOp::DrawPath { path, paint } => {
                    canvas.draw_path(path, &paint.with_opacity(fade));
                }
                DrawOp::DrawRect { rect, paint } => {
                    canvas.draw_rect(*rect, &paint.with_opacity(fade));
                }
                DrawOp::DrawTexture {
                    texture,
                    opacity: tex_opacity,
                    blend_mode,
                } => canvas.draw_texture(texture, *tex_opacity * fade, *blend_mode),
            }
        }
        canvas.restore_to_count(save_count);
    }

    /// Return `true` when `other` is known to draw the same thing.
    ///
    /// Lists longer than `max_ops` are not compared op-by-op; they only match when they are the
    /// same allocation, otherwise the answer is the conservative `false`.
    pub fn content_equals(a: &Picture, b: &Picture, max_ops: usize) -> bool {
        if Arc::ptr_eq(a, b) {
            return true;
        }
        if a.ops.len() != b.ops.len() || a.fingerprint != b.fingerprint {
            return false;
        }
        if a.ops.len() > max_ops {
            return false;
        }
        a.ops == b.ops
    }
}

/// Recording [`Canvas`].
#[derive(Debug)]
pub struct DisplayListBuilder {
    ops: Vec<DrawOp>,
    state: StateStack,
    bounds: Rect,
}

impl Default for DisplayListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListBuilder {
    /// Start an empty, unclipped recording.
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            state: StateStack::new(None),
            bounds: Rect::ZERO,
        }
    }

    /// Start a recording whose draws are clipped to `cull` (recording space).
    pub fn with_cull(cull: Rect) -> Self {
        Self {
            ops: Vec::new(),
            state: StateStack::new(Some(cull)),
            bounds: Rect::ZERO,
        }
    }

    /// Ops recorded so far.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Finish recording.
    pub fn build(self) -> DisplayList {
        let fingerprint = fingerprint_ops(&self.ops);
        DisplayList {
            ops: self.ops,
            bounds: self.bounds,
            fingerprint,
        }
    }

    /// Finish recording into a shareable [`Picture`].
    pub fn build_picture(self) -> Picture {
        Arc::new(self.build())
    }

    fn accumulate(&mut self, local: Rect) {
        let device = self.state.device_bounds(local);
        self.bounds = rect_union(self.bounds, device);
    }
}

impl Canvas for DisplayListBuilder {
    fn save(&mut self) {
        self.state.push();
        self.ops.push(DrawOp::Save);
    }

    fn save_layer(&mut self, bounds: Option<Rect>, opacity: f32, blend_mode: BlendMode) {
        self.state.push();
        self.ops.push(DrawOp::SaveLayer {
            bounds,
            opacity,
            blend_mode,
        });
    }

    fn restore(&mut self) {
        if self.state.pop().is_some() {
            self.ops.push(DrawOp::Restore);
        }
    }

    fn save_count(&self) -> usize {
        self.state.depth()
    }

    fn transform(&mut self, m: Affine) {
        self.state.concat(m);
        self.ops.push(DrawOp::Transform(m));
    }

    fn set_matrix(&mut self, m: Affine) {
        self.state.top_mut().matrix = m;
        self.ops.push(DrawOp::SetMatrix(m));
    }

    fn total_matrix(&self) -> Affine {
        self.state.top().matrix
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip_rect(rect);
        self.ops.push(DrawOp::ClipRect(rect));
    }

    fn device_clip_bounds(&self) -> Option<Rect> {
        self.state.top().clip
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) {
        self.accumulate(path.bounding_box());
        self.ops.push(DrawOp::DrawPath {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.accumulate(rect.abs());
        self.ops.push(DrawOp::DrawRect {
            rect,
            paint: *paint,
        });
    }

    fn draw_texture(&mut self, texture: &Texture, opacity: f32, blend_mode: BlendMode) {
        self.accumulate(texture.size().to_rect());
        self.ops.push(DrawOp::DrawTexture {
            texture: texture.clone(),
            opacity,
            blend_mode,
        });
    }
}

fn fingerprint_ops(ops: &[DrawOp]) -> Fingerprint {
    let mut h = StableHasher::new();
    h.write_u32(ops.len() as u32);
    for op in ops {
        match op {
            DrawOp::Save => h.write_u8(0),
            DrawOp::SaveLayer {
                bounds,
                opacity,
                blend_mode,
            } => {
                h.write_u8(1);
                match bounds {
                    Some(r) => {
                        h.write_u8(1);
                        write_rect(&mut h, *r);
                    }
                    None => h.write_u8(0),
                }
                h.write_f32(*opacity);
                h.write_u8(blend_mode.tag());
            }
            DrawOp::Restore => h.write_u8(2),
            DrawOp::Transform(m) => {
                h.write_u8(3);
                write_affine(&mut h, *m);
            }
            DrawOp::SetMatrix(m) => {
                h.write_u8(4);
                write_affine(&mut h, *m);
            }
            DrawOp::ClipRect(r) => {
                h.write_u8(5);
                write_rect(&mut h, *r);
            }
            DrawOp::DrawPath { path, paint } => {
                h.write_u8(6);
                write_path(&mut h, path);
                write_paint(&mut h, paint);
            }
            DrawOp::DrawRect { rect, paint } => {
                h.write_u8(7);
                write_rect(&mut h, *rect);
                write_paint(&mut h, paint);
            }
            DrawOp::DrawTexture {
                texture,
                opacity,
                blend_mode,
            } => {
                h.write_u8(8);
                let size = texture.size();
                h.write_u32(size.width);
                h.write_u32(size.height);
                h.write_f32(*opacity);
                h.write_u8(blend_mode.tag());
            }
        }
    }
    h.finish()
}

fn write_rect(h: &mut StableHasher, r: Rect) {
    h.write_f64(r.x0);
    h.write_f64(r.y0);
    h.write_f64(r.x1);
    h.write_f64(r.y1);
}

fn write_affine(h: &mut StableHasher, m: Affine) {
    for c in m.as_coeffs() {
        h.write_f64(c);
    }
}

fn write_paint(h: &mut StableHasher, p: &Paint) {
    h.write_bytes(&[p.color.r, p.color.g, p.color.b, p.color.a]);
    h.write_u8(p.blend_mode.tag());
}

fn write_path(h: &mut StableHasher, path: &BezPath) {
    fn point(h: &mut StableHasher, p: kurbo::Point) {
        h.write_f64(p.x);
        h.write_f64(p.y);
    }
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                h.write_u8(0);
                point(h, p);
            }
            PathEl::LineTo(p) => {
                h.write_u8(1);
                point(h, p);
            }
            PathEl::QuadTo(p1, p2) => {
                h.write_u8(2);
                point(h, p1);
                point(h, p2);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                h.write_u8(3);
                point(h, p1);
                point(h, p2);
                point(h, p3);
            }
            PathEl::ClosePath => h.write_u8(4),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/display_list.rs"]
mod tests;
