use crate::foundation::core::{Affine, BezPath, Rect, rect_intersect, rect_is_empty, rects_overlap};
use crate::paint::paint::{BlendMode, Paint};
use crate::paint::texture::Texture;

/// Immediate-mode drawing target.
///
/// Layers paint through this interface; the two implementations are
/// [`DisplayListBuilder`](crate::paint::display_list::DisplayListBuilder), which records, and
/// [`CpuCanvas`](crate::paint::cpu_canvas::CpuCanvas), which rasterizes.
pub trait Canvas {
    /// Push a copy of the current matrix and clip.
    fn save(&mut self);

    /// Like [`Canvas::save`], but draws until the matching restore are composited as one group
    /// with `opacity` and `blend_mode`. `bounds` is a hint in local coordinates.
    fn save_layer(&mut self, bounds: Option<Rect>, opacity: f32, blend_mode: BlendMode);

    /// Pop the innermost save. Restoring the base state is ignored.
    fn restore(&mut self);

    /// Number of saved states, including the base state (starts at 1).
    fn save_count(&self) -> usize;

    /// Restore until [`Canvas::save_count`] equals `count`.
    fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    /// Concatenate `m` onto the current matrix.
    fn transform(&mut self, m: Affine);

    /// Concatenate a translation.
    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate((dx, dy)));
    }

    /// Replace the current matrix.
    fn set_matrix(&mut self, m: Affine);

    /// Current local-to-device matrix.
    fn total_matrix(&self) -> Affine;

    /// Intersect the clip with `rect` (local coordinates).
    fn clip_rect(&mut self, rect: Rect);

    /// Device-space bounds of the current clip, `None` when unclipped.
    fn device_clip_bounds(&self) -> Option<Rect>;

    /// Return `true` when nothing drawn inside `local` could be visible.
    fn quick_reject(&self, local: Rect) -> bool {
        if rect_is_empty(local) {
            return true;
        }
        match self.device_clip_bounds() {
            Some(clip) => !rects_overlap(clip, self.total_matrix().transform_rect_bbox(local)),
            None => false,
        }
    }

    /// Fill `path`.
    fn draw_path(&mut self, path: &BezPath, paint: &Paint);

    /// Fill `rect`.
    fn draw_rect(&mut self, rect: Rect, paint: &Paint);

    /// Draw `texture` with its top-left corner at the local origin.
    fn draw_texture(&mut self, texture: &Texture, opacity: f32, blend_mode: BlendMode);
}

/// Matrix/clip bookkeeping shared by the canvas implementations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CanvasState {
    pub(crate) matrix: Affine,
    pub(crate) clip: Option<Rect>,
    /// Backend layers opened within this save scope.
    pub(crate) layers: u32,
}

#[derive(Debug)]
pub(crate) struct StateStack {
    states: Vec<CanvasState>,
}

impl StateStack {
    pub(crate) fn new(clip: Option<Rect>) -> Self {
        Self {
            states: vec![CanvasState {
                matrix: Affine::IDENTITY,
                clip,
                layers: 0,
            }],
        }
    }

    pub(crate) fn top(&self) -> &CanvasState {
        // The base state is never popped.
        &self.states[self.states.len() - 1]
    }

    pub(crate) fn top_mut(&mut self) -> &mut CanvasState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    pub(crate) fn push(&mut self) {
        let top = *self.top();
        self.states.push(CanvasState { layers: 0, ..top });
    }

    /// Pop the innermost state, returning it; the base state stays.
    pub(crate) fn pop(&mut self) -> Option<CanvasState> {
        if self.states.len() > 1 {
            self.states.pop()
        } else {
            None
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn concat(&mut self, m: Affine) {
        let top = self.top_mut();
        top.matrix *= m;
    }

    pub(crate) fn clip_rect(&mut self, local: Rect) {
        let top = self.top_mut();
        let device = top.matrix.transform_rect_bbox(local);
        top.clip = Some(match top.clip {
            Some(clip) => rect_intersect(clip, device),
            None => device,
        });
    }

    /// Device bounds of `local` under the current matrix, clipped.
    pub(crate) fn device_bounds(&self, local: Rect) -> Rect {
        let top = self.top();
        let device = top.matrix.transform_rect_bbox(local);
        match top.clip {
            Some(clip) => rect_intersect(clip, device),
            None => device,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/canvas.rs"]
mod tests;
