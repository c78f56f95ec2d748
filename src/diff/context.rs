use std::ops::{Deref, DerefMut};

use crate::diff::damage::{Damage, DiffOpts, align_rect};
use crate::diff::region::{PaintRegion, PaintRegionMap};
use crate::foundation::core::{Affine, Rect, rect_intersect, rect_is_empty, rects_overlap};
use crate::foundation::ids::LayerId;

#[derive(Clone, Copy, Debug)]
struct DiffState {
    transform: Affine,
    clip: Option<Rect>,
    dirty: bool,
    rect_index: usize,
    readback_index: usize,
}

/// Output of a diff traversal.
#[derive(Clone, Debug, Default)]
pub struct DiffResult {
    /// Area to repaint this frame.
    pub damage: Damage,
    /// Regions painted this frame; next frame's history.
    pub regions: PaintRegionMap,
}

/// Per-frame traversal state for comparing a layer tree against the previous frame's.
///
/// Region accumulation is scoped with [`DiffContext::subtree`]; every scope restores the cursor,
/// transform, clip and dirty flag when it ends.
#[derive(Debug)]
pub struct DiffContext<'h> {
    previous: &'h PaintRegionMap,
    current: PaintRegionMap,
    opts: DiffOpts,
    state: DiffState,
    saved: Vec<DiffState>,
    rects: Vec<Rect>,
    readbacks: Vec<Rect>,
    damage: Vec<Rect>,
}

impl<'h> DiffContext<'h> {
    /// Start a traversal against `previous` (last frame's regions).
    pub fn new(previous: &'h PaintRegionMap, opts: DiffOpts) -> Self {
        Self {
            previous,
            current: PaintRegionMap::default(),
            opts,
            state: DiffState {
                transform: Affine::IDENTITY,
                clip: None,
                dirty: false,
                rect_index: 0,
                readback_index: 0,
            },
            saved: Vec::new(),
            rects: Vec::new(),
            readbacks: Vec::new(),
            damage: Vec::new(),
        }
    }

    /// Options in effect.
    pub fn opts(&self) -> DiffOpts {
        self.opts
    }

    /// Open a checkpoint; region accumulated inside stays visible to the parent, everything
    /// else is rolled back when the returned scope drops.
    pub fn subtree(&mut self) -> SubtreeScope<'_, 'h> {
        self.saved.push(self.state);
        self.state.rect_index = self.rects.len();
        self.state.readback_index = self.readbacks.len();
        SubtreeScope { ctx: self }
    }

    /// Open checkpoints.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Current local-to-device transform.
    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    /// Concatenate `m` for the rest of the current scope.
    pub fn push_transform(&mut self, m: Affine) {
        self.state.transform *= m;
    }

    /// Intersect the clip with `local` for the rest of the current scope.
    pub fn push_clip_rect(&mut self, local: Rect) {
        let device = self.state.transform.transform_rect_bbox(local);
        self.state.clip = Some(match self.state.clip {
            Some(clip) => rect_intersect(clip, device),
            None => device,
        });
    }

    /// Return `true` when everything painted in the current scope is damage.
    pub fn is_subtree_dirty(&self) -> bool {
        self.state.dirty
    }

    /// Treat everything painted in the current scope as damage, plus `old` when given.
    pub fn mark_subtree_dirty(&mut self, old: Option<&PaintRegion>) {
        self.state.dirty = true;
        if let Some(old) = old {
            self.add_damage(old);
        }
    }

    /// Region painted by `layer` in the previous frame.
    pub fn old_region(&self, layer: LayerId) -> Option<&'h PaintRegion> {
        self.previous.get(layer)
    }

    /// Add `local` (transformed and clipped) to the region of the current scope.
    pub fn add_layer_bounds(&mut self, local: Rect) {
        let mut device = self.state.transform.transform_rect_bbox(local);
        if let Some(clip) = self.state.clip {
            device = rect_intersect(device, clip);
        }
        if rect_is_empty(device) {
            return;
        }
        self.rects.push(device);
        if self.state.dirty {
            self.damage.push(device);
        }
    }

    /// Declare that the content at `local` reads back the pixels beneath it; damage touching
    /// it grows to cover all of it.
    pub fn add_readback_region(&mut self, local: Rect) {
        let mut device = self.state.transform.transform_rect_bbox(local);
        if let Some(clip) = self.state.clip {
            device = rect_intersect(device, clip);
        }
        if !rect_is_empty(device) {
            self.readbacks.push(device);
        }
    }

    /// Declare that everything painted so far in the current scope is composited by reading
    /// back the pixels beneath it.
    pub fn mark_subtree_readback(&mut self) {
        let bounds = self.current_subtree_region().bounds();
        if !rect_is_empty(bounds) {
            self.readbacks.push(bounds);
        }
    }

    /// Region accumulated since the innermost checkpoint.
    pub fn current_subtree_region(&self) -> PaintRegion {
        PaintRegion::from_rects(self.rects[self.state.rect_index..].iter().copied())
            .with_readback(self.readbacks.len() > self.state.readback_index)
    }

    /// Record `region` as what `layer` painted this frame.
    pub fn set_layer_paint_region(&mut self, layer: LayerId, region: PaintRegion) {
        self.current.insert(layer, region);
    }

    /// Damage the difference between `region` and what `old_layer` painted last frame.
    ///
    /// Without a previous entry the whole region is damage. In a dirty scope the region was
    /// already damaged as it accumulated.
    pub fn compare_with_previous(&mut self, old_layer: LayerId, region: &PaintRegion) {
        if self.state.dirty {
            return;
        }
        match self.previous.get(old_layer) {
            Some(prev) => {
                let changed = region.symmetric_difference(prev);
                if !changed.is_empty() {
                    tracing::trace!(?old_layer, rects = changed.len(), "paint region changed");
                }
                self.damage.extend(changed);
            }
            None => self.damage.extend_from_slice(region.rects()),
        }
    }

    /// Add explicit damage, e.g. the old region of a removed layer.
    pub fn add_damage(&mut self, region: &PaintRegion) {
        self.damage.extend_from_slice(region.rects());
    }

    /// Add one device-space damage rect.
    pub fn add_damage_rect(&mut self, rect: Rect) {
        if !rect_is_empty(rect) {
            self.damage.push(rect);
        }
    }

    /// End the traversal.
    pub fn finish(self) -> DiffResult {
        debug_assert!(
            self.saved.is_empty(),
            "unbalanced diff checkpoints: {} still open",
            self.saved.len()
        );
        let mut damage = self.damage;

        // Readback regions depend on everything beneath them; grow until stable.
        let mut pending: Vec<Rect> = self.readbacks;
        loop {
            let (hit, rest): (Vec<Rect>, Vec<Rect>) = pending
                .into_iter()
                .partition(|rb| damage.iter().any(|d| rects_overlap(*d, *rb)));
            if hit.is_empty() {
                break;
            }
            damage.extend(hit);
            pending = rest;
        }

        let alignment = self.opts.damage_alignment;
        let rects = damage.into_iter().map(|r| align_rect(r, alignment)).collect();
        DiffResult {
            damage: Damage::new(rects),
            regions: self.current,
        }
    }
}

/// Checkpoint guard returned by [`DiffContext::subtree`].
pub struct SubtreeScope<'c, 'h> {
    ctx: &'c mut DiffContext<'h>,
}

impl<'h> Deref for SubtreeScope<'_, 'h> {
    type Target = DiffContext<'h>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for SubtreeScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for SubtreeScope<'_, '_> {
    fn drop(&mut self) {
        if let Some(state) = self.ctx.saved.pop() {
            self.ctx.state = state;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/diff/context.rs"]
mod tests;
