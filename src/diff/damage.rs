use crate::foundation::core::{Rect, rect_intersect, rect_is_empty, rect_union, rects_overlap};

/// Damage alignment and clipping knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiffOpts {
    /// Damage rects are expanded outward to multiples of this many pixels. `0` and `1` keep
    /// whole-pixel rounding only.
    pub damage_alignment: u32,
    /// Maximum display-list length compared op by op when matching leaves; longer lists only
    /// match when they are the same shared picture.
    pub max_compared_ops: usize,
}

impl Default for DiffOpts {
    fn default() -> Self {
        Self {
            damage_alignment: 1,
            max_compared_ops: 256,
        }
    }
}

impl DiffOpts {
    /// Set the damage alignment grid.
    pub fn with_damage_alignment(mut self, px: u32) -> Self {
        self.damage_alignment = px;
        self
    }

    /// Set the op-by-op comparison bound.
    pub fn with_max_compared_ops(mut self, n: usize) -> Self {
        self.max_compared_ops = n;
        self
    }
}

/// Area that must be repainted this frame, in device space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    rects: Vec<Rect>,
    frame_damage: Rect,
}

impl Damage {
    pub(crate) fn new(rects: Vec<Rect>) -> Self {
        let rects: Vec<Rect> = rects.into_iter().filter(|r| !rect_is_empty(*r)).collect();
        let frame_damage = rects.iter().fold(Rect::ZERO, |acc, r| rect_union(acc, *r));
        Self {
            rects,
            frame_damage,
        }
    }

    /// Damage covering all of `bounds`.
    pub fn full(bounds: Rect) -> Self {
        Self::new(vec![bounds])
    }

    /// Individual damage rects.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Union of all damage.
    pub fn frame_damage(&self) -> Rect {
        self.frame_damage
    }

    /// Return `true` when nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Return `true` when `rect` touches any damage rect.
    pub fn intersects(&self, rect: Rect) -> bool {
        self.rects.iter().any(|d| rects_overlap(*d, rect))
    }

    /// Damage restricted to `bounds`.
    pub fn clipped_to(&self, bounds: Rect) -> Self {
        Self::new(
            self.rects
                .iter()
                .map(|r| rect_intersect(*r, bounds))
                .collect(),
        )
    }
}

/// Round `r` outward to the `alignment` pixel grid.
pub(crate) fn align_rect(r: Rect, alignment: u32) -> Rect {
    let r = r.expand();
    if alignment <= 1 {
        return r;
    }
    let a = f64::from(alignment);
    Rect::new(
        (r.x0 / a).floor() * a,
        (r.y0 / a).floor() * a,
        (r.x1 / a).ceil() * a,
        (r.y1 / a).ceil() * a,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/diff/damage.rs"]
mod tests;
