use std::collections::HashMap;

use smallvec::SmallVec;

use crate::foundation::core::{Rect, rect_union};
use crate::foundation::ids::LayerId;

/// Device-space rects painted by one layer (its whole subtree for containers).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaintRegion {
    rects: SmallVec<[Rect; 4]>,
    bounds: Rect,
    has_readback: bool,
}

impl PaintRegion {
    /// Build a region from rects in paint order.
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        let rects: SmallVec<[Rect; 4]> = rects.into_iter().collect();
        let bounds = rects.iter().fold(Rect::ZERO, |acc, r| rect_union(acc, *r));
        Self {
            rects,
            bounds,
            has_readback: false,
        }
    }

    pub(crate) fn with_readback(mut self, has_readback: bool) -> Self {
        self.has_readback = has_readback;
        self
    }

    /// Rects in paint order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Union of all rects.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Return `true` when nothing was painted.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Return `true` when the subtree reads back the surface it paints onto.
    pub fn has_readback(&self) -> bool {
        self.has_readback
    }

    /// Rects present in exactly one of the two regions.
    pub fn symmetric_difference(&self, other: &Self) -> Vec<Rect> {
        let only_self = self.rects.iter().filter(|r| !other.rects.contains(r));
        let only_other = other.rects.iter().filter(|r| !self.rects.contains(r));
        only_self.chain(only_other).copied().collect()
    }
}

/// Paint regions of one frame, keyed by layer identity.
#[derive(Clone, Debug, Default)]
pub struct PaintRegionMap {
    regions: HashMap<LayerId, PaintRegion>,
}

impl PaintRegionMap {
    /// Region recorded for `layer`.
    pub fn get(&self, layer: LayerId) -> Option<&PaintRegion> {
        self.regions.get(&layer)
    }

    pub(crate) fn insert(&mut self, layer: LayerId, region: PaintRegion) {
        self.regions.insert(layer, region);
    }

    /// Number of recorded layers.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Return `true` when no layer was recorded.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
