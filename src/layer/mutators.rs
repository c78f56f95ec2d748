use crate::foundation::core::{Affine, Rect};

/// One ancestor operation active during a traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mutator {
    /// Rectangular clip in the local space of the mutator.
    ClipRect(Rect),
    /// Transform concatenated onto the parent's.
    Transform(Affine),
    /// Group opacity.
    Opacity(f32),
}

/// Ordered ancestor mutators, outermost first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutatorsStack {
    stack: Vec<Mutator>,
}

impl MutatorsStack {
    /// Push `m` as the innermost mutator.
    pub fn push(&mut self, m: Mutator) {
        self.stack.push(m);
    }

    /// Pop the innermost mutator.
    pub fn pop(&mut self) -> Option<Mutator> {
        self.stack.pop()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.stack.truncate(len);
    }

    /// Innermost mutator.
    pub fn top(&self) -> Option<&Mutator> {
        self.stack.last()
    }

    /// Mutators outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Mutator> {
        self.stack.iter()
    }

    /// Number of mutators.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Return `true` when no ancestor mutates.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Product of all transforms.
    pub fn total_transform(&self) -> Affine {
        self.stack.iter().fold(Affine::IDENTITY, |acc, m| match m {
            Mutator::Transform(t) => acc * *t,
            _ => acc,
        })
    }

    /// Product of all opacities.
    pub fn total_opacity(&self) -> f32 {
        self.stack.iter().fold(1.0, |acc, m| match m {
            Mutator::Opacity(a) => acc * a,
            _ => acc,
        })
    }
}
