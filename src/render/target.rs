use crate::foundation::core::{PixelSize, Rect};
use crate::paint::paint::BlendMode;

/// A destination that draws are submitted into.
pub trait RenderTarget {
    /// Pixel dimensions.
    fn size(&self) -> PixelSize;

    /// Multisample count of the target; `1` means no multisampling.
    fn sample_count(&self) -> u32 {
        1
    }

    /// Target bounds anchored at the origin.
    fn bounds(&self) -> Rect {
        self.size().to_rect()
    }
}

/// Per-pass options handed to content while it renders into a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Multisample count of the pass.
    pub sample_count: u32,
    /// Operator the rendered output will be composited with.
    pub blend_mode: BlendMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_count: 1,
            blend_mode: BlendMode::SrcOver,
        }
    }
}

impl RenderOptions {
    /// Options for plain source-over rendering into `target`.
    pub fn from_target(target: &dyn RenderTarget) -> Self {
        Self {
            sample_count: target.sample_count().max(1),
            ..Self::default()
        }
    }

    /// Options for rendering into `target` with output composited by `blend_mode`.
    pub fn from_target_and_blend(target: &dyn RenderTarget, blend_mode: BlendMode) -> Self {
        Self {
            blend_mode,
            ..Self::from_target(target)
        }
    }
}

/// Offscreen target description used by snapshot passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffscreenTarget {
    /// Pixel dimensions.
    pub size: PixelSize,
    /// Multisample count.
    pub sample_count: u32,
}

impl RenderTarget for OffscreenTarget {
    fn size(&self) -> PixelSize {
        self.size
    }

    fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
