use crate::foundation::core::Color;

/// Compositing operator applied when a draw lands on its destination.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source over destination.
    #[default]
    SrcOver,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Difference.
    Difference,
}

impl BlendMode {
    /// Return `true` when the result depends on destination pixels beyond plain source-over.
    pub fn reads_destination(self) -> bool {
        self != Self::SrcOver
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::BlendMode {
        use vello_cpu::peniko::{BlendMode as CpuBlend, Compose, Mix};

        let mix = match self {
            Self::SrcOver => return CpuBlend::default(),
            Self::Multiply => Mix::Multiply,
            Self::Screen => Mix::Screen,
            Self::Overlay => Mix::Overlay,
            Self::Darken => Mix::Darken,
            Self::Lighten => Mix::Lighten,
            Self::Difference => Mix::Difference,
        };
        CpuBlend::new(mix, Compose::SrcOver)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::SrcOver => 0,
            Self::Multiply => 1,
            Self::Screen => 2,
            Self::Overlay => 3,
            Self::Darken => 4,
            Self::Lighten => 5,
            Self::Difference => 6,
        }
    }
}

/// Fill style for path and rect draws.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Paint {
    /// Fill color (straight alpha).
    pub color: Color,
    /// Compositing operator.
    #[serde(default)]
    pub blend_mode: BlendMode,
}

impl Paint {
    /// Source-over fill with `color`.
    pub const fn fill(color: Color) -> Self {
        Self {
            color,
            blend_mode: BlendMode::SrcOver,
        }
    }

    /// Same paint with a different blend mode.
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Same paint with its alpha scaled by `opacity`.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.color = self.color.with_alpha_scaled(opacity);
        self
    }
}
