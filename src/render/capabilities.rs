use std::fmt;

use crate::foundation::error::{LaminaError, LaminaResult};

/// Device feature the compositing core relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Rendering into offscreen targets that can later be sampled.
    OffscreenTargets,
    /// Sampling textures during draws.
    TextureSampling,
    /// Group opacity layers.
    OpacityLayers,
    /// Non-source-over blend layers.
    BlendLayers,
    /// Rectangular clip layers.
    ClipLayers,
    /// Multisampled render targets.
    Multisampling,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OffscreenTargets => "offscreen_targets",
            Self::TextureSampling => "texture_sampling",
            Self::OpacityLayers => "opacity_layers",
            Self::BlendLayers => "blend_layers",
            Self::ClipLayers => "clip_layers",
            Self::Multisampling => "multisampling",
        };
        f.write_str(name)
    }
}

/// Minimum feature set below which there is no degraded rendering path.
pub const BASELINE_FEATURES: &[Feature] = &[
    Feature::OffscreenTargets,
    Feature::TextureSampling,
    Feature::OpacityLayers,
    Feature::ClipLayers,
];

/// Result of device negotiation, as reported by the backend.
pub trait Capabilities {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Return `true` when `feature` is available.
    fn supports(&self, feature: Feature) -> bool;
}

/// Capabilities of the `vello_cpu` raster backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuCapabilities;

impl Capabilities for CpuCapabilities {
    fn name(&self) -> &str {
        "vello_cpu"
    }

    fn supports(&self, feature: Feature) -> bool {
        !matches!(feature, Feature::Multisampling)
    }
}

/// Fail fast unless every feature in `required` is supported.
pub fn require_features(caps: &dyn Capabilities, required: &[Feature]) -> LaminaResult<()> {
    let missing: Vec<Feature> = required
        .iter()
        .copied()
        .filter(|f| !caps.supports(*f))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let list = missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::error!(backend = caps.name(), missing = %list, "required device features missing");
    Err(LaminaError::capability(format!(
        "backend '{}' is missing required features: {list}",
        caps.name()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/render/capabilities.rs"]
mod tests;
