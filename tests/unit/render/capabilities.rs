use super::*;

struct Limited;

impl Capabilities for Limited {
    fn name(&self) -> &str {
        "limited"
    }

    fn supports(&self, feature: Feature) -> bool {
        feature == Feature::TextureSampling
    }
}

#[test]
fn cpu_backend_meets_baseline() {
    require_features(&CpuCapabilities, BASELINE_FEATURES).unwrap();
}

#[test]
fn missing_features_are_listed() {
    let err = require_features(&Limited, BASELINE_FEATURES).unwrap_err();
    assert!(matches!(err, LaminaError::Capability(_)));
    let msg = err.to_string();
    assert!(msg.contains("offscreen_targets"), "{msg}");
    assert!(msg.contains("clip_layers"), "{msg}");
    assert!(!msg.contains("texture_sampling"), "{msg}");
}

#[test]
fn empty_requirement_always_passes() {
    require_features(&Limited, &[]).unwrap();
}
