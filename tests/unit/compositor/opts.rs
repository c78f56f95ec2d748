use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_enable_partial_repaint() {
    let o = CompositorOpts::default();
    assert!(o.partial_repaint);
    assert_eq!(o.clear_rgba, [0, 0, 0, 0]);
    assert_eq!(o.raster_cache.transform_match, TransformMatch::SnapTranslation);
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let o = CompositorOpts::from_json_str(
        r#"{ "partial_repaint": false, "raster_cache": { "transform_match": "exact" } }"#,
    )
    .unwrap();
    assert!(!o.partial_repaint);
    assert_eq!(o.raster_cache.transform_match, TransformMatch::Exact);
    assert_eq!(o.raster_cache.access_threshold, 2);
    assert_eq!(o.pool, SurfacePoolOpts::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = CompositorOpts::from_json_str("{ partial_repaint: ").unwrap_err();
    assert!(matches!(err, LaminaError::Serde(_)));
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = CompositorOpts::from_path("/nonexistent/lamina-opts.json").unwrap_err();
    assert!(matches!(err, LaminaError::Validation(_)));
}

#[test]
fn overrides_replace_configured_values() {
    let o = CompositorOpts::default()
        .with_overrides_from(lookup(&[
            (ENV_ACCESS_THRESHOLD, "5"),
            (ENV_TRANSFORM_MATCH, "exact"),
            (ENV_PARTIAL_REPAINT, "off"),
        ]))
        .unwrap();
    assert_eq!(o.raster_cache.access_threshold, 5);
    assert_eq!(o.raster_cache.transform_match, TransformMatch::Exact);
    assert!(!o.partial_repaint);
}

#[test]
fn absent_overrides_keep_values() {
    let base = CompositorOpts::default().with_partial_repaint(false);
    assert_eq!(base.with_overrides_from(lookup(&[])).unwrap(), base);
}

#[test]
fn invalid_overrides_are_rejected() {
    for (key, value) in [
        (ENV_ACCESS_THRESHOLD, "many"),
        (ENV_TRANSFORM_MATCH, "fuzzy"),
        (ENV_PARTIAL_REPAINT, "maybe"),
    ] {
        let err = CompositorOpts::default()
            .with_overrides_from(lookup(&[(key, value)]))
            .unwrap_err();
        assert!(matches!(err, LaminaError::Validation(_)), "{key}={value}");
    }
}

#[test]
fn clear_color_round_trips() {
    let o = CompositorOpts::default().with_clear(Color::rgba8(1, 2, 3, 4));
    assert_eq!(o.clear_color(), Color::rgba8(1, 2, 3, 4));
}
