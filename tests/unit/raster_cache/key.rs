use super::*;

#[test]
fn exact_distinguishes_subpixel_translation() {
    let a = MatrixKey::new(Affine::translate((10.0, 0.0)), TransformMatch::Exact);
    let b = MatrixKey::new(Affine::translate((10.25, 0.0)), TransformMatch::Exact);
    assert_ne!(a, b);
}

#[test]
fn snap_ignores_translation() {
    let p = TransformMatch::SnapTranslation;
    let a = MatrixKey::new(Affine::translate((10.0, 0.0)), p);
    let b = MatrixKey::new(Affine::translate((37.4, -3.0)), p);
    assert_eq!(a, b);
    let c = MatrixKey::new(Affine::translate((10.0, 0.0)) * Affine::scale(2.0), p);
    assert_ne!(a, c);
}

#[test]
fn negative_zero_matches_zero() {
    let a = MatrixKey::new(Affine::new([1.0, 0.0, -0.0, 1.0, 0.0, 0.0]), TransformMatch::Exact);
    assert_eq!(a, MatrixKey::new(Affine::IDENTITY, TransformMatch::Exact));
}

#[test]
fn snapped_draw_base_rounds_translation() {
    let m = Affine::translate((3.6, -1.2)) * Affine::scale(2.0);
    assert_eq!(
        TransformMatch::SnapTranslation.draw_base(m),
        Affine::translate((4.0, -1.0))
    );
    assert_eq!(
        TransformMatch::SnapTranslation.raster_matrix(m),
        Affine::scale(2.0)
    );
    assert_eq!(TransformMatch::Exact.draw_base(m), Affine::IDENTITY);
    assert_eq!(TransformMatch::Exact.raster_matrix(m), m);
}

#[test]
fn policy_parses_config_spelling() {
    assert_eq!(TransformMatch::parse("exact"), Some(TransformMatch::Exact));
    assert_eq!(
        TransformMatch::parse(" Snap_Translation "),
        Some(TransformMatch::SnapTranslation)
    );
    assert_eq!(TransformMatch::parse("fuzzy"), None);
    assert_eq!(TransformMatch::default(), TransformMatch::SnapTranslation);
}
