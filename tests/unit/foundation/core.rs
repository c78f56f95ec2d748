use super::*;

#[test]
fn pixel_size_ceil_rounds_up_and_clamps_negative() {
    assert_eq!(
        PixelSize::ceil(Size::new(30.0, 40.0)),
        PixelSize::new(30, 40)
    );
    assert_eq!(
        PixelSize::ceil(Size::new(30.2, 39.01)),
        PixelSize::new(31, 40)
    );
    assert_eq!(PixelSize::ceil(Size::new(-1.0, 5.0)), PixelSize::new(0, 5));
    assert!(PixelSize::ceil(Size::new(f64::NAN, 5.0)).is_empty());
}

#[test]
fn pixel_size_rejects_dimensions_above_u16() {
    assert!(PixelSize::new(70_000, 1).to_u16().is_err());
    assert_eq!(PixelSize::new(12, 7).to_u16().unwrap(), (12, 7));
}

#[test]
fn color_from_hex_parses_optional_alpha() {
    assert_eq!(
        Color::from_hex("#ff3366").unwrap(),
        Color::rgba8(0xff, 0x33, 0x66, 0xff)
    );
    assert_eq!(
        Color::from_hex("#01020380").unwrap(),
        Color::rgba8(1, 2, 3, 0x80)
    );
    assert!(Color::from_hex("ff3366").is_err());
    assert!(Color::from_hex("#ff33").is_err());
    assert!(Color::from_hex("#gg3366").is_err());
}

#[test]
fn color_alpha_scaling_rounds() {
    assert_eq!(Color::RED.with_alpha_scaled(0.5).a, 128);
    assert_eq!(Color::RED.with_alpha_scaled(0.0).a, 0);
    assert_eq!(Color::RED.with_alpha_scaled(2.0).a, 255);
}

#[test]
fn premul_from_straight_matches_expected_rounding() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
}

#[test]
fn rect_helpers_treat_empty_as_identity() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(rect_union(Rect::ZERO, a), a);
    assert_eq!(rect_union(a, Rect::ZERO), a);
    assert!(rect_is_empty(rect_intersect(a, Rect::new(20.0, 20.0, 30.0, 30.0))));
    assert!(!rects_overlap(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
    assert!(rects_overlap(a, Rect::new(9.0, 9.0, 20.0, 20.0)));
}

#[test]
fn snap_translation_only_touches_translation() {
    let m = Affine::new([2.0, 0.0, 0.0, 2.0, 10.4, 3.6]);
    assert_eq!(
        snap_translation(m).as_coeffs(),
        [2.0, 0.0, 0.0, 2.0, 10.0, 4.0]
    );
}
