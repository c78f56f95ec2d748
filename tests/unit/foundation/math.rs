use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 128), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}

#[test]
fn scale_premul_halves_channels() {
    let mut px = vec![255u8, 0, 0, 255, 0, 0, 0, 0];
    scale_premul_in_place(&mut px, 0.5);
    assert_eq!(px, vec![128, 0, 0, 128, 0, 0, 0, 0]);
}

#[test]
fn max_channel_delta_reports_largest_gap() {
    assert_eq!(max_channel_delta(&[1, 2, 3], &[1, 5, 2]), Some(3));
    assert_eq!(max_channel_delta(&[], &[]), Some(0));
    assert_eq!(max_channel_delta(&[1], &[1, 2]), None);
}

#[test]
fn stable_hasher_is_order_sensitive() {
    let mut a = StableHasher::new();
    a.write_u32(1);
    a.write_u32(2);
    let mut b = StableHasher::new();
    b.write_u32(2);
    b.write_u32(1);
    assert_ne!(a.finish(), b.finish());

    let mut c = StableHasher::new();
    c.write_f64(0.5);
    let mut d = StableHasher::new();
    d.write_f64(0.5);
    assert_eq!(c.finish(), d.finish());
}
