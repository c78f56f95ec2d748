use super::*;

#[test]
fn state_stack_never_pops_base() {
    let mut s = StateStack::new(None);
    assert_eq!(s.depth(), 1);
    assert!(s.pop().is_none());
    s.push();
    assert_eq!(s.depth(), 2);
    assert!(s.pop().is_some());
    assert_eq!(s.depth(), 1);
}

#[test]
fn clip_is_tracked_in_device_space() {
    let mut s = StateStack::new(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    s.concat(Affine::translate((10.0, 10.0)));
    s.clip_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
    assert_eq!(s.top().clip, Some(Rect::new(10.0, 10.0, 30.0, 30.0)));
    assert_eq!(
        s.device_bounds(Rect::new(5.0, 5.0, 50.0, 50.0)),
        Rect::new(15.0, 15.0, 30.0, 30.0)
    );
}

#[test]
fn push_inherits_matrix_and_clip() {
    let mut s = StateStack::new(None);
    s.concat(Affine::scale(2.0));
    s.push();
    s.concat(Affine::translate((1.0, 0.0)));
    assert_eq!(
        s.top().matrix,
        Affine::scale(2.0) * Affine::translate((1.0, 0.0))
    );
    s.pop();
    assert_eq!(s.top().matrix, Affine::scale(2.0));
}
