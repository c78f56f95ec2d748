use super::*;
use crate::layer::mutators::Mutator;
use crate::paint::display_list::DisplayListBuilder;

#[test]
fn scope_restores_ambient_state() {
    let mut ctx = PrerollContext::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    {
        let mut scope = ctx.scope();
        scope.has_platform_view = true;
        scope.has_texture_layer = true;
        scope.mutators.push(Mutator::Opacity(0.5));
        scope.clip_cull_rect(Affine::IDENTITY, Rect::new(0.0, 0.0, 10.0, 10.0));
        scope.surface_needs_readback = true;
        assert_eq!(scope.cull_rect, Rect::new(0.0, 0.0, 10.0, 10.0));
    }
    assert!(!ctx.has_platform_view);
    assert!(!ctx.has_texture_layer);
    assert!(ctx.mutators.is_empty());
    assert_eq!(ctx.cull_rect, Rect::new(0.0, 0.0, 100.0, 100.0));
    // Upward outputs survive the scope.
    assert!(ctx.surface_needs_readback);
}

#[test]
fn nested_scopes_restore_in_order() {
    let mut ctx = PrerollContext::new(Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut outer = ctx.scope();
    outer.has_platform_view = true;
    {
        let mut inner = outer.scope();
        inner.has_platform_view = false;
        inner.mutators.push(Mutator::Transform(Affine::scale(2.0)));
    }
    assert!(outer.has_platform_view);
    assert!(outer.mutators.is_empty());
    drop(outer);
    assert!(!ctx.has_platform_view);
}

#[test]
fn local_cull_rect_inverts_matrix() {
    let ctx = PrerollContext::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(
        ctx.local_cull_rect(Affine::scale(2.0)),
        Some(Rect::new(0.0, 0.0, 50.0, 50.0))
    );
    assert_eq!(ctx.local_cull_rect(Affine::scale(0.0)), None);
}

#[test]
fn mutators_accumulate_transform_and_opacity() {
    let mut m = MutatorsStack::default();
    m.push(Mutator::Transform(Affine::translate((1.0, 0.0))));
    m.push(Mutator::Opacity(0.5));
    m.push(Mutator::ClipRect(Rect::new(0.0, 0.0, 1.0, 1.0)));
    m.push(Mutator::Opacity(0.5));
    m.push(Mutator::Transform(Affine::scale(2.0)));
    assert_eq!(
        m.total_transform(),
        Affine::translate((1.0, 0.0)) * Affine::scale(2.0)
    );
    assert_eq!(m.total_opacity(), 0.25);
    assert_eq!(m.top(), Some(&Mutator::Transform(Affine::scale(2.0))));
    assert_eq!(m.iter().count(), 5);
}

#[test]
fn inherited_opacity_is_restored_after_closure() {
    let mut rec = DisplayListBuilder::new();
    let mut ctx = PaintContext::new(&mut rec);
    let seen = ctx.with_inherited_opacity(0.3, |c| c.inherited_opacity);
    assert_eq!(seen, 0.3);
    assert_eq!(ctx.inherited_opacity, 1.0);
}
