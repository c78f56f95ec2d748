use kurbo::Shape;

use super::*;
use crate::diff::context::DiffResult;
use crate::diff::damage::DiffOpts;
use crate::diff::region::PaintRegionMap;
use crate::foundation::core::{Color, FrameIndex};
use crate::layer::leaf::LeafOpts;
use crate::paint::canvas::Canvas;
use crate::paint::display_list::{DisplayListBuilder, DrawOp};
use crate::paint::paint::{BlendMode, Paint};
use crate::raster_cache::cache::RasterCache;
use crate::raster_cache::opts::RasterCacheOpts;
use crate::snapshot::snapshotter::ContentSnapshotter;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

fn leaf(r: Rect, color: Color) -> LeafLayer {
    LeafLayer::from_path(&r.to_path(0.1), Paint::fill(color))
}

fn compatible(l: LeafLayer) -> LeafLayer {
    l.with_opts(LeafOpts {
        opacity_compatible: true,
        ..LeafOpts::default()
    })
}

fn preroll(layer: &mut Layer) -> bool {
    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 100.0, 100.0));
    layer.preroll(&mut ctx, Affine::IDENTITY);
    ctx.subtree_can_inherit_opacity
}

fn record(layer: &Layer) -> Vec<DrawOp> {
    let mut rec = DisplayListBuilder::new();
    let mut ctx = PaintContext::new(&mut rec);
    layer.paint(&mut ctx);
    rec.ops().to_vec()
}

fn diff(new: &Layer, old: Option<&Layer>, history: &PaintRegionMap) -> DiffResult {
    let mut cx = DiffContext::new(history, DiffOpts::default());
    new.diff(&mut cx, old);
    assert_eq!(cx.depth(), 0);
    cx.finish()
}

fn leaf_of(tree: &Layer, id: LayerId) -> &LeafLayer {
    match tree.find(id) {
        Some(Layer::Leaf(l)) => l,
        other => panic!("expected leaf, got {other:?}"),
    }
}

#[test]
fn preroll_computes_bounds_through_containers() {
    let mut tree: Layer = ContainerLayer::group()
        .with_child(
            ContainerLayer::transform(Affine::translate((10.0, 5.0)))
                .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)),
        )
        .with_child(
            ContainerLayer::clip_rect(rect(50.0, 50.0, 55.0, 55.0))
                .with_child(leaf(rect(40.0, 40.0, 60.0, 60.0), Color::BLUE)),
        )
        .into();
    preroll(&mut tree);
    assert_eq!(tree.paint_bounds(), rect(10.0, 5.0, 55.0, 55.0));
    let Layer::Container(root) = &tree else {
        panic!("root is a container")
    };
    assert_eq!(root.children()[0].paint_bounds(), rect(10.0, 5.0, 20.0, 15.0));
    assert_eq!(root.children()[1].paint_bounds(), rect(50.0, 50.0, 55.0, 55.0));
}

#[test]
fn children_know_their_parent() {
    let child = leaf(rect(0.0, 0.0, 1.0, 1.0), Color::RED);
    let child_id = child.id();
    let group = ContainerLayer::group().with_child(child);
    let group_id = group.id();
    let tree: Layer = CacheableLayer::new(group).into();
    assert_eq!(tree.find(child_id).and_then(Layer::parent), Some(group_id));
    assert_eq!(tree.find(group_id).and_then(Layer::parent), Some(tree.id()));
    assert_eq!(tree.parent(), None);
}

#[test]
fn platform_view_flag_is_scoped_to_its_subtree() {
    let inside = leaf(rect(0.0, 0.0, 1.0, 1.0), Color::RED);
    let after = leaf(rect(2.0, 0.0, 3.0, 1.0), Color::RED);
    let (inside_id, after_id) = (inside.id(), after.id());
    let mut tree: Layer = ContainerLayer::group()
        .with_child(ContainerLayer::platform_view().with_child(inside))
        .with_child(after)
        .into();

    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 10.0, 10.0));
    tree.preroll(&mut ctx, Affine::IDENTITY);
    assert!(!ctx.has_platform_view);
    assert!(leaf_of(&tree, inside_id).parent_has_platform_view());
    assert!(!leaf_of(&tree, after_id).parent_has_platform_view());
}

#[test]
fn leaf_platform_view_flag_does_not_leak_to_siblings() {
    let pv = leaf(rect(0.0, 0.0, 1.0, 1.0), Color::RED).with_opts(LeafOpts {
        has_platform_view: true,
        ..LeafOpts::default()
    });
    let sibling = leaf(rect(2.0, 0.0, 3.0, 1.0), Color::RED);
    let sibling_id = sibling.id();
    let mut tree: Layer = ContainerLayer::group()
        .with_child(pv)
        .with_child(sibling)
        .into();
    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 10.0, 10.0));
    tree.preroll(&mut ctx, Affine::IDENTITY);
    assert!(!ctx.has_platform_view);
    assert!(!leaf_of(&tree, sibling_id).parent_has_platform_view());
    assert!(tree.contains_platform_view());
}

#[test]
fn readback_is_reported_upward() {
    let mut tree: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 1.0, 1.0), Color::RED).with_opts(LeafOpts {
            reads_surface: true,
            ..LeafOpts::default()
        }))
        .into();
    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 10.0, 10.0));
    tree.preroll(&mut ctx, Affine::IDENTITY);
    assert!(ctx.surface_needs_readback);
}

#[test]
fn opacity_is_pushed_down_to_compatible_disjoint_leaves() {
    let mut tree: Layer = ContainerLayer::opacity(0.5)
        .with_child(compatible(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)))
        .with_child(compatible(leaf(rect(20.0, 0.0, 30.0, 10.0), Color::BLUE)))
        .into();
    assert!(preroll(&mut tree));
    let ops = record(&tree);
    assert!(!ops.iter().any(|op| matches!(op, DrawOp::SaveLayer { .. })));
    let faded = Color::RED.with_alpha_scaled(0.5);
    assert!(ops.iter().any(|op| matches!(
        op,
        DrawOp::DrawPath { paint, .. } if paint.color == faded
    )));
}

#[test]
fn overlapping_children_get_a_group_layer() {
    let mut tree: Layer = ContainerLayer::opacity(0.5)
        .with_child(compatible(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)))
        .with_child(compatible(leaf(rect(5.0, 5.0, 15.0, 15.0), Color::BLUE)))
        .into();
    preroll(&mut tree);
    let Layer::Container(c) = &tree else {
        panic!("container")
    };
    assert!(!c.children_inherit_opacity());
    let ops = record(&tree);
    assert!(matches!(ops[0], DrawOp::SaveLayer { opacity, .. } if opacity == 0.5));
    assert!(ops.iter().all(|op| match op {
        DrawOp::DrawPath { paint, .. } => paint.color.a == 255,
        _ => true,
    }));
}

#[test]
fn incompatible_leaf_wraps_itself_in_a_group_layer() {
    let mut tree: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED).into();
    preroll(&mut tree);
    let mut rec = DisplayListBuilder::new();
    let mut ctx = PaintContext::new(&mut rec);
    ctx.inherited_opacity = 0.25;
    tree.paint(&mut ctx);
    assert_eq!(ctx.layers_painted(), 1);
    let ops = rec.ops();
    assert!(matches!(ops[0], DrawOp::SaveLayer { opacity, .. } if opacity == 0.25));
    assert_eq!(ops.last(), Some(&DrawOp::Restore));
}

#[test]
fn zero_opacity_paints_nothing() {
    let mut tree: Layer = ContainerLayer::opacity(0.0)
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .into();
    preroll(&mut tree);
    assert!(record(&tree).is_empty());
}

#[test]
fn layers_outside_the_clip_are_not_painted() {
    let mut tree: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .with_child(leaf(rect(50.0, 50.0, 60.0, 60.0), Color::BLUE))
        .into();
    preroll(&mut tree);
    let mut rec = DisplayListBuilder::new();
    rec.clip_rect(rect(0.0, 0.0, 20.0, 20.0));
    let mut ctx = PaintContext::new(&mut rec);
    tree.paint(&mut ctx);
    assert_eq!(ctx.layers_painted(), 1);
}

#[test]
fn blend_without_snapshotter_uses_a_blend_group() {
    let mut tree: Layer = ContainerLayer::blend(BlendMode::Multiply)
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .into();
    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 100.0, 100.0));
    tree.preroll(&mut ctx, Affine::IDENTITY);
    assert!(ctx.surface_needs_readback);
    let ops = record(&tree);
    assert!(matches!(
        ops[0],
        DrawOp::SaveLayer {
            blend_mode: BlendMode::Multiply,
            ..
        }
    ));
}

#[test]
fn blend_with_snapshotter_draws_a_blended_texture() {
    let mut tree: Layer = ContainerLayer::blend(BlendMode::Screen)
        .with_child(leaf(rect(2.0, 3.0, 12.0, 13.0), Color::RED))
        .into();
    preroll(&mut tree);
    let mut snap = ContentSnapshotter::default();
    let mut rec = DisplayListBuilder::new();
    let mut ctx = PaintContext::new(&mut rec).with_snapshotter(&mut snap);
    tree.paint(&mut ctx);
    let ops = rec.ops();
    assert!(ops.iter().any(|op| matches!(
        op,
        DrawOp::DrawTexture { blend_mode: BlendMode::Screen, texture, .. }
            if texture.size().width == 10
    )));
    assert!(ops.contains(&DrawOp::SetMatrix(Affine::translate((2.0, 3.0)))));
    assert_eq!(snap.stats().rendered, 1);
}

#[test]
fn identical_leaves_replace_each_other() {
    let history = PaintRegionMap::default();
    let cx = DiffContext::new(&history, DiffOpts::default());
    let a: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED).into();
    let a2: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED).into();
    let b: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::BLUE).into();
    let g: Layer = ContainerLayer::group().into();
    assert_ne!(a.id(), a2.id());
    assert!(a2.is_replacing(&cx, &a));
    assert!(!b.is_replacing(&cx, &a));
    assert!(!g.is_replacing(&cx, &a));
    assert!(
        Layer::from(ContainerLayer::opacity(0.5))
            .is_replacing(&cx, &Layer::from(ContainerLayer::opacity(0.5)))
    );
    assert!(
        !Layer::from(ContainerLayer::opacity(0.5))
            .is_replacing(&cx, &Layer::from(ContainerLayer::opacity(0.4)))
    );
}

#[test]
fn long_pictures_are_conservatively_not_replacing() {
    let history = PaintRegionMap::default();
    let cx = DiffContext::new(&history, DiffOpts::default().with_max_compared_ops(0));
    let a: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED).into();
    let a2: Layer = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED).into();
    assert!(!a2.is_replacing(&cx, &a));
    // A retained clone shares its picture.
    assert!(a.clone().is_replacing(&cx, &a));
}

#[test]
fn first_frame_damages_everything() {
    let tree: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .with_child(leaf(rect(20.0, 0.0, 30.0, 10.0), Color::RED))
        .into();
    let out = diff(&tree, None, &PaintRegionMap::default());
    assert_eq!(out.damage.frame_damage(), rect(0.0, 0.0, 30.0, 10.0));
    assert_eq!(out.regions.len(), 3);
}

#[test]
fn replacing_with_identical_content_yields_no_damage() {
    let old: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .into();
    let first = diff(&old, None, &PaintRegionMap::default());

    let new: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED))
        .into();
    let second = diff(&new, Some(&old), &first.regions);
    assert!(second.damage.is_empty());
    assert_eq!(second.regions.len(), 2);
}

#[test]
fn changed_leaf_damages_only_its_old_and_new_bounds() {
    let a = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED);
    let c = leaf(rect(40.0, 0.0, 50.0, 10.0), Color::RED);
    let old: Layer = ContainerLayer::group()
        .with_child(a.clone())
        .with_child(leaf(rect(20.0, 0.0, 30.0, 10.0), Color::RED))
        .with_child(c.clone())
        .into();
    let first = diff(&old, None, &PaintRegionMap::default());

    let new: Layer = ContainerLayer::group()
        .with_child(a)
        .with_child(leaf(rect(22.0, 0.0, 32.0, 10.0), Color::BLUE))
        .with_child(c)
        .into();
    let second = diff(&new, Some(&old), &first.regions);
    assert_eq!(second.damage.frame_damage(), rect(20.0, 0.0, 32.0, 10.0));
    assert!(!second.damage.intersects(rect(0.0, 0.0, 10.0, 10.0)));
    assert!(!second.damage.intersects(rect(40.0, 0.0, 50.0, 10.0)));
}

#[test]
fn inserted_and_removed_children_damage_in_isolation() {
    let a = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED);
    let gone = leaf(rect(20.0, 0.0, 30.0, 10.0), Color::RED);
    let old: Layer = ContainerLayer::group()
        .with_child(a.clone())
        .with_child(gone)
        .into();
    let first = diff(&old, None, &PaintRegionMap::default());

    let removed: Layer = ContainerLayer::group().with_child(a.clone()).into();
    let out = diff(&removed, Some(&old), &first.regions);
    assert_eq!(out.damage.rects(), &[rect(20.0, 0.0, 30.0, 10.0)]);

    let inserted: Layer = ContainerLayer::group()
        .with_child(a)
        .with_child(leaf(rect(60.0, 0.0, 70.0, 10.0), Color::GREEN))
        .with_child(leaf(rect(20.0, 0.0, 30.0, 10.0), Color::RED))
        .into();
    let out = diff(&inserted, Some(&old), &first.regions);
    assert_eq!(out.damage.rects(), &[rect(60.0, 0.0, 70.0, 10.0)]);
}

#[test]
fn changed_transform_damages_whole_subtree() {
    let content = leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED);
    let old: Layer = ContainerLayer::transform(Affine::translate((0.0, 0.0)))
        .with_child(content.clone())
        .into();
    let first = diff(&old, None, &PaintRegionMap::default());

    let new: Layer = ContainerLayer::transform(Affine::translate((5.0, 0.0)))
        .with_child(content)
        .into();
    let out = diff(&new, Some(&old), &first.regions);
    assert_eq!(out.damage.frame_damage(), rect(0.0, 0.0, 15.0, 10.0));
}

#[test]
fn cacheable_layer_is_prepared_then_hit() {
    let mut cache = RasterCache::new(RasterCacheOpts::default().with_complexity_threshold(1));
    let mut snap = ContentSnapshotter::default();
    let mut tree: Layer = CacheableLayer::new(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)).into();
    let cull = rect(0.0, 0.0, 100.0, 100.0);

    cache.begin_frame(FrameIndex(0));
    {
        let mut ctx = PrerollContext::new(cull)
            .with_raster_cache(&mut cache)
            .with_snapshotter(&mut snap);
        tree.preroll(&mut ctx, Affine::IDENTITY);
        assert!(ctx.subtree_can_inherit_opacity);
    }
    let mut rec = DisplayListBuilder::new();
    let mut ctx = PaintContext::new(&mut rec).with_raster_cache(&cache);
    tree.paint(&mut ctx);
    assert!(rec.ops().iter().any(|op| matches!(op, DrawOp::DrawTexture { .. })));
    assert!(!rec.ops().iter().any(|op| matches!(op, DrawOp::DrawPath { .. })));
    cache.end_frame();

    cache.begin_frame(FrameIndex(1));
    let mut ctx = PrerollContext::new(cull)
        .with_raster_cache(&mut cache)
        .with_snapshotter(&mut snap);
    tree.preroll(&mut ctx, Affine::IDENTITY);
    let Layer::Cacheable(c) = &tree else {
        panic!("cacheable")
    };
    assert!(c.was_cache_hit());
    assert_eq!(tree.paint_bounds(), rect(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn platform_views_are_never_cached() {
    let mut cache = RasterCache::new(RasterCacheOpts::default().with_complexity_threshold(0));
    let mut snap = ContentSnapshotter::default();
    let mut tree: Layer = ContainerLayer::platform_view()
        .with_child(CacheableLayer::new(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)))
        .into();
    cache.begin_frame(FrameIndex(0));
    let mut ctx = PrerollContext::new(rect(0.0, 0.0, 100.0, 100.0))
        .with_raster_cache(&mut cache)
        .with_snapshotter(&mut snap);
    tree.preroll(&mut ctx, Affine::IDENTITY);
    drop(ctx);
    assert!(cache.is_empty());
}

#[test]
fn cacheable_without_cache_paints_inner_layer() {
    let mut tree: Layer = CacheableLayer::new(leaf(rect(0.0, 0.0, 10.0, 10.0), Color::RED)).into();
    preroll(&mut tree);
    let ops = record(&tree);
    assert!(ops.iter().any(|op| matches!(op, DrawOp::DrawPath { .. })));
    assert_eq!(tree.complexity(), 1);
}

#[test]
fn content_fingerprint_ignores_identity_but_not_drawing() {
    let tree = |dx: f64, color: Color| -> Layer {
        ContainerLayer::transform(Affine::translate((dx, 0.0)))
            .with_child(leaf(rect(0.0, 0.0, 8.0, 8.0), color))
            .into()
    };
    let a = tree(2.0, Color::RED);
    assert_eq!(a.content_fingerprint(), tree(2.0, Color::RED).content_fingerprint());
    assert_ne!(a.content_fingerprint(), tree(3.0, Color::RED).content_fingerprint());
    assert_ne!(a.content_fingerprint(), tree(2.0, Color::BLUE).content_fingerprint());
}

#[test]
fn readback_is_found_anywhere_in_the_subtree() {
    let reader = leaf(rect(0.0, 0.0, 4.0, 4.0), Color::RED).with_opts(LeafOpts {
        reads_surface: true,
        ..LeafOpts::default()
    });
    let plain: Layer = ContainerLayer::group()
        .with_child(leaf(rect(0.0, 0.0, 4.0, 4.0), Color::RED))
        .into();
    let nested: Layer = CacheableLayer::new(ContainerLayer::group().with_child(reader)).into();
    let blend: Layer = ContainerLayer::blend(BlendMode::Multiply).into();
    assert!(!plain.contains_readback());
    assert!(nested.contains_readback());
    assert!(blend.contains_readback());
}
