use super::*;
use crate::foundation::core::Color;
use crate::paint::display_list::DisplayListBuilder;
use crate::paint::paint::Paint;
use crate::snapshot::contents::PictureContents;

fn rect_contents(r: Rect, color: Color) -> PictureContents {
    let mut b = DisplayListBuilder::new();
    b.draw_rect(r, &Paint::fill(color));
    PictureContents::new(b.build_picture())
}

struct Refusing;

impl Contents for Refusing {
    fn coverage(&self, _transform: Affine) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 4.0, 4.0))
    }

    fn render(&self, _canvas: &mut dyn Canvas, _transform: Affine, _options: &RenderOptions) -> bool {
        false
    }
}

#[test]
fn snapshot_is_sized_to_coverage_and_placed_at_its_origin() {
    let contents = rect_contents(Rect::new(10.0, 20.0, 40.0, 60.0), Color::RED);
    let mut s = ContentSnapshotter::default();
    let snap = s.render_to_snapshot(&contents, Affine::IDENTITY).unwrap();
    assert_eq!(snap.texture.size(), PixelSize::new(30, 40));
    assert_eq!(snap.transform, Affine::translate((10.0, 20.0)));
    assert_eq!(snap.texture.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(snap.texture.pixel(29, 39), Some([255, 0, 0, 255]));
    assert_eq!(snap.bounds(), Rect::new(10.0, 20.0, 40.0, 60.0));
}

#[test]
fn fractional_coverage_rounds_size_up() {
    let contents = rect_contents(Rect::new(0.5, 0.5, 10.2, 3.0), Color::BLUE);
    let mut s = ContentSnapshotter::default();
    let snap = s.render_to_snapshot(&contents, Affine::IDENTITY).unwrap();
    assert_eq!(snap.texture.size(), PixelSize::new(10, 3));
    assert_eq!(snap.transform, Affine::translate((0.5, 0.5)));
}

#[test]
fn transform_is_applied_before_measuring_coverage() {
    let contents = rect_contents(Rect::new(0.0, 0.0, 5.0, 5.0), Color::GREEN);
    let mut s = ContentSnapshotter::default();
    let m = Affine::translate((3.0, 4.0)) * Affine::scale(2.0);
    let snap = s.render_to_snapshot(&contents, m).unwrap();
    assert_eq!(snap.texture.size(), PixelSize::new(10, 10));
    assert_eq!(snap.transform, Affine::translate((3.0, 4.0)));
}

#[test]
fn no_coverage_means_no_snapshot() {
    let empty = PictureContents::new(DisplayListBuilder::new().build_picture());
    let mut s = ContentSnapshotter::default();
    assert!(s.render_to_snapshot(&empty, Affine::IDENTITY).is_none());
    assert_eq!(s.stats().skipped, 1);
}

#[test]
fn zero_area_coverage_means_no_snapshot() {
    let line = rect_contents(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
    let mut s = ContentSnapshotter::default();
    assert!(s.render_to_snapshot(&line, Affine::scale_non_uniform(1.0, 0.0)).is_none());
}

#[test]
fn failed_render_means_no_snapshot() {
    let mut s = ContentSnapshotter::default();
    assert!(s.render_to_snapshot(&Refusing, Affine::IDENTITY).is_none());
    assert_eq!(s.stats().rendered, 0);
}

#[test]
fn should_render_checks_target_intersection() {
    let contents = rect_contents(Rect::new(10.0, 10.0, 20.0, 20.0), Color::RED);
    let s = ContentSnapshotter::default();
    let target = Rect::new(0.0, 0.0, 15.0, 15.0);
    assert!(s.should_render(&contents, Affine::IDENTITY, target));
    assert!(!s.should_render(&contents, Affine::translate((50.0, 0.0)), target));
    let empty = PictureContents::new(DisplayListBuilder::new().build_picture());
    assert!(!s.should_render(&empty, Affine::IDENTITY, target));
}

#[test]
fn recycled_pixels_return_to_pool() {
    let contents = rect_contents(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED);
    let mut s = ContentSnapshotter::default();
    let snap = s.render_to_snapshot(&contents, Affine::IDENTITY).unwrap();
    s.recycle(snap);
    assert_eq!(s.pool_stats().retained_surfaces, 1);
    let _ = s.render_to_snapshot(&contents, Affine::IDENTITY).unwrap();
    assert_eq!(s.pool_stats().alloc_surfaces, 1);
}
