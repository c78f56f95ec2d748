use super::*;

fn size(w: u32, h: u32) -> PixelSize {
    PixelSize::new(w, h)
}

#[test]
fn pool_honors_bucket_cap() {
    let mut p = SurfacePool::new(
        SurfacePoolOpts::default()
            .with_max_pool_bytes(1 << 30)
            .with_max_surfaces_per_bucket(1),
    );

    let a = p.borrow(size(8, 8)).unwrap();
    let b = p.borrow(size(8, 8)).unwrap();
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_surfaces, 1);
    assert_eq!(st.alloc_surfaces, 2);
}

#[test]
fn pool_honors_global_byte_cap() {
    let bytes_8x8 = size(8, 8).rgba8_len();
    let mut p = SurfacePool::new(
        SurfacePoolOpts::default()
            .with_max_pool_bytes(bytes_8x8)
            .with_max_surfaces_per_bucket(8),
    );

    let a = p.borrow(size(8, 8)).unwrap();
    let b = p.borrow(size(8, 8)).unwrap();
    p.release(a);
    p.release(b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, bytes_8x8);
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn released_pixmap_is_reused() {
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    let a = p.borrow(size(4, 2)).unwrap();
    p.release(a);
    let b = p.borrow(size(4, 2)).unwrap();
    assert_eq!((b.width(), b.height()), (4, 2));
    assert_eq!(p.stats().alloc_surfaces, 1);
    assert_eq!(p.stats().retained_surfaces, 0);
}

#[test]
fn idle_buckets_are_trimmed() {
    let mut p = SurfacePool::new(SurfacePoolOpts::default().with_max_idle_frames(2));
    let a = p.borrow(size(4, 4)).unwrap();
    p.release(a);

    p.set_frame(FrameIndex(2));
    p.trim_idle();
    assert_eq!(p.stats().retained_surfaces, 1);

    p.set_frame(FrameIndex(3));
    p.trim_idle();
    let st = p.stats();
    assert_eq!(st.retained_surfaces, 0);
    assert_eq!(st.retained_bytes, 0);
    assert_eq!(st.trimmed, 1);

    // The size is allocated fresh afterwards.
    let _ = p.borrow(size(4, 4)).unwrap();
    assert_eq!(p.stats().alloc_surfaces, 2);
}

#[test]
fn oversize_borrow_is_an_error() {
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    assert!(p.borrow(size(1 << 17, 1)).is_err());
}
