//! Lamina is the retained-mode compositing core of a 2D renderer.
//!
//! A tree of [`Layer`]s is rebuilt (or retained) every frame and run through three passes:
//!
//! - **Preroll** computes paint bounds, propagates ambient flags and probes the [`RasterCache`].
//! - **Diff** compares the tree with the previous frame's and produces [`Damage`].
//! - **Paint** emits draws for the layers that intersect the damage, substituting cached
//!   snapshots for eligible subtrees.
//!
//! [`Compositor`] drives the passes per frame and owns everything that persists between frames.
//! Offscreen rendering for the cache and for blend effects goes through the
//! [`ContentSnapshotter`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod compositor;
pub(crate) mod diff;
pub(crate) mod layer;
pub(crate) mod paint;
pub(crate) mod raster_cache;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod snapshot;

pub use crate::foundation::core::{
    Affine, BezPath, Color, FrameIndex, PixelSize, Point, Rect, Rgba8Premul, Size, Vec2,
    rect_intersect, rect_is_empty, rect_union, rects_overlap,
};
pub use crate::foundation::error::{LaminaError, LaminaResult};
pub use crate::foundation::ids::{LayerId, TextureId};
pub use crate::foundation::math::{max_channel_delta, scale_premul_in_place};

pub use crate::compositor::frame::{Compositor, FrameReport};
pub use crate::compositor::opts::{
    CompositorOpts, ENV_ACCESS_THRESHOLD, ENV_PARTIAL_REPAINT, ENV_TRANSFORM_MATCH,
};
pub use crate::compositor::tree::LayerTree;
pub use crate::diff::context::{DiffContext, DiffResult, SubtreeScope};
pub use crate::diff::damage::{Damage, DiffOpts};
pub use crate::diff::region::{PaintRegion, PaintRegionMap};
pub use crate::layer::Layer;
pub use crate::layer::cacheable::CacheableLayer;
pub use crate::layer::container::{ContainerKind, ContainerLayer};
pub use crate::layer::context::{PaintContext, PrerollContext, PrerollScope};
pub use crate::layer::leaf::{LeafLayer, LeafOpts};
pub use crate::layer::mutators::{Mutator, MutatorsStack};
pub use crate::paint::canvas::Canvas;
pub use crate::paint::cpu_canvas::CpuCanvas;
pub use crate::paint::display_list::{DisplayList, DisplayListBuilder, DrawOp, Picture};
pub use crate::paint::paint::{BlendMode, Paint};
pub use crate::paint::texture::Texture;
pub use crate::raster_cache::cache::{RasterCache, RasterCacheStats};
pub use crate::raster_cache::key::{MatrixKey, RasterCacheKey, TransformMatch};
pub use crate::raster_cache::opts::RasterCacheOpts;
pub use crate::render::capabilities::{
    BASELINE_FEATURES, Capabilities, CpuCapabilities, Feature, require_features,
};
pub use crate::render::surface::{CpuSurfaceProducer, FrameRGBA, Surface, SurfaceProducer};
pub use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
pub use crate::render::target::{OffscreenTarget, RenderOptions, RenderTarget};
pub use crate::scene::build::Scene;
pub use crate::snapshot::contents::{Contents, PictureContents};
pub use crate::snapshot::snapshotter::{ContentSnapshotter, Snapshot, SnapshotStats};
