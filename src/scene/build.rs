use std::path::Path;

use kurbo::Shape;

use crate::compositor::tree::LayerTree;
use crate::foundation::core::{Affine, BezPath, Color, PixelSize, Point, Rect};
use crate::foundation::error::{LaminaError, LaminaResult};
use crate::layer::Layer;
use crate::layer::cacheable::CacheableLayer;
use crate::layer::container::ContainerLayer;
use crate::layer::leaf::{LeafLayer, LeafOpts};
use crate::paint::canvas::Canvas;
use crate::paint::display_list::DisplayListBuilder;
use crate::paint::paint::Paint;
use crate::scene::model::{DrawDef, LayerDef, RectDef, SceneDef, ShapeDef, TransformDef};

const PATH_TOLERANCE: f64 = 0.1;

/// A validated scene document that builds [`LayerTree`]s.
///
/// JSON shape:
///
/// ```json
/// {
///   "canvas": { "width": 64, "height": 64 },
///   "root": { "group": { "children": [
///     { "leaf": { "shapes": [ { "shape": { "rect": { "x": 0, "y": 0, "width": 8, "height": 8 } },
///                               "color": "#ff0000" } ] } }
///   ] } }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Scene {
    def: SceneDef,
}

impl Scene {
    /// Parse and validate a scene from JSON.
    pub fn from_json_str(s: &str) -> LaminaResult<Self> {
        let def: SceneDef = serde_json::from_str(s)?;
        let scene = Self { def };
        scene.validate()?;
        Ok(scene)
    }

    /// Read a scene from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> LaminaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LaminaError::validation(format!("read scene '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Canvas size.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.def.canvas.width, self.def.canvas.height)
    }

    /// Check every document-level constraint that the builder relies on.
    pub fn validate(&self) -> LaminaResult<()> {
        if self.size().is_empty() {
            return Err(LaminaError::validation(
                "scene canvas width and height must be > 0",
            ));
        }
        validate_layer(&self.def.root, "root")
    }

    /// Build a fresh layer tree. Every call allocates new layer identities.
    pub fn build(&self) -> LaminaResult<LayerTree> {
        Ok(LayerTree::new(build_layer(&self.def.root)?, self.size()))
    }
}

fn validate_layer(def: &LayerDef, at: &str) -> LaminaResult<()> {
    let children = match def {
        LayerDef::Leaf { shapes, .. } => {
            for (i, draw) in shapes.iter().enumerate() {
                Color::from_hex(&draw.color)
                    .map_err(|e| LaminaError::validation(format!("{at}.shapes[{i}]: {e}")))?;
                validate_shape(&draw.shape)
                    .map_err(|e| LaminaError::validation(format!("{at}.shapes[{i}]: {e}")))?;
            }
            return Ok(());
        }
        LayerDef::Transform {
            transform,
            children,
        } => {
            let finite = transform.translate.iter().all(|v| v.is_finite())
                && transform.scale.iter().all(|v| v.is_finite())
                && transform.rotation_deg.is_finite();
            if !finite {
                return Err(LaminaError::validation(format!(
                    "{at}: transform values must be finite"
                )));
            }
            children
        }
        LayerDef::ClipRect { rect, children } => {
            if !rect_def_is_valid(rect) {
                return Err(LaminaError::validation(format!(
                    "{at}: clip rect must be finite with non-negative size"
                )));
            }
            children
        }
        LayerDef::Opacity { alpha, children } => {
            if !alpha.is_finite() || !(0.0..=1.0).contains(alpha) {
                return Err(LaminaError::validation(format!(
                    "{at}: opacity alpha must be in [0, 1]"
                )));
            }
            children
        }
        LayerDef::Group { children }
        | LayerDef::Blend { children, .. }
        | LayerDef::PlatformView { children } => children,
        LayerDef::Cacheable { child } => {
            return validate_layer(child, &format!("{at}.child"));
        }
    };
    for (i, child) in children.iter().enumerate() {
        validate_layer(child, &format!("{at}.children[{i}]"))?;
    }
    Ok(())
}

fn validate_shape(shape: &ShapeDef) -> Result<(), String> {
    match shape {
        ShapeDef::Rect(r) if !rect_def_is_valid(r) => {
            Err("rect must be finite with non-negative size".to_owned())
        }
        ShapeDef::Ellipse { cx, cy, rx, ry } => {
            if [cx, cy, rx, ry].iter().all(|v| v.is_finite()) && *rx >= 0.0 && *ry >= 0.0 {
                Ok(())
            } else {
                Err("ellipse must be finite with non-negative radii".to_owned())
            }
        }
        ShapeDef::Path { svg_path_d } => BezPath::from_svg(svg_path_d)
            .map(|_| ())
            .map_err(|e| format!("invalid svg path data: {e}")),
        ShapeDef::Rect(_) => Ok(()),
    }
}

fn rect_def_is_valid(r: &RectDef) -> bool {
    [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite())
        && r.width >= 0.0
        && r.height >= 0.0
}

fn to_rect(r: &RectDef) -> Rect {
    Rect::new(r.x, r.y, r.x + r.width, r.y + r.height)
}

fn to_affine(t: &TransformDef) -> Affine {
    Affine::translate((t.translate[0], t.translate[1]))
        * Affine::rotate(t.rotation_deg.to_radians())
        * Affine::scale_non_uniform(t.scale[0], t.scale[1])
}

fn shape_path(shape: &ShapeDef) -> LaminaResult<BezPath> {
    Ok(match shape {
        ShapeDef::Rect(r) => to_rect(r).to_path(PATH_TOLERANCE),
        ShapeDef::Ellipse { cx, cy, rx, ry } => {
            kurbo::Ellipse::new(Point::new(*cx, *cy), (*rx, *ry), 0.0).to_path(PATH_TOLERANCE)
        }
        ShapeDef::Path { svg_path_d } => BezPath::from_svg(svg_path_d)
            .map_err(|e| LaminaError::validation(format!("invalid svg path data: {e}")))?,
    })
}

fn build_leaf(shapes: &[DrawDef], opts: LeafOpts) -> LaminaResult<LeafLayer> {
    let mut b = DisplayListBuilder::new();
    for draw in shapes {
        let paint = Paint::fill(Color::from_hex(&draw.color)?).with_blend_mode(draw.blend);
        b.draw_path(&shape_path(&draw.shape)?, &paint);
    }
    Ok(LeafLayer::new(b.build_picture()).with_opts(opts))
}

fn build_container(
    mut container: ContainerLayer,
    children: &[LayerDef],
) -> LaminaResult<ContainerLayer> {
    for child in children {
        container.add_child(build_layer(child)?);
    }
    Ok(container)
}

fn build_layer(def: &LayerDef) -> LaminaResult<Layer> {
    Ok(match def {
        LayerDef::Leaf {
            shapes,
            opacity_compatible,
            reads_surface,
            platform_view,
            texture_layer,
        } => {
            let opts = LeafOpts {
                has_platform_view: *platform_view,
                reads_surface: *reads_surface,
                opacity_compatible: *opacity_compatible,
                has_texture_layer: *texture_layer,
            };
            build_leaf(shapes, opts)?.into()
        }
        LayerDef::Group { children } => build_container(ContainerLayer::group(), children)?.into(),
        LayerDef::Transform {
            transform,
            children,
        } => build_container(ContainerLayer::transform(to_affine(transform)), children)?.into(),
        LayerDef::ClipRect { rect, children } => {
            build_container(ContainerLayer::clip_rect(to_rect(rect)), children)?.into()
        }
        LayerDef::Opacity { alpha, children } => {
            build_container(ContainerLayer::opacity(*alpha), children)?.into()
        }
        LayerDef::Blend { mode, children } => {
            build_container(ContainerLayer::blend(*mode), children)?.into()
        }
        LayerDef::PlatformView { children } => {
            build_container(ContainerLayer::platform_view(), children)?.into()
        }
        LayerDef::Cacheable { child } => CacheableLayer::new(build_layer(child)?).into(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/build.rs"]
mod tests;
