use serde::{Deserialize, Serialize};

use crate::paint::paint::BlendMode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct CanvasDef {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Top-level scene document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SceneDef {
    pub(crate) canvas: CanvasDef,
    pub(crate) root: LayerDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LayerDef {
    Leaf {
        shapes: Vec<DrawDef>,
        #[serde(default)]
        opacity_compatible: bool,
        #[serde(default)]
        reads_surface: bool,
        #[serde(default)]
        platform_view: bool,
        #[serde(default)]
        texture_layer: bool,
    },
    Group {
        children: Vec<LayerDef>,
    },
    Transform {
        #[serde(default)]
        transform: TransformDef,
        children: Vec<LayerDef>,
    },
    ClipRect {
        rect: RectDef,
        children: Vec<LayerDef>,
    },
    Opacity {
        alpha: f32,
        children: Vec<LayerDef>,
    },
    Blend {
        mode: BlendMode,
        children: Vec<LayerDef>,
    },
    PlatformView {
        children: Vec<LayerDef>,
    },
    Cacheable {
        child: Box<LayerDef>,
    },
}

/// One filled shape of a leaf picture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DrawDef {
    pub(crate) shape: ShapeDef,
    /// `#rrggbb` or `#rrggbbaa`.
    pub(crate) color: String,
    #[serde(default)]
    pub(crate) blend: BlendMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ShapeDef {
    Rect(RectDef),
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Path { svg_path_d: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct RectDef {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TransformDef {
    pub(crate) translate: [f64; 2],
    pub(crate) rotation_deg: f64,
    pub(crate) scale: [f64; 2],
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            translate: [0.0, 0.0],
            rotation_deg: 0.0,
            scale: [1.0, 1.0],
        }
    }
}
