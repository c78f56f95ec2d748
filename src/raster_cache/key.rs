use crate::foundation::core::{Affine, snap_translation};
use crate::foundation::ids::LayerId;

/// How strictly a cached snapshot must match the transform it is drawn under.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransformMatch {
    /// Every matrix coefficient must match bit for bit. Subpixel translation changes miss.
    Exact,
    /// The linear part must match; translation is snapped to whole pixels both when
    /// rasterizing and when drawing, so any integer-aligned move reuses the entry.
    #[default]
    SnapTranslation,
}

impl TransformMatch {
    /// Parse the configuration spelling (`exact` / `snap_translation`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(Self::Exact),
            "snap_translation" | "snap" => Some(Self::SnapTranslation),
            _ => None,
        }
    }

    /// Matrix a snapshot is rasterized under for a draw at `matrix`.
    pub(crate) fn raster_matrix(self, matrix: Affine) -> Affine {
        match self {
            Self::Exact => matrix,
            Self::SnapTranslation => {
                let [a, b, c, d, _, _] = matrix.as_coeffs();
                Affine::new([a, b, c, d, 0.0, 0.0])
            }
        }
    }

    /// Base transform a snapshot rasterized under [`TransformMatch::raster_matrix`] is drawn
    /// relative to.
    pub(crate) fn draw_base(self, matrix: Affine) -> Affine {
        match self {
            Self::Exact => Affine::IDENTITY,
            Self::SnapTranslation => {
                let [_, _, _, _, e, f] = snap_translation(matrix).as_coeffs();
                Affine::translate((e, f))
            }
        }
    }
}

/// Transform class of a cache entry under a [`TransformMatch`] policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatrixKey([u64; 6]);

impl MatrixKey {
    /// Classify `matrix` under `policy`.
    pub fn new(matrix: Affine, policy: TransformMatch) -> Self {
        let coeffs = policy.raster_matrix(matrix).as_coeffs();
        // -0.0 and 0.0 are the same transform.
        Self(coeffs.map(|c| (c + 0.0).to_bits()))
    }
}

/// Raster cache key: layer identity plus transform class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterCacheKey {
    /// Identity of the cached layer.
    pub layer: LayerId,
    /// Transform class.
    pub matrix: MatrixKey,
}

impl RasterCacheKey {
    /// Key for `layer` drawn under `matrix`.
    pub fn new(layer: LayerId, matrix: Affine, policy: TransformMatch) -> Self {
        Self {
            layer,
            matrix: MatrixKey::new(matrix, policy),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster_cache/key.rs"]
mod tests;
