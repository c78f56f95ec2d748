use crate::foundation::error::{LaminaError, LaminaResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Monotonic frame counter of a compositor.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The frame after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Integer pixel dimensions of a render target.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Create a size from integer dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round a fractional size up to whole pixels.
    ///
    /// Negative or non-finite extents collapse to zero.
    pub fn ceil(size: Size) -> Self {
        fn dim(v: f64) -> u32 {
            if !v.is_finite() || v <= 0.0 {
                return 0;
            }
            v.ceil().min(f64::from(u32::MAX)) as u32
        }
        Self {
            width: dim(size.width),
            height: dim(size.height),
        }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// The size as a rect anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Convert to the `u16` dimensions accepted by the CPU rasterizer.
    pub fn to_u16(self) -> LaminaResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| LaminaError::validation("pixel width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| LaminaError::validation("pixel height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Straight-alpha RGBA8 color.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba8(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba8(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgba8(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::rgba8(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgba8(0, 0, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba8(0, 0, 0, 0);

    /// Build a color from channel values.
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> LaminaResult<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| LaminaError::validation(format!("color '{s}' must start with '#'")))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(LaminaError::validation(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| -> LaminaResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| LaminaError::validation(format!("color '{s}' has invalid hex digits")))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba8(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Scale the alpha channel by `opacity` (clamped to `[0, 1]`).
    pub fn with_alpha_scaled(self, opacity: f32) -> Self {
        let op = opacity.clamp(0.0, 1.0);
        let a = (f32::from(self.a) * op).round().clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }

    /// Convert to premultiplied RGBA8.
    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channel array in RGBA order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Return `true` when `r` encloses no area (including inverted rects).
pub fn rect_is_empty(r: Rect) -> bool {
    !(r.x1 > r.x0 && r.y1 > r.y0)
}

/// Union that treats empty rects as the identity element.
pub fn rect_union(a: Rect, b: Rect) -> Rect {
    match (rect_is_empty(a), rect_is_empty(b)) {
        (true, true) => Rect::ZERO,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a.union(b),
    }
}

/// Intersection that yields [`Rect::ZERO`] for disjoint inputs.
pub fn rect_intersect(a: Rect, b: Rect) -> Rect {
    let r = a.intersect(b);
    if rect_is_empty(r) { Rect::ZERO } else { r }
}

/// Return `true` when the rects share a region of positive area.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    !rect_is_empty(a) && !rect_is_empty(b) && !rect_is_empty(a.intersect(b))
}

/// Round the translation part of `m` to whole pixels.
pub fn snap_translation(m: Affine) -> Affine {
    let [a, b, c, d, e, f] = m.as_coeffs();
    Affine::new([a, b, c, d, e.round(), f.round()])
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
