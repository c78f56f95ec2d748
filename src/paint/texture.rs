use std::fmt;
use std::sync::Arc;

use crate::foundation::core::PixelSize;
use crate::foundation::ids::TextureId;

/// Immutable premultiplied RGBA8 raster shared between snapshots, cache entries and draws.
///
/// Equality is identity: two textures are equal only if they are the same upload.
#[derive(Clone)]
pub struct Texture {
    id: TextureId,
    size: PixelSize,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl Texture {
    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        let size = PixelSize::new(u32::from(pixmap.width()), u32::from(pixmap.height()));
        Self {
            id: TextureId::next(),
            size,
            pixmap: Arc::new(pixmap),
        }
    }

    /// Texture identity.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Pixel dimensions.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Retained byte size.
    pub fn byte_len(&self) -> usize {
        self.size.rgba8_len()
    }

    /// Premultiplied RGBA8 bytes, row-major, tightly packed.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied RGBA8 value at `(x, y)`, or `None` outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        let px = self.pixels().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub(crate) fn image_paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::clone(&self.pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }

    /// Take the backing pixmap back if this is the last handle.
    pub(crate) fn into_pixmap(self) -> Option<vello_cpu::Pixmap> {
        Arc::try_unwrap(self.pixmap).ok()
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture {}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("size", &self.size)
            .finish()
    }
}
