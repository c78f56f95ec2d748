use crate::foundation::core::{FrameIndex, PixelSize};
use crate::foundation::error::LaminaResult;
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfacePoolStats};
use crate::render::target::RenderTarget;

/// A rendered frame read back from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub(crate) fn from_pixmap(pixmap: &vello_cpu::Pixmap) -> Self {
        Self {
            width: u32::from(pixmap.width()),
            height: u32::from(pixmap.height()),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Premultiplied RGBA8 value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight alpha in place (no-op when already straight).
    pub fn unpremultiply(&mut self) {
        if !self.premultiplied {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        self.premultiplied = false;
    }
}

/// Opaque handle to a frame surface handed out by a [`SurfaceProducer`].
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    has_previous_contents: bool,
}

impl Surface {
    /// Wrap a pixmap. `has_previous_contents` tells the compositor the pixels still hold the
    /// last submitted frame, which enables partial repaint.
    pub fn new(pixmap: vello_cpu::Pixmap, has_previous_contents: bool) -> Self {
        Self {
            pixmap,
            has_previous_contents,
        }
    }

    /// Return `true` when the surface still shows the previously submitted frame.
    pub fn has_previous_contents(&self) -> bool {
        self.has_previous_contents
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Read the surface back.
    pub fn read_back(&self) -> FrameRGBA {
        FrameRGBA::from_pixmap(&self.pixmap)
    }

    fn into_pixmap(self) -> vello_cpu::Pixmap {
        self.pixmap
    }
}

impl RenderTarget for Surface {
    fn size(&self) -> PixelSize {
        PixelSize::new(
            u32::from(self.pixmap.width()),
            u32::from(self.pixmap.height()),
        )
    }
}

/// External pool of presentable surfaces.
///
/// The compositor acquires one surface per frame and submits it after painting; buffering and
/// shrink policy stay with the producer.
pub trait SurfaceProducer {
    /// Acquire a surface of `size`, or `None` when none is available this frame.
    fn produce_surface(&mut self, size: PixelSize) -> Option<Surface>;

    /// Hand rendered surfaces back for presentation.
    fn submit_surfaces(&mut self, surfaces: Vec<Surface>);
}

/// In-memory [`SurfaceProducer`] that keeps the last submitted frame as its front buffer.
///
/// The front buffer is handed out again on the next acquire of the same size, so undamaged
/// pixels survive a partial repaint. Idle pooled pixmaps are trimmed once per submit.
pub struct CpuSurfaceProducer {
    front: Option<vello_cpu::Pixmap>,
    pool: SurfacePool,
    frame: FrameIndex,
}

impl CpuSurfaceProducer {
    /// Create a producer with an empty front buffer.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            front: None,
            pool: SurfacePool::new(opts),
            frame: FrameIndex::default(),
        }
    }

    /// The last submitted frame.
    pub fn front(&self) -> Option<FrameRGBA> {
        self.front.as_ref().map(FrameRGBA::from_pixmap)
    }

    /// Frames submitted so far.
    pub fn submitted_frames(&self) -> u64 {
        self.frame.0
    }

    /// Counters of the backing pool.
    pub fn pool_stats(&self) -> SurfacePoolStats {
        self.pool.stats()
    }

    fn fresh(&mut self, size: PixelSize) -> LaminaResult<vello_cpu::Pixmap> {
        let mut pixmap = self.pool.borrow(size)?;
        pixmap.data_as_u8_slice_mut().fill(0);
        Ok(pixmap)
    }
}

impl Default for CpuSurfaceProducer {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

impl SurfaceProducer for CpuSurfaceProducer {
    fn produce_surface(&mut self, size: PixelSize) -> Option<Surface> {
        if size.is_empty() {
            return None;
        }
        if let Some(front) = self.front.take() {
            let front_size = PixelSize::new(u32::from(front.width()), u32::from(front.height()));
            if front_size == size {
                return Some(Surface::new(front, true));
            }
            self.pool.release(front);
        }
        match self.fresh(size) {
            Ok(pixmap) => Some(Surface::new(pixmap, false)),
            Err(err) => {
                tracing::debug!(?size, %err, "surface allocation failed");
                None
            }
        }
    }

    fn submit_surfaces(&mut self, surfaces: Vec<Surface>) {
        for surface in surfaces {
            if let Some(prev) = self.front.replace(surface.into_pixmap()) {
                self.pool.release(prev);
            }
        }
        self.frame = self.frame.next();
        self.pool.set_frame(self.frame);
        self.pool.trim_idle();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
