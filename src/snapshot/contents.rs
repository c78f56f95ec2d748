use crate::foundation::core::{Affine, Rect, rect_is_empty};
use crate::paint::canvas::Canvas;
use crate::paint::display_list::Picture;
use crate::render::target::RenderOptions;

/// A unit of paintable content that can be rendered offscreen.
pub trait Contents {
    /// Tight bounds of what [`Contents::render`] draws under `transform`, or `None` when it
    /// draws nothing.
    fn coverage(&self, transform: Affine) -> Option<Rect>;

    /// Draw onto `canvas` under `transform` (concatenated onto the canvas matrix by the
    /// contents itself). Returning `false` means nothing usable was produced.
    fn render(&self, canvas: &mut dyn Canvas, transform: Affine, options: &RenderOptions) -> bool;
}

/// [`Contents`] backed by a recorded picture.
#[derive(Clone, Debug)]
pub struct PictureContents {
    picture: Picture,
}

impl PictureContents {
    /// Wrap `picture`.
    pub fn new(picture: Picture) -> Self {
        Self { picture }
    }
}

impl Contents for PictureContents {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        let bounds = self.picture.bounds();
        if self.picture.is_empty() || rect_is_empty(bounds) {
            return None;
        }
        Some(transform.transform_rect_bbox(bounds))
    }

    fn render(&self, canvas: &mut dyn Canvas, transform: Affine, _options: &RenderOptions) -> bool {
        canvas.save();
        canvas.transform(transform);
        self.picture.play_back(canvas);
        canvas.restore();
        true
    }
}

/// Rounds coverage out to whole pixels so snapshots stay on the device pixel grid.
pub(crate) struct PixelAligned<'a>(pub(crate) &'a dyn Contents);

impl Contents for PixelAligned<'_> {
    fn coverage(&self, transform: Affine) -> Option<Rect> {
        self.0.coverage(transform).map(Rect::expand)
    }

    fn render(&self, canvas: &mut dyn Canvas, transform: Affine, options: &RenderOptions) -> bool {
        self.0.render(canvas, transform, options)
    }
}
