//! Page rendering seam
//!
//! The editor never parses documents itself. A host supplies a
//! [`PageRenderer`] that rasterizes one page at a requested width; the
//! rendered size defines the page surface that placements live on.

use image::RgbaImage;

use crate::error::RenderError;
use crate::geometry::PageSurface;

/// Pages are numbered from 1
pub const FIRST_PAGE: u32 = 1;

/// Rasterizes document pages for display under the overlay
pub trait PageRenderer {
    fn page_count(&self) -> Result<u32, RenderError>;

    /// Render `page` scaled to `width` pixels, preserving its aspect ratio
    fn render_page(&self, page: u32, width: u32) -> Result<RgbaImage, RenderError>;
}

/// A page rendered for the overlay
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: u32,
    pub page_count: u32,
    pub image: RgbaImage,
}

impl RenderedPage {
    /// Surface of the configured width whose height follows the rendered page
    pub fn surface(&self, width: f32) -> PageSurface {
        PageSurface::from_aspect(width, self.image.width() as f32, self.image.height() as f32)
    }
}

/// Render the first page at `width`
pub fn render_first_page(
    renderer: &dyn PageRenderer,
    width: f32,
) -> Result<RenderedPage, RenderError> {
    let page_count = renderer.page_count()?;
    if page_count < FIRST_PAGE {
        return Err(RenderError::PageOutOfRange {
            page: FIRST_PAGE,
            page_count,
        });
    }

    let image = renderer.render_page(FIRST_PAGE, width.round().max(1.0) as u32)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(RenderError::Render("renderer returned an empty image".to_string()));
    }

    tracing::debug!(
        page_count,
        width = image.width(),
        height = image.height(),
        "page rendered"
    );
    Ok(RenderedPage {
        page: FIRST_PAGE,
        page_count,
        image,
    })
}
