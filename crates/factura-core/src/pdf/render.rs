//! Page rasterization and positioned text through pdfium.

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, trace};

use super::Result;
use super::reading_order::TextFragment;
use crate::error::PdfError;

/// Rasterizer and text layer reader backed by the pdfium library.
#[derive(Debug)]
pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    /// Bind to a pdfium library next to the executable, or the system one.
    pub fn bind() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| PdfError::Render(format!("failed to bind pdfium library: {}", e)))?;

        debug!("Bound pdfium library");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Bind if a pdfium library is installed.
    pub fn try_bind() -> Option<Self> {
        match Self::bind() {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                debug!("{}; vector pages cannot be rasterized", e);
                None
            }
        }
    }

    pub(crate) fn load<'a>(&'a self, data: &'a [u8]) -> Result<PdfDocument<'a>> {
        self.pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| PdfError::Parse(format!("pdfium: {}", e)))
    }
}

fn page_at<'a>(document: &PdfDocument<'a>, number: u32) -> Result<PdfPage<'a>> {
    document
        .pages()
        .get((number - 1) as PdfPageIndex)
        .map_err(|_| PdfError::InvalidPage(number))
}

/// Text segments of a page with their positions.
pub(crate) fn page_fragments(document: &PdfDocument<'_>, number: u32) -> Result<Vec<TextFragment>> {
    let page = page_at(document, number)?;
    let text = page
        .text()
        .map_err(|e| PdfError::TextExtraction(format!("pdfium: {}", e)))?;

    let fragments: Vec<TextFragment> = text
        .segments()
        .iter()
        .map(|segment| {
            let bounds = segment.bounds();
            let top = bounds.top().value;
            let bottom = bounds.bottom().value;
            TextFragment::new(bounds.left().value, (top + bottom) / 2.0, top - bottom, segment.text())
        })
        .collect();

    trace!("Page {}: {} text segments", number, fragments.len());
    Ok(fragments)
}

/// Rasterize a page at `scale` pixels per point.
pub(crate) fn render_page(document: &PdfDocument<'_>, number: u32, scale: f32) -> Result<DynamicImage> {
    let page = page_at(document, number)?;

    let pixel_width = (page.width().value * scale).round().max(1.0) as i32;
    let pixel_height = (page.height().value * scale).round().max(1.0) as i32;

    let bitmap = page
        .render_with_config(
            &PdfRenderConfig::new()
                .set_target_width(pixel_width)
                .set_target_height(pixel_height)
                .render_form_data(true)
                .render_annotations(true),
        )
        .map_err(|e| PdfError::Render(format!("page {}: {}", number, e)))?;

    debug!("Rendered page {} at {}x{}", number, pixel_width, pixel_height);
    Ok(bitmap.as_image())
}
