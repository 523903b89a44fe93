//! PDF processing module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod reading_order;
mod render;

pub use extractor::PdfDocument;
pub use reading_order::{TextFragment, arrange};
pub use render::PdfRenderer;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A paginated document the resolver can read page by page.
///
/// Pages are numbered from 1.
pub trait PageSource {
    /// Get the number of pages.
    fn page_count(&self) -> u32;

    /// Embedded text of a page in visual reading order.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Raster of a page at `scale` times its size in points.
    fn page_image(&self, page: u32, scale: f32) -> Result<DynamicImage>;

    /// Second opinion on a page's embedded text, if the source has one.
    fn alternate_text(&self, _page: u32) -> Option<String> {
        None
    }
}
