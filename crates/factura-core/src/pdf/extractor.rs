//! PDF text and image extraction using lopdf, pdfium and pdf-extract.

use image::DynamicImage;
use image::imageops::FilterType;
use image::{ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfium_render::prelude::PdfDocument as PdfiumDocument;
use std::cell::OnceCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, trace, warn};

use super::reading_order::arrange;
use super::render::{PdfRenderer, page_fragments, render_page};
use super::{PageSource, Result};
use crate::error::PdfError;

/// US Letter, used when a page tree carries no MediaBox.
const DEFAULT_MEDIA_BOX: (f32, f32) = (612.0, 792.0);

/// A loaded PDF document.
///
/// The page tree is read with lopdf. When a [`PdfRenderer`] is attached, pages
/// are rasterized and their text layer read through pdfium; otherwise text
/// comes from pdf-extract and rasters from the page's embedded scan.
pub struct PdfDocument<'a> {
    document: Document,
    raw_data: Vec<u8>,
    rendered: Option<PdfiumDocument<'a>>,
    /// Per-page text from pdf-extract, computed on first use.
    extracted_pages: OnceCell<Vec<String>>,
}

impl<'a> PdfDocument<'a> {
    /// Load a PDF from bytes, without a rasterizer.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document,
            raw_data,
            rendered: None,
            extracted_pages: OnceCell::new(),
        })
    }

    /// Load a PDF from bytes and open it in pdfium as well.
    ///
    /// A document pdfium rejects is still usable through lopdf and pdf-extract.
    pub fn with_renderer(data: &'a [u8], renderer: &'a PdfRenderer) -> Result<Self> {
        let mut document = Self::from_bytes(data)?;
        match renderer.load(data) {
            Ok(rendered) => document.rendered = Some(rendered),
            Err(e) => warn!("{}; falling back to pdf-extract", e),
        }
        Ok(document)
    }

    /// True when pages are rasterized by pdfium.
    pub fn is_rendered(&self) -> bool {
        self.rendered.is_some()
    }

    /// Page text as pdf-extract decodes it, honoring font encodings and
    /// ToUnicode maps but not visual order.
    fn extracted_page(&self, page: u32) -> String {
        let pages = self.extracted_pages.get_or_init(|| {
            // pdf-extract panics on some malformed fonts
            let result = catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            }));
            match result {
                Ok(Ok(pages)) => pages,
                Ok(Err(e)) => {
                    debug!("pdf-extract could not read the document: {}", e);
                    Vec::new()
                }
                Err(_) => {
                    warn!("pdf-extract panicked on a malformed document");
                    Vec::new()
                }
            }
        });
        pages.get((page - 1) as usize).cloned().unwrap_or_default()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    fn page_dict(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.document.get_object(page_id).ok()?.as_dict().ok()
    }

    /// Look up a page attribute, walking up the page tree for inherited ones.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.page_dict(page_id)?;

        // Page trees are shallow; the bound only guards against Parent cycles.
        for _ in 0..32 {
            if let Ok(value) = node.get(key) {
                return self.document.dereference(value).ok().map(|(_, obj)| obj);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.page_dict(parent)?;
        }
        None
    }

    /// Page width and height in points.
    fn media_box(&self, page_id: ObjectId) -> (f32, f32) {
        let Some(Object::Array(bounds)) = self.inherited(page_id, b"MediaBox") else {
            return DEFAULT_MEDIA_BOX;
        };

        let values: Vec<f32> = bounds
            .iter()
            .filter_map(|obj| match obj {
                Object::Integer(i) => Some(*i as f32),
                Object::Real(r) => Some(*r as f32),
                _ => None,
            })
            .collect();

        match values.as_slice() {
            [x0, y0, x1, y1] if x1 > x0 && y1 > y0 => (x1 - x0, y1 - y0),
            _ => DEFAULT_MEDIA_BOX,
        }
    }

    /// Images placed on a page through its XObject resources.
    fn page_images(&self, page_id: ObjectId) -> Vec<DynamicImage> {
        let mut images = Vec::new();

        let Some(Object::Dictionary(resources)) = self.inherited(page_id, b"Resources") else {
            return images;
        };

        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = self.document.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = self.document.dereference(obj_ref) {
                        if let Some(img) = self.decode_image(obj) {
                            images.push(img);
                        }
                    }
                }
            }
        }

        images
    }

    fn decode_image(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                        .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter, skipping");
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        raw_to_image(&data, width, height, color_space)
    }
}

fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);

    let rgba: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => data[..pixels * 3]
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&g| [g, g, g, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl PageSource for PdfDocument<'_> {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;

        if let Some(rendered) = &self.rendered {
            match page_fragments(rendered, page) {
                Ok(fragments) if !fragments.is_empty() => return Ok(arrange(fragments)),
                Ok(_) => debug!("Page {} has no text layer in pdfium", page),
                Err(e) => warn!("Could not read text layer of page {}: {}", page, e),
            }
        }

        Ok(self.extracted_page(page))
    }

    fn alternate_text(&self, page: u32) -> Option<String> {
        // Without pdfium, page_text already is the pdf-extract text.
        self.rendered.as_ref()?;
        let text = self.extracted_page(page);
        (!text.trim().is_empty()).then_some(text)
    }

    fn page_image(&self, page: u32, scale: f32) -> Result<DynamicImage> {
        let page_id = self.page_id(page)?;

        if let Some(rendered) = &self.rendered {
            return render_page(rendered, page, scale);
        }

        // No rasterizer: use the largest embedded scan, fitted to the page size.
        let image = self
            .page_images(page_id)
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
            .ok_or_else(|| PdfError::Render(format!("page {} has no raster content and pdfium is unavailable", page)))?;

        let (width_pt, height_pt) = self.media_box(page_id);
        let width = (width_pt * scale).round().max(1.0) as u32;
        let height = (height_pt * scale).round().max(1.0) as u32;

        debug!(
            "Page {}: scaling embedded {}x{} image to fit {}x{}",
            page,
            image.width(),
            image.height(),
            width,
            height
        );
        Ok(image.resize(width, height, FilterType::Triangle))
    }
}
