//! Text source resolution: embedded PDF text when it is usable, OCR otherwise.

mod quality;

pub use quality::{is_text_valid, plausible_ratio};

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{FacturaError, Result};
use crate::models::config::SourceConfig;
use crate::ocr::{RecognitionRequest, TextRecognizer};
use crate::pdf::{PageSource, PdfDocument, PdfRenderer};

/// Image extensions sent straight to the recognizer.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "bmp"];

/// How a document path should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if ext == "pdf" {
            Some(DocumentKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(DocumentKind::Image)
        } else {
            None
        }
    }
}

/// Resolves the text of a document, page by page.
pub struct TextSourceResolver<R> {
    recognizer: R,
    config: SourceConfig,
    renderer: Option<PdfRenderer>,
}

impl<R: TextRecognizer> TextSourceResolver<R> {
    /// Create a resolver, binding pdfium for page rasterization if it is installed.
    pub fn new(recognizer: R, config: SourceConfig) -> Self {
        Self {
            recognizer,
            config,
            renderer: PdfRenderer::try_bind(),
        }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn renderer(&self) -> Option<&PdfRenderer> {
        self.renderer.as_ref()
    }

    /// Whether embedded text is long and plausible enough to skip OCR.
    pub fn accepts_native(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.config.min_native_chars
            && is_text_valid(text, self.config.min_valid_ratio)
    }

    /// Resolve a document's text.
    ///
    /// Never fails: a document that cannot be opened or decoded yields an
    /// empty string and a logged warning.
    pub fn resolve(&self, path: &Path) -> String {
        match self.try_resolve(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    /// Resolve a document's text, reporting why it could not be read.
    pub fn try_resolve(&self, path: &Path) -> Result<String> {
        let kind = DocumentKind::from_path(path)
            .ok_or_else(|| FacturaError::UnsupportedFormat(path.display().to_string()))?;

        match kind {
            DocumentKind::Image => {
                let image = image::open(path)?;
                let request = RecognitionRequest::new(self.config.language.clone());
                info!("Recognizing image {} with {}", path.display(), self.recognizer.name());
                Ok(self.recognizer.recognize(&image, &request)?)
            }
            DocumentKind::Pdf => {
                let data = std::fs::read(path)?;
                let document = match &self.renderer {
                    Some(renderer) => PdfDocument::with_renderer(&data, renderer)?,
                    None => PdfDocument::from_bytes(&data)?,
                };
                Ok(self.resolve_document(&document))
            }
        }
    }

    /// Resolve every page of a paginated document and join them with newlines.
    ///
    /// A page that fails both ways contributes an empty string.
    pub fn resolve_document(&self, document: &dyn PageSource) -> String {
        let mut pages = document.page_count();
        if self.config.max_pages > 0 {
            pages = pages.min(self.config.max_pages as u32);
        }

        (1..=pages)
            .map(|page| match self.resolve_page(document, page) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Page {} could not be resolved: {}", page, e);
                    String::new()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Embedded text when trustworthy, otherwise OCR of the rendered page.
    pub fn resolve_page(&self, document: &dyn PageSource, page: u32) -> Result<String> {
        let native = document.page_text(page).unwrap_or_else(|e| {
            warn!("No embedded text on page {}: {}", page, e);
            String::new()
        });

        let length = native.trim().chars().count();
        if self.accepts_native(&native) {
            debug!("Page {}: using {} characters of embedded text", page, length);
            return Ok(native);
        }

        if let Some(alternate) = document.alternate_text(page) {
            if self.accepts_native(&alternate) {
                debug!("Page {}: using the alternate decoding of the text layer", page);
                return Ok(alternate);
            }
        }

        if length < self.config.min_native_chars {
            info!("Page {}: embedded text too short ({} chars), running OCR", page, length);
        } else {
            info!(
                "Page {}: embedded text looks garbled ({:.0}% plausible), running OCR",
                page,
                plausible_ratio(&native) * 100.0
            );
        }

        let start = Instant::now();
        let image = DynamicImage::ImageLuma8(document.page_image(page, self.config.render_scale)?.to_luma8());
        let request = RecognitionRequest::new(self.config.language.clone())
            .with_segmentation(self.config.segmentation);
        let text = self.recognizer.recognize(&image, &request)?;

        debug!(
            "Page {}: {} recognized {} characters in {}ms",
            page,
            self.recognizer.name(),
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, PdfError};
    use crate::ocr::SegmentationMode;
    use image::GenericImageView;
    use pretty_assertions::assert_eq;
    use crate::pdf::fixtures::{cid_font_pdf, garbled_pdf};
    use std::cell::RefCell;

    struct FakePages {
        texts: Vec<&'static str>,
        renderable: bool,
        alternate: Option<&'static str>,
    }

    impl PageSource for FakePages {
        fn page_count(&self) -> u32 {
            self.texts.len() as u32
        }

        fn page_text(&self, page: u32) -> crate::pdf::Result<String> {
            self.texts
                .get((page - 1) as usize)
                .map(|t| t.to_string())
                .ok_or(PdfError::InvalidPage(page))
        }

        fn page_image(&self, page: u32, scale: f32) -> crate::pdf::Result<DynamicImage> {
            if !self.renderable {
                return Err(PdfError::Render(format!("page {}", page)));
            }
            let side = (10.0 * scale) as u32;
            Ok(DynamicImage::new_rgb8(side, side))
        }

        fn alternate_text(&self, _page: u32) -> Option<String> {
            self.alternate.map(str::to_string)
        }
    }

    #[derive(Default)]
    struct FakeRecognizer {
        calls: RefCell<Vec<(u32, bool, RecognitionRequest)>>,
    }

    impl TextRecognizer for FakeRecognizer {
        fn recognize(&self, image: &DynamicImage, request: &RecognitionRequest) -> crate::ocr::Result<String> {
            let gray = matches!(image, DynamicImage::ImageLuma8(_));
            self.calls
                .borrow_mut()
                .push((image.dimensions().0, gray, request.clone()));
            Ok("Total $ 99,00 reconocido".to_string())
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _: &DynamicImage, _: &RecognitionRequest) -> crate::ocr::Result<String> {
            Err(OcrError::Recognition("boom".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn resolver<R: TextRecognizer>(recognizer: R) -> TextSourceResolver<R> {
        TextSourceResolver::new(recognizer, SourceConfig::default())
    }

    fn pages(texts: Vec<&'static str>, renderable: bool) -> FakePages {
        FakePages {
            texts,
            renderable,
            alternate: None,
        }
    }

    fn write_pdf(dir: &tempfile::TempDir, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("factura.pdf");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_good_native_text_skips_ocr() {
        let pages = pages(vec!["FACTURA A\nAcme SRL"], true);
        let resolver = resolver(FakeRecognizer::default());

        assert_eq!(resolver.resolve_document(&pages), "FACTURA A\nAcme SRL");
        assert!(resolver.recognizer().calls.borrow().is_empty());
    }

    #[test]
    fn test_short_or_garbled_pages_fall_back_to_ocr() {
        let pages = pages(vec!["  abc  ", "\u{1}\u{2}\u{3}~~~^^^###@@@", "Subtotal 1.000,00"], true);
        let resolver = resolver(FakeRecognizer::default());

        let text = resolver.resolve_document(&pages);
        assert_eq!(
            text,
            "Total $ 99,00 reconocido\nTotal $ 99,00 reconocido\nSubtotal 1.000,00"
        );

        let calls = resolver.recognizer().calls.borrow();
        assert_eq!(calls.len(), 2);
        // Rendered at 3x, converted to grayscale, automatic segmentation in Spanish.
        assert_eq!(calls[0].0, 30);
        assert!(calls[0].1);
        assert_eq!(calls[0].2.language, "spa");
        assert_eq!(calls[0].2.segmentation, SegmentationMode::Auto);
    }

    #[test]
    fn test_exactly_min_chars_is_accepted() {
        let pages = pages(vec!["0123456789"], false);
        assert_eq!(resolver(FakeRecognizer::default()).resolve_document(&pages), "0123456789");
    }

    #[test]
    fn test_failed_page_contributes_empty_string() {
        let pages = pages(vec!["", "Importe Total 10,00"], true);
        let resolver = resolver(FailingRecognizer);
        assert_eq!(resolver.resolve_document(&pages), "\nImporte Total 10,00");
    }

    #[test]
    fn test_max_pages_limits_reading() {
        let pages = pages(vec!["Pagina uno completa", "Pagina dos completa"], false);
        let config = SourceConfig {
            max_pages: 1,
            ..SourceConfig::default()
        };
        let resolver = TextSourceResolver::new(FakeRecognizer::default(), config);
        assert_eq!(resolver.resolve_document(&pages), "Pagina uno completa");
    }

    #[test]
    fn test_missing_or_unsupported_paths_yield_empty_text() {
        let resolver = resolver(FakeRecognizer::default());
        assert_eq!(resolver.resolve(Path::new("/nonexistent/factura.pdf")), "");
        assert_eq!(resolver.resolve(Path::new("notas.docx")), "");
        assert!(matches!(
            resolver.try_resolve(Path::new("notas.docx")),
            Err(FacturaError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_image_goes_straight_to_recognizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket.PNG");
        DynamicImage::new_rgb8(16, 16).save_with_format(&path, image::ImageFormat::Png).unwrap();

        let resolver = resolver(FakeRecognizer::default());
        assert_eq!(resolver.resolve(&path), "Total $ 99,00 reconocido");

        let calls = resolver.recognizer().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 16);
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_path(Path::new("a.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("a.tif")), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_path(Path::new("a")), None);
    }

    #[test]
    fn test_alternate_text_used_before_ocr() {
        let pages = FakePages {
            texts: vec!["\u{1}\u{2}\u{3}\u{4}\u{5}\u{6}\u{7}\u{8}\u{e}\u{f}\u{10}\u{11}"],
            renderable: true,
            alternate: Some("FACTURA B\nImporte Total 10,00"),
        };
        let resolver = resolver(FakeRecognizer::default());

        assert_eq!(resolver.resolve_document(&pages), "FACTURA B\nImporte Total 10,00");
        assert!(resolver.recognizer().calls.borrow().is_empty());
    }

    #[test]
    fn test_garbled_text_over_scan_reaches_recognizer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, &garbled_pdf(true));
        let resolver = resolver(FakeRecognizer::default());

        assert_eq!(resolver.resolve(&path), "Total $ 99,00 reconocido");
        let calls = resolver.recognizer().calls.borrow();
        assert_eq!(calls.len(), 1);
        // 200pt page at 3x
        assert_eq!(calls[0].0, 600);
        assert!(calls[0].1);
    }

    #[test]
    fn test_garbled_vector_page_reaches_recognizer() {
        let bytes = garbled_pdf(false);
        let resolver = resolver(FakeRecognizer::default());

        let plain = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(!resolver.accepts_native(&plain.page_text(1).unwrap()));

        let Some(renderer) = resolver.renderer() else {
            eprintln!("pdfium library not available, skipping vector rasterization");
            return;
        };
        let document = PdfDocument::with_renderer(&bytes, renderer).unwrap();
        assert_eq!(resolver.resolve_document(&document), "Total $ 99,00 reconocido");
        assert_eq!(resolver.recognizer().calls.borrow()[0].0, 600);
    }

    #[test]
    fn test_cid_font_text_decoded_without_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pdf(&dir, &cid_font_pdf("FACTURA IMPORTE"));
        let resolver = resolver(FakeRecognizer::default());

        let text = resolver.resolve(&path);
        assert!(text.contains("FACTURA"), "{:?}", text);
        assert!(text.contains("IMPORTE"), "{:?}", text);
        assert!(resolver.recognizer().calls.borrow().is_empty());
    }
}
