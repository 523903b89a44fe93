//! Error types for the factura-core library.

use thiserror::Error;

/// Main error type for the factura library.
#[derive(Error, Debug)]
pub enum FacturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Invoice record construction error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document extension is not one we know how to read.
    #[error("unsupported document type: {0}")]
    UnsupportedFormat(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to produce a raster image for a page.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The recognition engine failed on an image.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The external recognition executable could not be run.
    #[error("failed to run {program}: {reason}")]
    Process { program: String, reason: String },
}

/// Errors raised while building an invoice record.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// Every record must point at a document.
    #[error("an invoice record needs a document path")]
    MissingPath,
}

/// Result type for the factura library.
pub type Result<T> = std::result::Result<T, FacturaError>;
