//! Core library for Argentine invoice processing.
//!
//! This crate provides:
//! - Text source resolution (embedded PDF text with an OCR fallback per page)
//! - Locale-aware amount normalization
//! - Heuristic invoice field extraction (totals, VAT, dates, parties, CUIT, invoice class)
//! - The `InvoiceRecord` accumulator and folder discovery

pub mod discovery;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod source;

pub use discovery::{discover, is_supported};
pub use error::{FacturaError, OcrError, PdfError, RecordError, Result};
pub use invoice::{ExtractedFields, ExtractionContext, Field, HeuristicInvoiceParser, InvoiceParser};
pub use models::config::FacturaConfig;
pub use models::record::{InvoiceClass, InvoiceRecord};
pub use models::tax_id::TaxId;
pub use ocr::{RecognitionRequest, SegmentationMode, TesseractRecognizer, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::OnnxRecognizer;
pub use pdf::{PageSource, PdfDocument, PdfRenderer};
pub use source::{TextSourceResolver, is_text_valid};

use tracing::{debug, info};

/// Resolve the text of the record's document and extract its fields in place.
///
/// The record is marked invalid, with every derived field left unset, when the
/// resolved text is absent or too short to parse.
pub fn process_record<R: TextRecognizer>(
    record: &mut InvoiceRecord,
    resolver: &TextSourceResolver<R>,
    parser: &HeuristicInvoiceParser,
) {
    let text = resolver.resolve(&record.path);
    info!("Resolved {} characters from {}", text.chars().count(), record.name);
    extract_into(record, text, parser);
}

/// Extract fields from already resolved text into the record.
///
/// The raw text is always kept on the record, even when it is too short to
/// parse.
pub fn extract_into(record: &mut InvoiceRecord, text: String, parser: &HeuristicInvoiceParser) {
    if !parser.accepts(&text) {
        debug!("Text of {} is too short to parse, marking invalid", record.name);
        record.raw_text = Some(text);
        record.mark_invalid();
        return;
    }

    let fields = parser.parse(&text);
    record.raw_text = Some(text);
    record.apply(fields);
}
