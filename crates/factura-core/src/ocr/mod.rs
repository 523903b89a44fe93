//! Text recognition for rendered pages and image documents.

#[cfg(feature = "native")]
mod pure_engine;
mod tesseract;

#[cfg(feature = "native")]
pub use pure_engine::OnnxRecognizer;
pub use tesseract::TesseractRecognizer;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// How the recognizer should segment the page into text blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// Fully automatic layout analysis.
    #[default]
    Auto,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// A single uniform block of text.
    SingleBlock,
    /// As much text as possible, in no particular order.
    SparseText,
}

impl SegmentationMode {
    /// Tesseract page segmentation mode number.
    pub fn as_psm(&self) -> u8 {
        match self {
            SegmentationMode::Auto => 3,
            SegmentationMode::SingleColumn => 4,
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::SparseText => 11,
        }
    }
}

/// Hints passed along with an image to recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionRequest {
    /// Language hint, e.g. `spa`.
    pub language: String,
    pub segmentation: SegmentationMode,
}

impl RecognitionRequest {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            segmentation: SegmentationMode::Auto,
        }
    }

    pub fn with_segmentation(mut self, segmentation: SegmentationMode) -> Self {
        self.segmentation = segmentation;
        self
    }
}

impl Default for RecognitionRequest {
    fn default() -> Self {
        Self::new("spa")
    }
}

/// An engine that turns an image into text.
pub trait TextRecognizer {
    /// Recognize the text in an image.
    fn recognize(&self, image: &DynamicImage, request: &RecognitionRequest) -> Result<String>;

    /// Engine name for diagnostics.
    fn name(&self) -> &'static str;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn recognize(&self, image: &DynamicImage, request: &RecognitionRequest) -> Result<String> {
        (**self).recognize(image, request)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A recognized text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right) and join them.
///
/// Boxes whose tops fall in the same 20 px band count as one row; a row is
/// joined with spaces and rows with newlines.
pub fn join_in_reading_order(mut boxes: Vec<TextBox>) -> String {
    let row_of = |b: &TextBox| (b.rect().1 / 20.0) as i32;

    boxes.sort_by(|a, b| {
        row_of(a)
            .cmp(&row_of(b))
            .then_with(|| a.rect().0.total_cmp(&b.rect().0))
    });

    let mut lines: Vec<(i32, Vec<&str>)> = Vec::new();
    for b in &boxes {
        let text = b.text.trim();
        if text.is_empty() {
            continue;
        }
        let row = row_of(b);
        match lines.last_mut() {
            Some((last_row, words)) if *last_row == row => words.push(text),
            _ => lines.push((row, vec![text])),
        }
    }

    lines
        .into_iter()
        .map(|(_, words)| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 12.0, x, y + 12.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_psm_numbers() {
        assert_eq!(SegmentationMode::Auto.as_psm(), 3);
        assert_eq!(SegmentationMode::SingleBlock.as_psm(), 6);
        assert_eq!(SegmentationMode::default(), SegmentationMode::Auto);
    }

    #[test]
    fn test_segmentation_serde_names() {
        let json = serde_json::to_string(&SegmentationMode::SparseText).unwrap();
        assert_eq!(json, "\"sparse_text\"");
    }

    #[test]
    fn test_default_request_is_spanish_auto() {
        let request = RecognitionRequest::default();
        assert_eq!(request.language, "spa");
        assert_eq!(request.segmentation, SegmentationMode::Auto);
    }

    #[test]
    fn test_reading_order_join() {
        let boxes = vec![
            text_box(300.0, 105.0, "$ 1.210,00"),
            text_box(10.0, 10.0, "FACTURA A"),
            text_box(10.0, 101.0, "Total"),
            text_box(10.0, 40.0, "  "),
        ];

        assert_eq!(join_in_reading_order(boxes), "FACTURA A\nTotal $ 1.210,00");
    }
}
