//! Configuration structures for the resolution and extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ocr::SegmentationMode;

/// Main configuration for the factura pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacturaConfig {
    /// Text source resolution configuration.
    pub source: SourceConfig,

    /// Recognition engine configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Per-page text source resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Minimum trimmed length for embedded page text to be trusted.
    pub min_native_chars: usize,

    /// Minimum share of plausible characters for embedded text (0.0 - 1.0).
    pub min_valid_ratio: f32,

    /// Scale applied to the page's point size when rendering for OCR.
    pub render_scale: f32,

    /// Language hint passed to the recognizer.
    pub language: String,

    /// Page segmentation mode used for rendered PDF pages.
    pub segmentation: SegmentationMode,

    /// Maximum pages to read per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            min_native_chars: 10,
            min_valid_ratio: 0.5,
            render_scale: 3.0,
            language: "spa".to_string(),
            segmentation: SegmentationMode::Auto,
            max_pages: 0,
        }
    }
}

/// Which recognition engine backs the OCR fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// PaddleOCR models through `pure-onnx-ocr`.
    Onnx,
    /// The `tesseract` executable.
    Tesseract,
}

/// Recognition engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine used for images and rejected PDF pages.
    pub engine: OcrEngineKind,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Path or name of the tesseract executable.
    pub tesseract_path: PathBuf,

    /// Keep `[UNK]` tokens emitted by the ONNX recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Invoice field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text must be longer than this many characters to be parsed.
    pub min_text_length: usize,

    /// Number of non-blank leading lines scanned for the issuer name.
    pub issuer_scan_lines: usize,

    /// Drop CUITs whose check digit does not verify.
    pub validate_tax_ids: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            issuer_scan_lines: 25,
            validate_tax_ids: false,
        }
    }
}

impl FacturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
