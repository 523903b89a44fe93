//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{RecognitionRequest, Result, TextBox, TextRecognizer, join_in_reading_order};

/// Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// The models are language-agnostic Latin models, so the language hint is
/// ignored; layout comes from the detector, so the segmentation mode is too.
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl OnnxRecognizer {
    /// Load detection, recognition and dictionary files named in the config.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        Self::from_files(
            &config.model_path(&config.detection_model),
            &config.model_path(&config.recognition_model),
            &config.model_path(&config.dictionary),
            config.keep_unk,
        )
    }

    /// Load the engine from explicit model paths.
    pub fn from_files(det_path: &Path, rec_path: &Path, dict_path: &Path, keep_unk: bool) -> Result<Self> {
        for path in [det_path, rec_path, dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing model file {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(det_path)
            .rec_model_path(rec_path)
            .dictionary_path(dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", det_path.display());

        Ok(Self { engine, keep_unk })
    }
}

impl TextRecognizer for OnnxRecognizer {
    fn recognize(&self, image: &DynamicImage, _request: &RecognitionRequest) -> Result<String> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Recognizing {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let count = boxes.len();
        let text = join_in_reading_order(boxes);

        info!(
            "OCR complete: {} text boxes in {}ms",
            count,
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };

        assert!(matches!(
            OnnxRecognizer::from_config(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
