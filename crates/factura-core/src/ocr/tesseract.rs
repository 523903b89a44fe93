//! Recognition through the `tesseract` executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::OcrError;

use super::{RecognitionRequest, Result, TextRecognizer};

/// Runs `tesseract <image> stdout -l <lang> --oem 3 --psm <mode>` per image.
///
/// The image is written to a temporary PNG first; the file is removed when
/// recognition returns.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// True when the executable answers `--version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn args(image_path: &Path, request: &RecognitionRequest) -> Vec<OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            request.language.clone().into(),
            "--oem".into(),
            "3".into(),
            "--psm".into(),
            request.segmentation.as_psm().to_string().into(),
        ]
    }

    fn process_error(&self, reason: impl Into<String>) -> OcrError {
        OcrError::Process {
            program: self.program.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage, request: &RecognitionRequest) -> Result<String> {
        let start = Instant::now();

        let temp_dir = tempfile::tempdir().map_err(|e| self.process_error(e.to_string()))?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("failed to write image: {}", e)))?;

        let output = Command::new(&self.program)
            .args(Self::args(&image_path, request))
            .output()
            .map_err(|e| self.process_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(self.process_error(format!("exit status {}", output.status)));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract returned {} characters in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}
