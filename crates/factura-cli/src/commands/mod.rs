//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod process;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{debug, warn};

use factura_core::models::config::OcrEngineKind;
use factura_core::{FacturaConfig, InvoiceRecord, OnnxRecognizer, TesseractRecognizer, TextRecognizer};

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    #[default]
    Json,
    /// Plain text summary
    Text,
    /// CSV output
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Recognition engine selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineArg {
    /// PaddleOCR models through pure-onnx-ocr
    Onnx,
    /// The tesseract executable
    Tesseract,
}

impl From<EngineArg> for OcrEngineKind {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Onnx => OcrEngineKind::Onnx,
            EngineArg::Tesseract => OcrEngineKind::Tesseract,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factura")
        .join("config.json")
}

/// Load the configuration named with `-c`, the default file, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FacturaConfig> {
    if let Some(path) = config_path {
        let config = FacturaConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {}", path, e))?;
        return Ok(config);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(FacturaConfig::from_file(&default_path)?)
    } else {
        Ok(FacturaConfig::default())
    }
}

/// Apply `--engine` and `--model-dir` overrides.
pub fn apply_overrides(config: &mut FacturaConfig, engine: Option<EngineArg>, model_dir: Option<PathBuf>) {
    if let Some(engine) = engine {
        config.ocr.engine = engine.into();
    }
    if let Some(dir) = model_dir {
        config.ocr.model_dir = dir;
    }
}

/// Build the recognizer used for images and rejected PDF pages.
pub fn build_recognizer(config: &FacturaConfig) -> anyhow::Result<Box<dyn TextRecognizer>> {
    match config.ocr.engine {
        OcrEngineKind::Onnx => {
            let recognizer = OnnxRecognizer::from_config(&config.ocr).map_err(|e| {
                anyhow::anyhow!(
                    "{}\nPlace {}, {} and {} in {} or pass --model-dir.",
                    e,
                    config.ocr.detection_model,
                    config.ocr.recognition_model,
                    config.ocr.dictionary,
                    config.ocr.model_dir.display()
                )
            })?;
            Ok(Box::new(recognizer))
        }
        OcrEngineKind::Tesseract => {
            let recognizer = TesseractRecognizer::new(&config.ocr.tesseract_path);
            if !recognizer.is_available() {
                warn!(
                    "{} is not available; scanned pages will yield no text",
                    config.ocr.tesseract_path.display()
                );
            }
            Ok(Box::new(recognizer))
        }
    }
}

/// Render one record in the requested format.
pub fn format_record(record: &InvoiceRecord, format: OutputFormat, include_text: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            if include_text {
                Ok(serde_json::to_string_pretty(record)?)
            } else {
                let mut trimmed = record.clone();
                trimmed.raw_text = None;
                Ok(serde_json::to_string_pretty(&trimmed)?)
            }
        }
        OutputFormat::Text => {
            let mut output = record.summary();
            if let Some(text) = record.raw_text.as_deref().filter(|_| include_text) {
                output.push_str("\n--- text ---\n");
                output.push_str(text);
                output.push('\n');
            }
            Ok(output)
        }
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
    }
}

pub const CSV_HEADER: [&str; 15] = [
    "document",
    "valid",
    "invoice_class",
    "issue_date",
    "issuer_name",
    "issuer_cuit",
    "recipient_name",
    "recipient_cuit",
    "subtotal",
    "net_taxed",
    "vat",
    "other_taxes",
    "total",
    "processed_at",
    "path",
];

pub fn csv_row(record: &InvoiceRecord) -> Vec<String> {
    fn cell<T: std::fmt::Display>(value: &Option<T>) -> String {
        value.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    vec![
        record.name.clone(),
        record.is_valid.to_string(),
        cell(&record.invoice_class),
        cell(&record.issue_date),
        cell(&record.issuer_name),
        cell(&record.issuer_tax_id),
        cell(&record.recipient_name),
        cell(&record.recipient_tax_id),
        cell(&record.subtotal),
        cell(&record.net_taxed),
        cell(&record.vat),
        cell(&record.other_taxes),
        cell(&record.total),
        record.processed_at.to_rfc3339(),
        record.path.display().to_string(),
    ]
}

pub fn format_csv(records: &[InvoiceRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(csv_row(record))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
