//! Batch command - process every invoice document in a folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use factura_core::{HeuristicInvoiceParser, InvoiceRecord, TextSourceResolver, discover, process_record};

use super::{
    CSV_HEADER, EngineArg, OutputFormat, apply_overrides, build_recognizer, csv_row, format_record, load_config,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Folder containing invoice documents
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Write one output file per document into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write summary.csv
    #[arg(long)]
    summary: bool,

    /// Recognition engine for scanned pages
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,

    /// Directory containing the ONNX models
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// A processed document and how long it took.
struct BatchResult {
    record: InvoiceRecord,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args.engine, args.model_dir.clone());

    if !args.input_dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.input_dir.display());
    }

    let files = discover(&args.input_dir);
    if files.is_empty() {
        anyhow::bail!("No invoice documents found in {}", args.input_dir.display());
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let recognizer = build_recognizer(&config)?;
    let resolver = TextSourceResolver::new(recognizer, config.source.clone());
    let parser = HeuristicInvoiceParser::from_config(&config.extraction);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let mut record = InvoiceRecord::new(path)?;
        process_record(&mut record, &resolver, &parser);

        pb.println(diagnostic_line(&record));
        results.push(BatchResult {
            record,
            processing_time_ms: file_start.elapsed().as_millis() as u64,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            let stem = result
                .record
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

            fs::write(&output_path, format_record(&result.record, args.format, false)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let valid = results.iter().filter(|r| r.record.is_valid).count();
    let invalid = results.len() - valid;

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} with fields extracted, {} without readable text",
        style(valid).green(),
        style(invalid).red()
    );

    Ok(())
}

/// One line per document: the headline fields, or why nothing was extracted.
fn diagnostic_line(record: &InvoiceRecord) -> String {
    if !record.is_valid {
        let chars = record.raw_text.as_deref().map(|t| t.trim().chars().count()).unwrap_or(0);
        return format!(
            "{} {}: only {} characters of text",
            style("✗").red(),
            record.name,
            chars
        );
    }

    let mut missing = Vec::new();
    if record.total.is_none() {
        missing.push("total");
    }
    if record.issue_date.is_none() {
        missing.push("date");
    }
    if record.issuer_tax_id.is_none() {
        missing.push("CUIT");
    }

    let total = record.total.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
    let class = record.invoice_class.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string());

    if missing.is_empty() {
        format!("{} {}: type {}, total {}", style("✓").green(), record.name, class, total)
    } else {
        format!(
            "{} {}: type {}, total {} (missing {})",
            style("⚠").yellow(),
            record.name,
            class,
            total,
            missing.join(", ")
        )
    }
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = CSV_HEADER.to_vec();
    header.push("processing_time_ms");
    wtr.write_record(&header)?;

    for result in results {
        let mut row = csv_row(&result.record);
        row.push(result.processing_time_ms.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
