//! Process command - extract data from a single invoice document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use factura_core::source::DocumentKind;
use factura_core::{HeuristicInvoiceParser, InvoiceRecord, TextSourceResolver, process_record};

use super::{EngineArg, OutputFormat, apply_overrides, build_recognizer, format_record, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input document (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Recognition engine for scanned pages
    #[arg(short, long, value_enum)]
    engine: Option<EngineArg>,

    /// Directory containing the ONNX models
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Include the resolved document text in the output
    #[arg(long)]
    include_text: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args.engine, args.model_dir.clone());

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if DocumentKind::from_path(&args.input).is_none() {
        anyhow::bail!("Unsupported file type: {}", args.input.display());
    }

    let recognizer = build_recognizer(&config)?;
    let resolver = TextSourceResolver::new(recognizer, config.source.clone());
    let parser = HeuristicInvoiceParser::from_config(&config.extraction);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?,
    );
    pb.set_message(format!("Reading {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let path = args.input.canonicalize().unwrap_or_else(|_| args.input.clone());
    let mut record = InvoiceRecord::new(path)?;
    process_record(&mut record, &resolver, &parser);

    pb.finish_and_clear();
    info!("Processed {} in {}ms", record.name, start.elapsed().as_millis());

    let output = format_record(&record, args.format, args.include_text)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if matches!(args.format, OutputFormat::Json) {
            println!();
        }
    }

    if !record.is_valid {
        eprintln!(
            "{} Not enough text could be read from {}",
            style("⚠").yellow(),
            record.name
        );
    }

    Ok(())
}
