//! Parse command - run field extraction over an existing transcription.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use factura_core::invoice::TextAssessment;
use factura_core::{HeuristicInvoiceParser, InvoiceRecord, extract_into};

use super::{OutputFormat, format_record, load_config};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file to parse ("-" reads standard input)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Drop CUITs whose check digit does not verify
    #[arg(long)]
    validate_cuit: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", args.input.display(), e))?
    };

    let parser = HeuristicInvoiceParser::from_config(&config.extraction)
        .with_tax_id_validation(config.extraction.validate_tax_ids || args.validate_cuit);

    match parser.assess(&text) {
        TextAssessment::Acceptable => {}
        assessment => info!("Text assessed as {:?}, no fields will be extracted", assessment),
    }

    let mut record = InvoiceRecord::new(&args.input)?;
    extract_into(&mut record, text, &parser);

    let output = format_record(&record, args.format, false)?;
    print!("{}", output);
    if matches!(args.format, OutputFormat::Json) {
        println!();
    }

    Ok(())
}
