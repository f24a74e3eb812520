//! Process command - extract fields from a single token file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invex_core::{COLUMNS, EXTENDED_COLUMNS, ExtractionReport, InvoiceExtractor, InvoiceRecord};

use super::{load_config, load_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Token file produced by the tokenizer (JSON document)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include PO number and shipping cost
    #[arg(long)]
    extended: bool,

    /// Show per-field outcomes and warnings
    #[arg(long)]
    show_report: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let document = load_document(&args.input).await?;
    let extractor = InvoiceExtractor::from_config(&config)?;
    let report = extractor.extract_with_report(&document);

    let output = format_record(&report.record, args.format, args.extended)?;

    if let Some(output_path) = &args.output {
        tokio::fs::write(output_path, &output).await?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_report {
        print_report(&report);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_report(report: &ExtractionReport) {
    println!();
    for (field, outcome) in &report.outcomes {
        let status = match outcome {
            invex_core::FieldOutcome::Found(_) => style("found").green(),
            invex_core::FieldOutcome::NotFound => style("not found").yellow(),
            invex_core::FieldOutcome::Error(_) => style("error").red(),
        };
        println!("  {:<18} {}", field.as_str(), status);
    }
    for warning in &report.warnings {
        println!("{} {}", style("⚠").yellow(), warning);
    }
    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        report.processing_time_ms
    );
}

pub fn format_record(
    record: &InvoiceRecord,
    format: OutputFormat,
    extended: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record), extended),
        OutputFormat::Text => Ok(format_text(record, extended)),
    }
}

/// CSV rows in the fixed column order, headed by the column names.
pub fn format_csv(records: &[InvoiceRecord], extended: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if extended {
        wtr.write_record(std::iter::once("file_name").chain(EXTENDED_COLUMNS))?;
    } else {
        wtr.write_record(std::iter::once("file_name").chain(COLUMNS))?;
    }

    for record in records {
        let file_name = std::iter::once(record.file_name.clone());
        if extended {
            wtr.write_record(file_name.chain(record.extended_columns()))?;
        } else {
            wtr.write_record(file_name.chain(record.columns()))?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord, extended: bool) -> String {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", record.file_name));
    output.push_str(&format!("Vendor: {}\n", or_dash(&record.vendor_name)));
    output.push_str(&format!("Invoice: {}\n", or_dash(&record.invoice_number)));
    if extended {
        output.push_str(&format!("PO: {}\n", or_dash(&record.po_number)));
    }
    output.push_str(&format!("Date: {}\n", or_dash(&record.invoice_date)));
    output.push('\n');

    output.push_str(&format!("Terms: {}\n", or_dash(&record.discount_terms)));
    output.push_str(&format!(
        "Discount due: {}\n",
        or_dash(&record.discount_due_date)
    ));
    output.push_str(&format!(
        "Discounted total: {}\n",
        or_dash(&record.discounted_total)
    ));
    if extended {
        output.push_str(&format!("Shipping: {}\n", or_dash(&record.shipping_cost)));
    }
    output.push_str(&format!("Total: {}\n", or_dash(&record.total_amount)));

    output
}
