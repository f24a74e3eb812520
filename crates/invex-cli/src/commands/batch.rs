//! Batch processing command for multiple token files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use invex_core::{Document, ExtractionReport, InvoiceExtractor};

use super::process::{OutputFormat, format_csv, format_record};
use super::{load_config, load_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (0 = use config)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Include PO number and shipping cost
    #[arg(long)]
    extended: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let workers = if args.jobs > 0 {
        args.jobs
    } else {
        config.batch.workers
    };
    if workers > 0 {
        // Fails only when a pool already exists.
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
        {
            debug!("Keeping existing thread pool: {}", e);
        }
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Unreadable files stay in the batch as failed documents.
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let document = match load_document(path).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
                Document::failed(file_name(path), format!("{:#}", e))
            }
        };
        documents.push(document);
        pb.inc(1);
    }
    pb.finish_with_message("Loaded");

    let extractor = InvoiceExtractor::from_config(&config)?;
    let reports = extractor.extract_reports(&documents);

    if let Some(output_dir) = &args.output_dir {
        for (path, report) in files.iter().zip(&reports) {
            let output_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            let content = format_record(&report.record, args.format, args.extended)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &reports, args.extended)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if args.output_dir.is_none() && !args.summary {
        let records: Vec<_> = reports.iter().map(|r| r.record.clone()).collect();
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
            _ => print!("{}", format_csv(&records, args.extended)?),
        }
    }

    print_summary(&reports, start);

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn write_summary(path: &Path, reports: &[ExtractionReport], extended: bool) -> anyhow::Result<()> {
    let records: Vec<_> = reports.iter().map(|r| r.record.clone()).collect();
    fs::write(path, format_csv(&records, extended)?)?;
    Ok(())
}

fn print_summary(reports: &[ExtractionReport], start: Instant) {
    let with_warnings: Vec<_> = reports.iter().filter(|r| !r.warnings.is_empty()).collect();
    let empty = reports.iter().filter(|r| r.record.is_empty()).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        reports.len(),
        start.elapsed()
    );
    println!(
        "   {} with fields, {} empty",
        style(reports.len() - empty).green(),
        style(empty).red()
    );

    if !with_warnings.is_empty() {
        println!();
        println!("{}", style("Warnings:").yellow());
        for report in with_warnings {
            for warning in &report.warnings {
                println!("  - {}: {}", report.record.file_name, warning);
            }
        }
    }
}
