//! Vendors command - inspect vendor master data and overrides.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invex_core::vendors::VendorCache;
use invex_core::{Field, InvoiceExtractor, VendorMatch};

use super::{load_config, load_document};

/// Arguments for the vendors command.
#[derive(Args)]
pub struct VendorsArgs {
    #[command(subcommand)]
    command: VendorsCommand,
}

#[derive(Subcommand)]
enum VendorsCommand {
    /// List known vendors and the fields they override
    List,

    /// Resolve the vendor of a token file
    Resolve {
        /// Token file produced by the tokenizer (JSON document)
        input: PathBuf,
    },
}

pub async fn run(args: VendorsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        VendorsCommand::List => {
            let cache = VendorCache::from_config(&config.vendors)?;
            list_vendors(&cache);
            Ok(())
        }
        VendorsCommand::Resolve { input } => {
            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }
            let document = load_document(&input).await?;
            let extractor = InvoiceExtractor::from_config(&config)?;
            let report = extractor.extract_with_report(&document);

            match report.vendor_match {
                Some(kind) => {
                    let how = match kind {
                        VendorMatch::Identifier => "identifier".to_string(),
                        VendorMatch::Fuzzy { score } => format!("fuzzy, score {:.3}", score),
                    };
                    println!(
                        "{} {} ({})",
                        style("✓").green(),
                        report.record.vendor_name,
                        how
                    );
                }
                None => println!("{} No vendor matched", style("⚠").yellow()),
            }
            Ok(())
        }
    }
}

fn list_vendors(cache: &VendorCache) {
    let state = cache.snapshot();

    println!("{}", style("Master data:").bold());
    if state.catalog.vendors.is_empty() {
        println!("  (none)");
    }
    for (name, number) in &state.catalog.vendors {
        println!("  {:<24} {}", name, number);
    }

    println!();
    println!("{}", style("Overrides:").bold());
    for vendor in state.registry.vendors() {
        let fields: Vec<&str> = Field::ALL
            .iter()
            .filter(|field| !state.registry.actions(vendor, **field).is_empty())
            .map(|field| field.as_str())
            .collect();
        println!("  {:<24} {}", vendor, fields.join(", "));
    }
}
