//! DVF extraction - bulk pipeline.
//!
//! Downloads each DVF archive in turn, keeps the sales on the target street,
//! and writes transactions plus yearly €/m² statistics to the output file.
//! When no archive can be read at all, a synthetic sample is written instead.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use street_prices::dvf::{self, archive, archive::SourceRows};
use street_prices::report;
use street_prices::settings::Settings;
use street_prices::sources::{DvfSource, DVF_SOURCES};
use street_prices::utils::format_duration;
use street_prices::{http, init_tracing};

#[derive(Parser)]
#[command(name = "dvf_extraction", about = "Street price per m² from the DVF bulk dataset")]
struct Cli {
    /// Output file (default: PRICES_OUTPUT_PATH or data.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let t0 = Instant::now();

    let mut settings = Settings::load();
    if let Some(output) = cli.output {
        settings.output_path = output;
    }
    info!(settings = ?settings, "Starting DVF extraction");

    let location = settings.dvf_location();
    println!("{}", "=".repeat(60));
    println!(
        "Fetching DVF data for {}, {} {}",
        location.street, location.postal_code, location.city
    );
    println!("{}", "=".repeat(60));

    let client = match http::client(
        settings.connect_timeout(),
        settings.download_timeout(),
        &settings.user_agent,
    ) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("No HTTP client, every source will be skipped: {:#}", e);
            None
        }
    };
    let fetch = |source: &DvfSource| match &client {
        Some(c) => archive::fetch_source(c, source),
        None => SourceRows::Empty,
    };

    let report = dvf::collect(DVF_SOURCES, fetch, &settings, &mut rand::thread_rng());
    report::write_json(&settings.output_path, &report)?;

    println!("\n{}", "=".repeat(60));
    println!("✓ Data saved to {}", settings.output_path.display());
    println!(
        "✓ Total transactions: {}",
        report.total_transactions.unwrap_or_default()
    );
    println!("✓ Data source: {}", report.data_source);
    println!("{}", "=".repeat(60));
    report::print_statistics_summary(&report);

    println!("\nDone in {}", format_duration(t0.elapsed()));
    Ok(())
}
