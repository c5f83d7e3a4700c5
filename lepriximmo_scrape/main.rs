//! LePrixImmo scrape - fallback pipeline.
//!
//! Reads the street table of lepriximmo.fr once per year of the requested
//! range, fills the gaps from the static fallback table, and writes one
//! €/m² figure per year to the output file.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use street_prices::report::{self, Report};
use street_prices::scrape::{self, LePrixImmo, YearRange};
use street_prices::settings::Settings;
use street_prices::sources::LEPRIXIMMO_DATA_SOURCE;
use street_prices::utils::format_duration;
use street_prices::init_tracing;

#[derive(Parser)]
#[command(name = "lepriximmo_scrape", about = "Street price per m² scraped from lepriximmo.fr")]
struct Cli {
    /// Years to fetch, as "<start>-<end>"
    #[arg(default_value = "2020-2025")]
    year_range: String,
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
    let range = YearRange::parse_or_default(&cli.year_range);
    info!(settings = ?settings, start = range.start, end = range.end, "Starting scrape");

    let location = settings.scrape_location();
    println!("{}", "=".repeat(60));
    println!("Fetching {} data from LePrixImmo.fr", location.street);
    println!("Years: {} to {}", range.start, range.end);
    println!("{}\n", "=".repeat(60));

    let scraped = match LePrixImmo::new(&settings) {
        Ok(site) => scrape::scrape_years(&site, range, settings.scrape_delay()),
        Err(e) => {
            warn!("No HTTP client, using fallback prices only: {:#}", e);
            Default::default()
        }
    };

    println!();
    if scraped.is_empty() {
        println!("⚠ No data scraped, using estimated values");
    } else {
        println!("✓ Successfully fetched data from LePrixImmo.fr");
    }
    let total_years = range.years().count();
    println!(
        "  {} year(s) scraped, {} from fallback table\n",
        scraped.len(),
        total_years - scraped.len()
    );

    let prices = scrape::merge_with_fallback(range, &scraped);
    let report = Report::from_year_prices(
        location,
        prices,
        LEPRIXIMMO_DATA_SOURCE,
        report::timestamp_now(),
    );
    report::write_json(&settings.output_path, &report)?;

    println!("{}", "=".repeat(60));
    println!("✓ Data saved to {}", settings.output_path.display());
    println!("✓ Data source: {}", report.data_source);
    println!("{}", "=".repeat(60));
    report::print_price_summary(&report);

    println!("\nDone in {}", format_duration(t0.elapsed()));
    Ok(())
}
