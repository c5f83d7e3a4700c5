//! Bulk pipeline: DVF archives -> street transactions -> yearly report.

pub mod archive;
pub mod sample;
pub mod transform;

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{Rejection, SourceError};
use crate::report::{Report, Transaction};
use crate::settings::Settings;
use crate::sources::{DvfSource, DVF_DATA_SOURCE, SAMPLE_DATA_SOURCE};
use crate::stats::YearlyStatistic;
use archive::{DvfArchive, SourceRows};
use transform::{transform, StreetFilter};

const LOG_EVERY_ROWS: usize = 500_000;

/// What one source contributed.
#[derive(Debug, Default)]
pub struct SourceTally {
    pub rows: usize,
    pub rejected: HashMap<Rejection, usize>,
    pub transactions: Vec<Transaction>,
}

/// Read every row of a loaded archive and keep the ones on the target street.
pub fn extract_transactions(
    archive: &mut DvfArchive,
    year: &str,
    filter: &StreetFilter,
) -> Result<SourceTally, SourceError> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut tally = SourceTally::default();
    for row in archive.records()? {
        let record = match row {
            Ok(r) => r,
            Err(e) if e.is_io_error() => {
                pb.finish_and_clear();
                return Err(e.into());
            }
            Err(e) => {
                debug!("Unreadable row: {}", e);
                continue;
            }
        };
        tally.rows += 1;
        match transform(&record, year, filter) {
            Ok(tx) => tally.transactions.push(tx),
            Err(reason) => *tally.rejected.entry(reason).or_default() += 1,
        }
        if tally.rows % 10_000 == 0 {
            pb.set_message(format!("{} rows read", tally.rows));
            pb.tick();
        }
        if tally.rows % LOG_EVERY_ROWS == 0 {
            info!(rows = tally.rows, "Processed rows");
        }
    }
    pb.finish_and_clear();

    for (reason, n) in &tally.rejected {
        if *reason != Rejection::NotTarget {
            debug!(reason = reason.label(), count = n, "Dropped street rows");
        }
    }
    Ok(tally)
}

/// Accumulates transactions across sources, in source order.
#[derive(Debug, Default)]
pub struct Extraction {
    transactions: Vec<Transaction>,
    downloaded_any: bool,
}

impl Extraction {
    /// Fold one source in. Returns how many transactions it added, or
    /// `None` when the source produced no rows at all.
    pub fn absorb(
        &mut self,
        source: &DvfSource,
        rows: SourceRows,
        filter: &StreetFilter,
    ) -> Option<usize> {
        let SourceRows::Loaded(mut archive) = rows else {
            return None;
        };
        let tally = match extract_transactions(&mut archive, source.year(), filter) {
            Ok(t) => t,
            Err(e) => {
                warn!(source = source.label, "Skipping source: {}", e);
                return None;
            }
        };
        info!(
            source = source.label,
            member = archive.member_name(),
            rows = tally.rows,
            kept = tally.transactions.len(),
            "Source processed"
        );
        if tally.rows == 0 {
            return None;
        }
        self.downloaded_any = true;
        let kept = tally.transactions.len();
        self.transactions.extend(tally.transactions);
        Some(kept)
    }

    pub fn downloaded_any(&self) -> bool {
        self.downloaded_any
    }

    /// Real transactions if any source was read, synthetic ones otherwise.
    pub fn into_report<R: Rng>(self, settings: &Settings, rng: &mut R) -> Report<YearlyStatistic> {
        let location = settings.dvf_location();
        if self.downloaded_any {
            Report::from_transactions(location, self.transactions, DVF_DATA_SOURCE)
        } else {
            let sample = sample::generate(rng, &location);
            Report::from_transactions(location, sample, SAMPLE_DATA_SOURCE)
        }
    }
}

/// Run every source through `fetch` in order and assemble the report.
pub fn collect<F, R>(
    sources: &[DvfSource],
    mut fetch: F,
    settings: &Settings,
    rng: &mut R,
) -> Report<YearlyStatistic>
where
    F: FnMut(&DvfSource) -> SourceRows,
    R: Rng,
{
    let filter = StreetFilter::from_settings(settings);
    let mut extraction = Extraction::default();

    for source in sources {
        println!("Downloading DVF data for {}...", source.label);
        let rows = fetch(source);
        match extraction.absorb(source, rows, &filter) {
            Some(n) => println!("  ✓ Found {} transactions in {}", n, source.label),
            None => println!("  ⚠ Skipping {} (network issue or no data)", source.label),
        }
    }

    if !extraction.downloaded_any() {
        warn!("No DVF source could be read, falling back to sample data");
        println!("\n⚠ Could not download DVF data. Using realistic sample data for demo.");
        println!("To use real data, run this again or visit:");
        println!("https://www.data.gouv.fr/datasets/demandes-de-valeurs-foncieres");
    }
    extraction.into_report(settings, rng)
}
