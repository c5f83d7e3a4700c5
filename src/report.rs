//! The JSON report both pipelines produce, and how it reaches disk.

use std::fs::{self, Permissions};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::scrape::YearPrice;
use crate::stats::{yearly_statistics, YearlyStatistic};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub department: String,
}

/// One retained sale on the target street.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Year label of the source the row came from ("2020" for "2020_H2").
    pub year: String,
    pub date: Option<String>,
    pub address: String,
    pub price: i64,
    pub surface_m2: i64,
    pub price_per_m2: f64,
    pub property_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<S> {
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_transactions: Option<Vec<Transaction>>,
    pub yearly_statistics: Vec<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transactions: Option<usize>,
    pub data_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Report<YearlyStatistic> {
    /// Bulk variant: every transaction plus its derived yearly statistics.
    pub fn from_transactions(
        location: Location,
        transactions: Vec<Transaction>,
        data_source: &str,
    ) -> Self {
        let stats = yearly_statistics(&transactions);
        Report {
            location,
            total_transactions: Some(transactions.len()),
            all_transactions: Some(transactions),
            yearly_statistics: stats,
            data_source: data_source.to_string(),
            last_updated: None,
        }
    }
}

impl Report<YearPrice> {
    /// Scrape variant: one price per year, stamped with the generation time.
    pub fn from_year_prices(
        location: Location,
        mut prices: Vec<YearPrice>,
        data_source: &str,
        last_updated: String,
    ) -> Self {
        prices.sort_by_key(|p| p.year);
        Report {
            location,
            all_transactions: None,
            yearly_statistics: prices,
            total_transactions: None,
            data_source: data_source.to_string(),
            last_updated: Some(last_updated),
        }
    }
}

/// Local time in ISO-8601 with microseconds, e.g. `2025-03-01T10:22:31.123456`.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Serialize as pretty JSON (2-space indent, UTF-8 unescaped) and replace
/// `path` in one rename, so readers never see a half-written file.
/// The replacement keeps the permissions of the file it replaces; a new file
/// gets the usual `0644`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    if let Some(perms) = target_permissions(path) {
        tmp.as_file()
            .set_permissions(perms)
            .with_context(|| format!("Failed to set permissions for {:?}", path))?;
    }
    tmp.persist(path)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

// NamedTempFile is created 0600.
#[cfg(unix)]
fn target_permissions(path: &Path) -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(
        fs::metadata(path)
            .map(|m| m.permissions())
            .unwrap_or_else(|_| Permissions::from_mode(0o644)),
    )
}

#[cfg(not(unix))]
fn target_permissions(path: &Path) -> Option<Permissions> {
    fs::metadata(path).ok().map(|m| m.permissions())
}

pub fn print_statistics_summary(report: &Report<YearlyStatistic>) {
    println!("\nYearly Summary (Average Price/m²):");
    println!("{}", "-".repeat(40));
    for stat in &report.yearly_statistics {
        println!(
            "{}: €{:>8.2}/m² ({} tx)",
            stat.year, stat.avg_price_per_m2, stat.transaction_count
        );
    }
}

pub fn print_price_summary(report: &Report<YearPrice>) {
    println!("\n{} - Price Evolution (€/m²):", report.location.street);
    println!("{}", "-".repeat(40));
    for p in &report.yearly_statistics {
        println!("{}: €{:>6}/m²", p.year, p.price_per_m2);
    }
}
