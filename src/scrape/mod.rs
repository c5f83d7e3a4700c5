//! Scrape pipeline: one lepriximmo.fr page per year, fallback table for gaps.

pub mod table;

use std::collections::BTreeMap;
use std::io::Write;
use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::http;
use crate::settings::Settings;
use crate::sources::{fallback_price, lepriximmo_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPrice {
    pub year: i32,
    pub price_per_m2: u32,
}

/// Anything that can tell the €/m² of the target street for a year.
pub trait PriceSource {
    fn fetch_year_price(&self, year: i32) -> Option<u32>;
}

pub struct LePrixImmo {
    client: Client,
    url_template: String,
    street_match: String,
}

impl LePrixImmo {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = http::client(
            settings.connect_timeout(),
            settings.scrape_timeout(),
            &settings.user_agent,
        )?;
        Ok(LePrixImmo::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: &Settings) -> Self {
        LePrixImmo {
            client,
            url_template: settings.lepriximmo_url.clone(),
            street_match: settings.street_match.clone(),
        }
    }

    fn fetch(&self, year: i32) -> Result<u32, ScrapeError> {
        let url = lepriximmo_url(&self.url_template, year);
        debug!(year, %url, "Fetching street table");
        let body = http::get_bytes(&self.client, &url)?;
        let html = String::from_utf8_lossy(&body);
        table::street_price(&html, &self.street_match)
            .filter(|p| *p > 0)
            .ok_or(ScrapeError::NotFound)
    }
}

impl PriceSource for LePrixImmo {
    fn fetch_year_price(&self, year: i32) -> Option<u32> {
        match self.fetch(year) {
            Ok(price) => Some(price),
            Err(ScrapeError::NotFound) => {
                info!(year, "Street not listed");
                None
            }
            Err(e) => {
                warn!(year, "Scrape failed: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange {
            start: 2020,
            end: 2025,
        }
    }
}

impl YearRange {
    /// Strict `"<start>-<end>"` with `start <= end`.
    pub fn parse(raw: &str) -> Option<YearRange> {
        let (start, end) = raw.split_once('-')?;
        let start = start.trim().parse::<i32>().ok()?;
        let end = end.trim().parse::<i32>().ok()?;
        (start <= end).then_some(YearRange { start, end })
    }

    /// Like `parse`, but a bad value warns and yields the default range.
    pub fn parse_or_default(raw: &str) -> YearRange {
        YearRange::parse(raw).unwrap_or_else(|| {
            let fallback = YearRange::default();
            warn!(
                "Invalid year range format '{}', using default {}-{}",
                raw, fallback.start, fallback.end
            );
            println!(
                "⚠ Invalid year range format '{}', using default {}-{}",
                raw, fallback.start, fallback.end
            );
            fallback
        })
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }
}

/// Ask `source` for each year in order, sleeping `delay` between requests.
/// Only years with a positive price are returned.
pub fn scrape_years<S: PriceSource + ?Sized>(
    source: &S,
    range: YearRange,
    delay: Duration,
) -> BTreeMap<i32, u32> {
    let mut found = BTreeMap::new();
    for year in range.years() {
        print!("Fetching data for {}... ", year);
        let _ = std::io::stdout().flush();
        match source.fetch_year_price(year).filter(|p| *p > 0) {
            Some(price) => {
                println!("✓ €{}/m²", price);
                found.insert(year, price);
            }
            None => println!("not found"),
        }
        if year < range.end && !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    found
}

/// Scraped price where present, else the fallback table, else the default.
pub fn merge_with_fallback(range: YearRange, scraped: &BTreeMap<i32, u32>) -> Vec<YearPrice> {
    range
        .years()
        .map(|year| YearPrice {
            year,
            price_per_m2: scraped
                .get(&year)
                .copied()
                .unwrap_or_else(|| fallback_price(year)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{local_client, serve_once, UNREACHABLE};
    use std::cell::RefCell;

    struct FakeSource {
        prices: BTreeMap<i32, u32>,
        asked: RefCell<Vec<i32>>,
    }

    impl FakeSource {
        fn new(prices: &[(i32, u32)]) -> Self {
            FakeSource {
                prices: prices.iter().copied().collect(),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl PriceSource for FakeSource {
        fn fetch_year_price(&self, year: i32) -> Option<u32> {
            self.asked.borrow_mut().push(year);
            self.prices.get(&year).copied()
        }
    }

    #[test]
    fn parse_year_ranges() {
        assert_eq!(YearRange::parse("2020-2025"), Some(YearRange { start: 2020, end: 2025 }));
        assert_eq!(YearRange::parse(" 2018 - 2019 "), Some(YearRange { start: 2018, end: 2019 }));
        assert_eq!(YearRange::parse("2024-2024"), Some(YearRange { start: 2024, end: 2024 }));
        assert_eq!(YearRange::parse("2025-2020"), None);
        assert_eq!(YearRange::parse("2020"), None);
        assert_eq!(YearRange::parse("2020-2022-2024"), None);
        assert_eq!(YearRange::parse("twenty-twenty"), None);
        assert_eq!(YearRange::parse(""), None);
    }

    #[test]
    fn bad_range_falls_back_to_default() {
        assert_eq!(YearRange::parse_or_default("last year"), YearRange::default());
        assert_eq!(YearRange::parse_or_default("2021-2022"), YearRange { start: 2021, end: 2022 });
    }

    #[test]
    fn years_requested_in_ascending_order() {
        let source = FakeSource::new(&[(2021, 5200)]);
        let found = scrape_years(&source, YearRange { start: 2020, end: 2023 }, Duration::ZERO);
        assert_eq!(*source.asked.borrow(), vec![2020, 2021, 2022, 2023]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[&2021], 5200);
    }

    #[test]
    fn zero_price_counts_as_missing() {
        let source = FakeSource::new(&[(2022, 0)]);
        let found = scrape_years(&source, YearRange { start: 2022, end: 2022 }, Duration::ZERO);
        assert!(found.is_empty());
    }

    #[test]
    fn scraped_values_override_fallback() {
        let range = YearRange { start: 2024, end: 2026 };
        let scraped: BTreeMap<i32, u32> = [(2025, 5123)].into_iter().collect();
        let merged = merge_with_fallback(range, &scraped);
        assert_eq!(
            merged,
            vec![
                YearPrice { year: 2024, price_per_m2: 6400 },
                YearPrice { year: 2025, price_per_m2: 5123 },
                YearPrice { year: 2026, price_per_m2: 5100 },
            ]
        );
    }

    fn site_at(base: &str) -> LePrixImmo {
        let settings = Settings {
            lepriximmo_url: format!("{}/voies?annee={{year}}", base),
            ..Settings::default()
        };
        LePrixImmo::with_client(local_client(), &settings)
    }

    #[test]
    fn street_price_from_served_page() {
        let page = include_str!("../../tests/fixtures/lepriximmo_voies_2024.html");
        let site = site_at(&serve_once("200 OK", page.as_bytes().to_vec()));
        assert_eq!(site.fetch_year_price(2024), Some(6412));
    }

    #[test]
    fn page_without_street_price_is_none() {
        let page = include_str!("../../tests/fixtures/lepriximmo_no_price.html");
        let site = site_at(&serve_once("200 OK", page.as_bytes().to_vec()));
        assert!(matches!(site.fetch(2024), Err(ScrapeError::NotFound)));
    }

    #[test]
    fn http_error_status_is_none() {
        let site = site_at(&serve_once("503 Service Unavailable", Vec::new()));
        assert_eq!(site.fetch_year_price(2024), None);
    }

    #[test]
    fn unreachable_site_is_none() {
        let site = site_at(UNREACHABLE.trim_end_matches('/'));
        assert!(matches!(site.fetch(2024), Err(ScrapeError::Network(_))));
        assert_eq!(site.fetch_year_price(2024), None);
    }

    #[test]
    fn year_outside_table_gets_default() {
        let source = FakeSource::new(&[]);
        let range = YearRange { start: 2031, end: 2031 };
        let found = scrape_years(&source, range, Duration::ZERO);
        let merged = merge_with_fallback(range, &found);
        assert_eq!(merged, vec![YearPrice { year: 2031, price_per_m2: 5500 }]);
    }
}
