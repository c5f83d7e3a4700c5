//! Synthetic transactions, used only when no DVF source could be read.

use std::f64::consts::PI;

use chrono::{Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::report::{Location, Transaction};
use crate::utils::round2;

/// (year, average €/m², spread)
const BASE_PRICES: &[(i32, f64, f64)] = &[
    (2020, 5200.0, 800.0),
    (2021, 5500.0, 850.0),
    (2022, 6100.0, 900.0),
    (2023, 6400.0, 950.0),
    (2024, 6800.0, 1000.0),
    (2025, 7100.0, 1100.0),
];

const PROPERTY_TYPES: &[&str] = &["Apartment", "Studio", "2-room"];

/// 3 to 8 plausible sales per year on `location`'s street.
///
/// Price is drawn first; `price_per_m2` is recomputed from the stored
/// price and surface like a real row would be.
pub fn generate<R: Rng>(rng: &mut R, location: &Location) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    for &(year, avg, spread) in BASE_PRICES {
        let count = rng.gen_range(3..=8);
        for i in 0..count {
            let target = (avg + gauss(rng, spread / 3.0)).max(1000.0);
            let surface: i64 = rng.gen_range(50..=150);
            let price = (target * surface as f64) as i64;

            transactions.push(Transaction {
                year: year.to_string(),
                date: random_day(rng, year),
                address: format!(
                    "{} {}, {}",
                    12 + i,
                    location.street,
                    location.postal_code
                ),
                price,
                surface_m2: surface,
                price_per_m2: round2(price as f64 / surface as f64),
                property_type: PROPERTY_TYPES
                    .choose(rng)
                    .copied()
                    .unwrap_or("Apartment")
                    .to_string(),
            });
        }
    }
    transactions
}

// Box-Muller
fn gauss<R: Rng>(rng: &mut R, sigma: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn random_day<R: Rng>(rng: &mut R, year: i32) -> Option<String> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    let days = next.signed_duration_since(start).num_days() as u64;
    start
        .checked_add_days(Days::new(rng.gen_range(0..days)))
        .map(|d| d.format("%Y-%m-%d").to_string())
}
