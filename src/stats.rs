use std::collections::BTreeMap;

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::report::Transaction;
use crate::utils::round2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStatistic {
    pub year: i32,
    pub avg_price_per_m2: f64,
    pub min_price_per_m2: f64,
    pub max_price_per_m2: f64,
    pub transaction_count: usize,
}

/// One statistic per year that has transactions, ascending by year.
///
/// Aggregates the already-rounded `price_per_m2` values; the mean is not
/// re-derived from price and surface sums.
pub fn yearly_statistics(transactions: &[Transaction]) -> Vec<YearlyStatistic> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for tx in transactions {
        let Ok(year) = tx.year.trim().parse::<i32>() else {
            continue;
        };
        by_year.entry(year).or_default().push(tx.price_per_m2);
    }

    by_year
        .into_iter()
        .filter_map(|(year, prices)| summarize(year, &prices))
        .collect()
}

fn summarize(year: i32, prices: &[f64]) -> Option<YearlyStatistic> {
    let (min, max) = match prices.iter().copied().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(p) => (p, p),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let avg = prices.iter().sum::<f64>() / prices.len() as f64;
    Some(YearlyStatistic {
        year,
        avg_price_per_m2: round2(avg),
        min_price_per_m2: round2(min),
        max_price_per_m2: round2(max),
        transaction_count: prices.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(year: &str, ppm: f64) -> Transaction {
        Transaction {
            year: year.to_string(),
            date: None,
            address: "1 RUE BROSSOLETTE, 92400".to_string(),
            price: 0,
            surface_m2: 1,
            price_per_m2: ppm,
            property_type: "Unknown".to_string(),
        }
    }

    #[test]
    fn groups_sorted_by_year() {
        let txs = vec![tx("2023", 7000.0), tx("2021", 5000.0), tx("2023", 6000.0)];
        let stats = yearly_statistics(&txs);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].year, 2021);
        assert_eq!(stats[0].transaction_count, 1);
        assert_eq!(stats[0].min_price_per_m2, 5000.0);
        assert_eq!(stats[0].max_price_per_m2, 5000.0);
        assert_eq!(stats[1].year, 2023);
        assert_eq!(stats[1].transaction_count, 2);
        assert_eq!(stats[1].avg_price_per_m2, 6500.0);
        assert_eq!(stats[1].min_price_per_m2, 6000.0);
        assert_eq!(stats[1].max_price_per_m2, 7000.0);
    }

    #[test]
    fn mean_of_rounded_values() {
        let txs = vec![tx("2022", 5000.01), tx("2022", 5000.02), tx("2022", 5000.02)];
        let stats = yearly_statistics(&txs);
        // 15000.05 / 3 = 5000.01666..
        assert_eq!(stats[0].avg_price_per_m2, 5000.02);
        assert_eq!(stats[0].min_price_per_m2, 5000.01);
        assert_eq!(stats[0].max_price_per_m2, 5000.02);
    }

    #[test]
    fn count_matches_transactions_per_year() {
        let txs: Vec<Transaction> = (0..7)
            .map(|i| tx(if i % 2 == 0 { "2020" } else { "2024" }, 4000.0 + i as f64))
            .collect();
        let stats = yearly_statistics(&txs);
        let total: usize = stats.iter().map(|s| s.transaction_count).sum();
        assert_eq!(total, txs.len());
        assert_eq!(stats[0].transaction_count, 4);
        assert_eq!(stats[1].transaction_count, 3);
    }

    #[test]
    fn empty_input() {
        assert!(yearly_statistics(&[]).is_empty());
    }
}
