//! Dataset summary statistics

use serde::Serialize;
use zpa_common::metrics::round6;
use zpa_common::Record;

/// `/api/stats` response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    pub total_zip_codes: usize,
    /// Records with a market penetration (population known and non-zero)
    pub zip_codes_with_population_data: usize,
    pub total_orders: i64,
    /// Unknown populations count as 0
    pub total_population: u64,
    pub average_market_penetration: f64,
    pub max_market_penetration: f64,
    pub min_market_penetration: f64,
    /// `None` when the population total is 0
    pub overall_market_penetration: Option<f64>,
}

/// Summarize `records`; `None` when no record has a penetration
pub fn compute_stats(records: &[Record]) -> Option<DatasetStats> {
    let penetrations: Vec<f64> = records
        .iter()
        .filter_map(|r| r.market_penetration)
        .collect();
    if penetrations.is_empty() {
        return None;
    }

    let total_orders: i64 = records.iter().map(|r| r.order_count).sum();
    let total_population: u64 = records.iter().filter_map(|r| r.population).sum();
    let sum: f64 = penetrations.iter().sum();
    let max = penetrations.iter().copied().fold(f64::MIN, f64::max);
    let min = penetrations.iter().copied().fold(f64::MAX, f64::min);

    let overall = (total_population > 0)
        .then(|| round6(total_orders as f64 / total_population as f64 * 100.0));

    Some(DatasetStats {
        total_zip_codes: records.len(),
        zip_codes_with_population_data: penetrations.len(),
        total_orders,
        total_population,
        average_market_penetration: round6(sum / penetrations.len() as f64),
        max_market_penetration: round6(max),
        min_market_penetration: round6(min),
        overall_market_penetration: overall,
    })
}
