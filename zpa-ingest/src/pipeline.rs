//! CSV → enriched dataset pipeline
//!
//! Rows become records, records get populations from the census source,
//! penetration is derived and area names are resolved. The snapshot written
//! at the end is the source of truth for every later run.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use zpa_common::config::ZpaConfig;
use zpa_common::csv_loader::{load_rows, Row};
use zpa_common::metrics::{coerce_count, coerce_f64, market_penetration};
use zpa_common::record::{DayMetric, Weekday};
use zpa_common::{DatasetStore, Error, Record, Result};

use crate::area_names::{apply_area_names, AreaNameResolver};
use crate::services::{BatchSettings, CensusClient, PopulationEnricher, PopulationSource};

const ZIP_CODE_COLUMN: &str = "ZIP_CODE";
const DELIVERY_TYPE_COLUMN: &str = "DELIVERY_TYPE";
const NET_MV_COLUMN: &str = "NET_MV";
const ORDER_COUNT_COLUMN: &str = "ORDER_COUNT";

/// Map one CSV row onto a record; `None` when the row has no ZIP
pub fn record_from_row(row: &Row) -> Option<Record> {
    let zip_code = row.get(ZIP_CODE_COLUMN)?;
    let mut record = Record::new(zip_code);
    record.delivery_type = row.get(DELIVERY_TYPE_COLUMN).unwrap_or_default().to_string();
    record.net_mv = coerce_f64(row.get(NET_MV_COLUMN));
    record.order_count = coerce_count(row.get(ORDER_COUNT_COLUMN));

    for day in Weekday::ALL {
        record.weekdays.set(
            day,
            DayMetric {
                net_mv: coerce_f64(row.get(&day.net_mv_column())),
                pct: coerce_f64(row.get(&day.pct_column())),
            },
        );
    }

    Some(record)
}

/// Build one record per ZIP, in first-seen order
///
/// A repeated ZIP replaces the earlier row's record in place. Rows without a
/// ZIP are skipped.
pub fn build_records(rows: &[Row]) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::with_capacity(rows.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, row) in rows.iter().enumerate() {
        let Some(record) = record_from_row(row) else {
            // +2: header line and 1-based numbering
            warn!(line = line + 2, "Skipping row without {}", ZIP_CODE_COLUMN);
            continue;
        };

        match positions.get(&record.zip_code) {
            Some(&index) => {
                warn!(zip = %record.zip_code, "Duplicate ZIP row, keeping the later one");
                records[index] = record;
            }
            None => {
                positions.insert(record.zip_code.clone(), records.len());
                records.push(record);
            }
        }
    }

    records
}

/// Attach populations (index-aligned with `records`) and derive penetration
pub fn apply_population(records: &mut [Record], populations: &[Option<u64>]) {
    for (record, population) in records.iter_mut().zip(populations) {
        record.population = *population;
        record.market_penetration = market_penetration(record.order_count, *population);
    }
}

/// Where the dataset handed out by [`ensure_dataset`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    /// Read from an existing snapshot
    Snapshot,
    /// Freshly produced by the pipeline; not yet saved
    Pipeline,
}

/// Population enrichment plus area-name resolution
pub struct Pipeline {
    enricher: PopulationEnricher,
    resolver: AreaNameResolver,
}

impl Pipeline {
    pub fn new(enricher: PopulationEnricher, resolver: AreaNameResolver) -> Self {
        Self { enricher, resolver }
    }

    /// Census client, batch pacing and area-name sources from configuration
    pub fn from_config(config: &ZpaConfig) -> Result<Self> {
        let client = CensusClient::new(&config.census).map_err(|e| Error::Http(e.to_string()))?;
        let source: Arc<dyn PopulationSource> = Arc::new(client);
        let enricher = PopulationEnricher::new(source, BatchSettings::from(&config.census));
        let resolver = AreaNameResolver::from_config(&config.area_names)?;
        Ok(Self::new(enricher, resolver))
    }

    /// Turn CSV rows into enriched records
    pub async fn run(&self, rows: &[Row]) -> Vec<Record> {
        let mut records = build_records(rows);
        let settings = self.enricher.settings();
        info!(
            records = records.len(),
            batch_size = settings.batch_size,
            batch_delay_ms = settings.batch_delay.as_millis() as u64,
            "Fetching population data"
        );

        let zip_codes: Vec<String> = records.iter().map(|r| r.zip_code.clone()).collect();
        let populations = self.enricher.enrich(&zip_codes).await;
        apply_population(&mut records, &populations);

        let with_population = records.iter().filter(|r| r.population.is_some()).count();
        info!(
            "Population found for {}/{} ZIP codes",
            with_population,
            records.len()
        );

        apply_area_names(&mut records, &self.resolver);
        records
    }

    /// Load `csv_path` and run the pipeline over it
    pub async fn run_file(&self, csv_path: &Path) -> Result<Vec<Record>> {
        let rows = load_rows(csv_path)?;
        Ok(self.run(&rows).await)
    }
}

/// The stored dataset, or a freshly built one when no snapshot exists
///
/// Saving a [`DatasetSource::Pipeline`] result is left to the caller, which
/// decides how fatal a failed write is.
pub async fn ensure_dataset(
    config: &ZpaConfig,
    store: &DatasetStore,
) -> Result<(Vec<Record>, DatasetSource)> {
    if let Some(records) = store.load()? {
        info!(
            path = %store.path().display(),
            "Loaded {} records from snapshot",
            records.len()
        );
        return Ok((records, DatasetSource::Snapshot));
    }

    info!(
        path = %store.path().display(),
        csv = %config.data_csv.display(),
        "No snapshot found, processing CSV"
    );
    let pipeline = Pipeline::from_config(config)?;
    let records = pipeline.run_file(&config.data_csv).await?;
    Ok((records, DatasetSource::Pipeline))
}
