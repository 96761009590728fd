//! Batched population lookups
//!
//! ZIPs are split into fixed-size batches. Lookups inside a batch run
//! concurrently; batches run one after another with a pause in between, so
//! at most `batch_size` requests are ever outstanding against the census API.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use zpa_common::config::CensusConfig;

use super::census_client::PopulationSource;

/// Batch pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Maximum concurrent lookups (always at least 1)
    pub batch_size: usize,
    /// Pause between consecutive batches
    pub batch_delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_millis(100),
        }
    }
}

impl From<&CensusConfig> for BatchSettings {
    fn from(config: &CensusConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
        }
    }
}

/// Population enricher with bounded concurrency
pub struct PopulationEnricher {
    source: Arc<dyn PopulationSource>,
    settings: BatchSettings,
}

impl PopulationEnricher {
    pub fn new(source: Arc<dyn PopulationSource>, settings: BatchSettings) -> Self {
        Self {
            source,
            settings: BatchSettings {
                batch_size: settings.batch_size.max(1),
                ..settings
            },
        }
    }

    pub fn settings(&self) -> BatchSettings {
        self.settings
    }

    /// Look up every ZIP; the result is index-aligned with `zip_codes`
    ///
    /// A batch is fully resolved (success or `None`) before the next batch's
    /// requests are issued.
    pub async fn enrich(&self, zip_codes: &[String]) -> Vec<Option<u64>> {
        let batch_size = self.settings.batch_size;
        let total_batches = zip_codes.len().div_ceil(batch_size);
        let mut populations = Vec::with_capacity(zip_codes.len());

        for (index, batch) in zip_codes.chunks(batch_size).enumerate() {
            let lookups = batch
                .iter()
                .map(|zip| self.source.fetch_population(zip));
            populations.extend(join_all(lookups).await);

            info!("Processed batch {}/{}", index + 1, total_batches);

            if index + 1 < total_batches && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        populations
    }
}
