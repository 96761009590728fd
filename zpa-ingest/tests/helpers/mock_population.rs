//! In-memory population source that records how it was called

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use zpa_ingest::PopulationSource;

/// Answers from a fixed table, after an optional artificial latency
#[derive(Default)]
pub struct MockPopulationSource {
    populations: HashMap<String, u64>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockPopulationSource {
    pub fn new<'a>(populations: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self {
            populations: populations
                .into_iter()
                .map(|(zip, pop)| (zip.to_string(), pop))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Highest number of lookups that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// ZIPs in the order their lookups started
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PopulationSource for MockPopulationSource {
    async fn fetch_population(&self, zip_code: &str) -> Option<u64> {
        self.calls.lock().unwrap().push(zip_code.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.populations.get(zip_code).copied()
    }
}
