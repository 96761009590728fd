//! Startup dataset loading

use tracing::{error, info};
use zpa_common::config::ZpaConfig;
use zpa_common::{DatasetStore, Record, Result};
use zpa_ingest::{ensure_dataset, DatasetSource};

/// Snapshot contents, or a freshly built dataset on first start
///
/// A freshly built dataset is saved; a failed save is logged and the
/// in-memory records are still returned.
pub async fn load_dataset(config: &ZpaConfig) -> Result<Vec<Record>> {
    let store = DatasetStore::new(&config.snapshot_path);
    let (records, source) = ensure_dataset(config, &store).await?;

    if source == DatasetSource::Pipeline {
        match store.save(&records) {
            Ok(()) => info!(path = %store.path().display(), "Saved snapshot"),
            Err(e) => error!(
                path = %store.path().display(),
                error = %e,
                "Failed to save snapshot; serving in-memory dataset"
            ),
        }
    }

    Ok(records)
}
