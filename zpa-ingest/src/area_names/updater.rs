//! Area-name enrichment pass over stored records

use tracing::{debug, info};
use zpa_common::{DatasetStore, Error, Record, Result, AREA_NAME_PLACEHOLDER};

use super::resolver::AreaNameResolver;

/// Progress is logged every this many records
const PROGRESS_INTERVAL: usize = 50;

/// Outcome of one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    /// Records with a name from one of the sources
    pub resolved: usize,
    /// Records whose `areaName` value changed
    pub changed: usize,
    /// Records that received the placeholder
    pub placeholders: usize,
}

/// Resolve every record's area name in place
///
/// A resolved name always overwrites. When nothing resolves, only records
/// with no name at all get the placeholder.
pub fn apply_area_names(records: &mut [Record], resolver: &AreaNameResolver) -> UpdateSummary {
    let mut summary = UpdateSummary {
        total: records.len(),
        ..Default::default()
    };

    for (index, record) in records.iter_mut().enumerate() {
        match resolver.resolve(&record.zip_code) {
            Some(resolution) => {
                summary.resolved += 1;
                if record.area_name.as_deref() != Some(resolution.area_name.as_str()) {
                    info!(
                        zip = %record.zip_code,
                        source = resolution.source,
                        "{} -> {}",
                        record.area_name.as_deref().unwrap_or("<none>"),
                        resolution.area_name
                    );
                    record.area_name = Some(resolution.area_name);
                    summary.changed += 1;
                }
            }
            None if record.area_name.is_none() => {
                debug!(zip = %record.zip_code, "No area name found");
                record.area_name = Some(AREA_NAME_PLACEHOLDER.to_string());
                summary.placeholders += 1;
                summary.changed += 1;
            }
            None => {}
        }

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            info!("Processed {}/{} records", index + 1, summary.total);
        }
    }

    summary
}

/// Reload the snapshot, resolve every area name and save it back
pub fn update_snapshot(store: &DatasetStore, resolver: &AreaNameResolver) -> Result<UpdateSummary> {
    let mut records = store.load()?.ok_or_else(|| {
        Error::InvalidInput(format!(
            "no snapshot at {}; run the pipeline first",
            store.path().display()
        ))
    })?;

    info!("Updating area names for {} records", records.len());
    let summary = apply_area_names(&mut records, resolver);
    store.save(&records)?;

    info!(
        total = summary.total,
        resolved = summary.resolved,
        changed = summary.changed,
        placeholders = summary.placeholders,
        "Area-name update complete"
    );
    Ok(summary)
}
