//! zpa-ingest library interface
//!
//! Builds the enriched dataset: census population lookups, the CSV pipeline
//! and the area-name resolver with its snapshot update pass.

pub mod area_names;
pub mod pipeline;
pub mod services;

pub use crate::area_names::{AreaNameResolver, AreaNameSource, UpdateSummary};
pub use crate::pipeline::{ensure_dataset, DatasetSource, Pipeline};
pub use crate::services::{BatchSettings, CensusClient, PopulationEnricher, PopulationSource};
