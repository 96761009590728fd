//! External lookups used while building the dataset

pub mod census_client;
pub mod population_enricher;

pub use census_client::{CensusClient, CensusError, PopulationSource};
pub use population_enricher::{BatchSettings, PopulationEnricher};
