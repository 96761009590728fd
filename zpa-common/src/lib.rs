//! # zpa Common Library
//!
//! Shared code for the ZIP penetration analysis crates:
//! - Configuration loading
//! - The enriched `Record` model and its JSON contract
//! - CSV loading
//! - Market-penetration metrics
//! - The JSON dataset snapshot

pub mod config;
pub mod csv_loader;
pub mod error;
pub mod metrics;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use record::{Record, AREA_NAME_PLACEHOLDER};
pub use store::DatasetStore;
