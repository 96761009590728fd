//! Test Helper Utilities
//!
//! Shared utilities for testing zpa-ingest

#![allow(dead_code)]

pub mod mock_population;

pub use mock_population::MockPopulationSource;
