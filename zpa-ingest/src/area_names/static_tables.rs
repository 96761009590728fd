//! Curated specific-ZIP and ZIP-prefix tables
//!
//! The tables are a versioned TOML data asset. The copy in
//! `assets/area_names.toml` is compiled in as the default; a replacement file
//! can be named in `area_names.static_tables`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use zpa_common::{Error, Result};

use super::resolver::AreaNameSource;

/// Compiled-in default tables
pub const EMBEDDED_STATIC_TABLES: &str = include_str!("../../assets/area_names.toml");

/// Highest asset format version this build understands
pub const SUPPORTED_VERSION: u32 = 1;

/// Parsed static tables asset
#[derive(Debug, Clone, Deserialize)]
pub struct StaticTables {
    pub version: u32,
    #[serde(default)]
    pub specific: HashMap<String, String>,
    #[serde(default)]
    pub prefixes: HashMap<String, String>,
}

impl StaticTables {
    /// Tables shipped with the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_STATIC_TABLES)
    }

    /// Load a replacement asset from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let tables = Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        info!(
            path = %path.display(),
            "Loaded {} specific mappings and {} prefixes",
            tables.specific.len(),
            tables.prefixes.len()
        );
        Ok(tables)
    }

    /// Embedded tables unless `path` names a replacement
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::embedded(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tables: StaticTables = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid static tables: {}", e)))?;

        if tables.version == 0 || tables.version > SUPPORTED_VERSION {
            return Err(Error::Config(format!(
                "unsupported static tables version {} (supported: {})",
                tables.version, SUPPORTED_VERSION
            )));
        }
        if let Some(key) = tables.specific.keys().find(|k| !is_digits(k, 5)) {
            return Err(Error::Config(format!(
                "specific mapping key {:?} is not a 5-digit ZIP",
                key
            )));
        }
        if let Some(key) = tables.prefixes.keys().find(|k| !is_digits(k, 3)) {
            return Err(Error::Config(format!(
                "prefix key {:?} is not a 3-digit ZIP prefix",
                key
            )));
        }

        Ok(tables)
    }

    pub fn into_sources(self) -> (SpecificMappings, PrefixHeuristic) {
        (
            SpecificMappings {
                entries: self.specific,
            },
            PrefixHeuristic {
                regions: self.prefixes,
            },
        )
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Hand-curated ZIP → neighborhood/town names
#[derive(Debug, Clone, Default)]
pub struct SpecificMappings {
    entries: HashMap<String, String>,
}

impl SpecificMappings {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AreaNameSource for SpecificMappings {
    fn name(&self) -> &str {
        "specific-mapping"
    }

    fn resolve(&self, zip_code: &str) -> Option<String> {
        self.entries.get(zip_code).cloned()
    }
}

/// First-three-digit ZIP prefix → coarse metro region
#[derive(Debug, Clone, Default)]
pub struct PrefixHeuristic {
    regions: HashMap<String, String>,
}

impl PrefixHeuristic {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl AreaNameSource for PrefixHeuristic {
    fn name(&self) -> &str {
        "prefix-heuristic"
    }

    fn resolve(&self, zip_code: &str) -> Option<String> {
        let prefix = zip_code.get(..3)?;
        self.regions
            .get(prefix)
            .map(|region| format!("{} Area", region))
    }
}
