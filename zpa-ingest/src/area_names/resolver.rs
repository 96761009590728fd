//! ZIP → area name resolution over an ordered list of sources
//!
//! Priority, highest first:
//! 1. reference tables, in configured order
//! 2. curated specific mappings
//! 3. ZIP-prefix heuristic
//!
//! Resolution depends only on the ZIP and the loaded sources, so applying it
//! twice with the same configuration gives the same names.

use tracing::info;
use zpa_common::config::AreaNamesConfig;
use zpa_common::Result;

use super::reference::load_reference_source;
use super::static_tables::{PrefixHeuristic, SpecificMappings, StaticTables};

/// A lookup that may know the area name of a ZIP
pub trait AreaNameSource: Send + Sync {
    /// Label used in logs
    fn name(&self) -> &str;

    fn resolve(&self, zip_code: &str) -> Option<String>;
}

/// A resolved name and the source that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub area_name: String,
    pub source: &'a str,
}

/// Resolver combining reference tables with the static tables
pub struct AreaNameResolver {
    direct: Vec<Box<dyn AreaNameSource>>,
    specific: SpecificMappings,
    prefixes: PrefixHeuristic,
}

impl AreaNameResolver {
    pub fn new(
        direct: Vec<Box<dyn AreaNameSource>>,
        specific: SpecificMappings,
        prefixes: PrefixHeuristic,
    ) -> Self {
        Self {
            direct,
            specific,
            prefixes,
        }
    }

    /// Only the static tables, no reference files
    pub fn from_static_tables(tables: StaticTables) -> Self {
        let (specific, prefixes) = tables.into_sources();
        Self::new(Vec::new(), specific, prefixes)
    }

    /// Load every configured source
    pub fn from_config(config: &AreaNamesConfig) -> Result<Self> {
        let tables = StaticTables::load_or_embedded(config.static_tables.as_deref())?;
        let direct = config
            .reference
            .iter()
            .map(load_reference_source)
            .collect::<Result<Vec<_>>>()?;

        let resolver = {
            let (specific, prefixes) = tables.into_sources();
            Self::new(direct, specific, prefixes)
        };
        info!("Area-name sources (priority order): {}", resolver.source_names().join(" > "));
        Ok(resolver)
    }

    /// Every source, highest priority first
    fn ordered_sources(&self) -> Vec<&dyn AreaNameSource> {
        let mut sources: Vec<&dyn AreaNameSource> = Vec::with_capacity(self.direct.len() + 2);
        for source in &self.direct {
            sources.push(&**source);
        }
        sources.push(&self.specific);
        sources.push(&self.prefixes);
        sources
    }

    /// Source names, highest priority first
    pub fn source_names(&self) -> Vec<&str> {
        self.ordered_sources()
            .into_iter()
            .map(|source| source.name())
            .collect()
    }

    /// Exact match against the loaded reference tables
    pub fn resolve_by_direct_table(&self, zip_code: &str) -> Option<String> {
        self.direct.iter().find_map(|s| s.resolve(zip_code))
    }

    /// Exact match against the curated neighborhood table
    pub fn resolve_by_specific_mapping(&self, zip_code: &str) -> Option<String> {
        self.specific.resolve(zip_code)
    }

    /// First three digits against the region table, as "<Region> Area"
    pub fn resolve_by_prefix_heuristic(&self, zip_code: &str) -> Option<String> {
        self.prefixes.resolve(zip_code)
    }

    /// Walk the sources in priority order; `None` when nothing matched
    pub fn resolve(&self, zip_code: &str) -> Option<Resolution<'_>> {
        self.ordered_sources()
            .into_iter()
            .find_map(|source| {
                source.resolve(zip_code).map(|area_name| Resolution {
                    area_name,
                    source: source.name(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area_names::reference::ZipReferenceTable;
    use zpa_common::config::ReferenceFormat;
    use zpa_common::csv_loader::Row;

    fn nyc_table() -> Box<dyn AreaNameSource> {
        Box::new(
            ZipReferenceTable::from_rows(
                "nyc",
                ReferenceFormat::Neighborhood,
                &[Row::from_pairs([("zip", "10001"), ("neighborhood", "Chelsea and Clinton")])],
            )
            .unwrap(),
        )
    }

    fn static_only() -> AreaNameResolver {
        AreaNameResolver::from_static_tables(StaticTables::embedded().unwrap())
    }

    #[test]
    fn test_specific_mapping_beats_prefix() {
        let resolver = static_only();
        let resolution = resolver.resolve("10001").unwrap();
        assert_eq!(resolution.area_name, "Chelsea");
        assert_eq!(resolution.source, "specific-mapping");
    }

    #[test]
    fn test_prefix_fallback() {
        let resolver = static_only();
        let resolution = resolver.resolve("10099").unwrap();
        assert_eq!(resolution.area_name, "Manhattan Area");
        assert_eq!(resolution.source, "prefix-heuristic");
    }

    #[test]
    fn test_no_match() {
        assert!(static_only().resolve("99999").is_none());
    }

    #[test]
    fn test_reference_table_beats_specific_mapping() {
        let (specific, prefixes) = StaticTables::embedded().unwrap().into_sources();
        let resolver = AreaNameResolver::new(vec![nyc_table()], specific, prefixes);

        assert_eq!(resolver.resolve("10001").unwrap().area_name, "Chelsea and Clinton");
        assert_eq!(resolver.resolve_by_direct_table("10001").as_deref(), Some("Chelsea and Clinton"));
        assert_eq!(resolver.resolve_by_specific_mapping("10001").as_deref(), Some("Chelsea"));
        assert_eq!(resolver.resolve_by_prefix_heuristic("10001").as_deref(), Some("Manhattan Area"));
        assert_eq!(
            resolver.source_names(),
            vec!["nyc", "specific-mapping", "prefix-heuristic"]
        );
    }

    #[test]
    fn test_first_reference_table_wins() {
        let first = ZipReferenceTable::from_rows(
            "nj-zip",
            ReferenceFormat::CityCounty,
            &[Row::from_pairs([("ZIP Code", "07030"), ("City", "Hoboken"), ("County", "Hudson")])],
        )
        .unwrap();
        let second = ZipReferenceTable::from_rows(
            "nj-other",
            ReferenceFormat::CityCounty,
            &[Row::from_pairs([("ZIP Code", "07030"), ("City", "Hoboken City"), ("County", "")])],
        )
        .unwrap();
        let (specific, prefixes) = StaticTables::embedded().unwrap().into_sources();
        let resolver =
            AreaNameResolver::new(vec![Box::new(first), Box::new(second)], specific, prefixes);

        let resolution = resolver.resolve("07030").unwrap();
        assert_eq!(resolution.area_name, "Hoboken, Hudson County");
        assert_eq!(resolution.source, "nj-zip");
    }
}
