//! Reference tables loaded from CSV files
//!
//! Two shapes exist. ZIP-keyed tables answer lookups directly. Municipality
//! tables have no ZIP column and only become usable once joined with a
//! ZIP↔municipality crosswalk; without one their entries are inert.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use zpa_common::config::{ReferenceFormat, ReferenceSourceConfig};
use zpa_common::csv_loader::{load_rows, Row};
use zpa_common::{Error, Result};

use super::resolver::AreaNameSource;

/// ZIP-keyed reference table
#[derive(Debug, Clone)]
pub struct ZipReferenceTable {
    name: String,
    entries: HashMap<String, String>,
}

impl ZipReferenceTable {
    /// Build from parsed rows; later rows overwrite earlier ones
    ///
    /// `format` must be `Neighborhood` or `CityCounty`.
    pub fn from_rows(name: impl Into<String>, format: ReferenceFormat, rows: &[Row]) -> Result<Self> {
        let label_for: fn(&Row) -> Option<(String, String)> = match format {
            ReferenceFormat::Neighborhood => neighborhood_entry,
            ReferenceFormat::CityCounty => city_county_entry,
            ReferenceFormat::Municipality => {
                return Err(Error::InvalidInput(
                    "municipality files have no ZIP column; use MunicipalityTable".to_string(),
                ))
            }
        };

        let entries = rows.iter().filter_map(label_for).collect();
        Ok(Self {
            name: name.into(),
            entries,
        })
    }

    pub fn load(path: &Path, format: ReferenceFormat) -> Result<Self> {
        let rows = load_rows(path)?;
        let table = Self::from_rows(path.display().to_string(), format, &rows)?;
        info!(
            path = %path.display(),
            format = format.as_str(),
            "Loaded {} ZIP codes",
            table.len()
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AreaNameSource for ZipReferenceTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, zip_code: &str) -> Option<String> {
        self.entries.get(zip_code).cloned()
    }
}

/// `zip` → first non-empty of `neighborhood`, `borough`, `post_office`
fn neighborhood_entry(row: &Row) -> Option<(String, String)> {
    let zip = row.get("zip")?;
    let label = row
        .get("neighborhood")
        .or_else(|| row.get("borough"))
        .or_else(|| row.get("post_office"))?;
    Some((zip.to_string(), label.to_string()))
}

/// `ZIP Code` → "City, County County" (or just "City")
fn city_county_entry(row: &Row) -> Option<(String, String)> {
    let zip = row.get("ZIP Code")?;
    let city = row.get("City")?;
    Some((zip.to_string(), with_county(city, row.get("County"))))
}

fn with_county(place: &str, county: Option<&str>) -> String {
    match county {
        Some(county) => format!("{}, {} County", place, county),
        None => place.to_string(),
    }
}

/// Municipality and county names as they appear in the source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Municipality {
    pub municipality: String,
    pub county: String,
}

/// Municipality-keyed reference table with an optional ZIP crosswalk
#[derive(Debug, Clone)]
pub struct MunicipalityTable {
    name: String,
    /// Keyed by lowercased municipality name
    municipalities: HashMap<String, Municipality>,
    /// ZIP → lowercased municipality name
    crosswalk: Option<HashMap<String, String>>,
}

impl MunicipalityTable {
    /// Build from `MUNICIPALITY_NAME_COMMON` / `COUNTY_NAME_COMMON` rows
    pub fn from_rows(name: impl Into<String>, rows: &[Row]) -> Self {
        let municipalities = rows
            .iter()
            .filter_map(|row| {
                let municipality = row.get("MUNICIPALITY_NAME_COMMON")?;
                let county = row.get("COUNTY_NAME_COMMON")?;
                Some((
                    municipality.to_lowercase(),
                    Municipality {
                        municipality: municipality.to_string(),
                        county: county.to_string(),
                    },
                ))
            })
            .collect();

        Self {
            name: name.into(),
            municipalities,
            crosswalk: None,
        }
    }

    /// Attach a crosswalk built from `zip` / `municipality` rows
    pub fn with_crosswalk(mut self, rows: &[Row]) -> Self {
        let crosswalk = rows
            .iter()
            .filter_map(|row| {
                let zip = row.get("zip")?;
                let municipality = row.get("municipality")?;
                Some((zip.to_string(), municipality.to_lowercase()))
            })
            .collect();
        self.crosswalk = Some(crosswalk);
        self
    }

    pub fn load(path: &Path, crosswalk: Option<&Path>) -> Result<Self> {
        let rows = load_rows(path)?;
        let mut table = Self::from_rows(path.display().to_string(), &rows);
        info!(
            path = %path.display(),
            "Loaded {} municipalities",
            table.municipality_count()
        );

        match crosswalk {
            Some(crosswalk_path) => {
                let crosswalk_rows = load_rows(crosswalk_path)?;
                table = table.with_crosswalk(&crosswalk_rows);
                info!(
                    path = %crosswalk_path.display(),
                    "Joined municipality table with {} crosswalk ZIPs",
                    table.crosswalk.as_ref().map_or(0, HashMap::len)
                );
            }
            None => warn!(
                path = %path.display(),
                "Municipality table has no ZIP crosswalk; its entries cannot answer ZIP lookups"
            ),
        }

        Ok(table)
    }

    pub fn municipality_count(&self) -> usize {
        self.municipalities.len()
    }

    /// Loaded but unusable for ZIP lookups
    pub fn is_inert(&self) -> bool {
        self.crosswalk.is_none()
    }

    pub fn municipality(&self, name: &str) -> Option<&Municipality> {
        self.municipalities.get(&name.to_lowercase())
    }
}

impl AreaNameSource for MunicipalityTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, zip_code: &str) -> Option<String> {
        let key = self.crosswalk.as_ref()?.get(zip_code)?;
        let entry = self.municipalities.get(key)?;
        Some(with_county(&entry.municipality, Some(&entry.county)))
    }
}

/// Load one configured reference source
pub fn load_reference_source(config: &ReferenceSourceConfig) -> Result<Box<dyn AreaNameSource>> {
    let source: Box<dyn AreaNameSource> = match config.format {
        ReferenceFormat::Municipality => Box::new(MunicipalityTable::load(
            &config.path,
            config.crosswalk.as_deref(),
        )?),
        format => Box::new(ZipReferenceTable::load(&config.path, format)?),
    };
    Ok(source)
}
