//! Area-name update pass over a stored snapshot

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zpa_common::config::{AreaNamesConfig, ReferenceFormat, ReferenceSourceConfig};
use zpa_common::{DatasetStore, Error, Record, AREA_NAME_PLACEHOLDER};
use zpa_ingest::area_names::update_snapshot;
use zpa_ingest::AreaNameResolver;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn reference(path: PathBuf, format: ReferenceFormat, crosswalk: Option<PathBuf>) -> ReferenceSourceConfig {
    ReferenceSourceConfig {
        path,
        format,
        crosswalk,
    }
}

/// Snapshot with a stale name, a missing name and an extra key
fn seed_snapshot(store: &DatasetStore) {
    let mut chelsea = Record::new("10001");
    chelsea.area_name = Some("Manhattan Area".to_string());
    chelsea.order_count = 50;
    chelsea.population = Some(21000);
    chelsea.market_penetration = Some(0.238095);

    let mut montclair = Record::new("07042");
    montclair.extra.insert("note".to_string(), serde_json::json!("keep me"));

    store
        .save(&[chelsea, Record::new("07030"), montclair, Record::new("99999")])
        .unwrap();
}

fn config_with_references(dir: &Path) -> AreaNamesConfig {
    let nyc = write(
        dir,
        "nyc.csv",
        "zip,neighborhood,borough,post_office\n10001,Chelsea and Clinton,Manhattan,New York\n",
    );
    let nj = write(dir, "nj.csv", "ZIP Code,City,County\n07030,Hoboken,Hudson\n");
    let munis = write(
        dir,
        "munis.csv",
        "MUNICIPALITY_NAME_COMMON,COUNTY_NAME_COMMON\nMontclair,Essex\n",
    );
    let crosswalk = write(dir, "crosswalk.csv", "zip,municipality\n07042,Montclair\n");

    AreaNamesConfig {
        static_tables: None,
        reference: vec![
            reference(nyc, ReferenceFormat::Neighborhood, None),
            reference(nj, ReferenceFormat::CityCounty, None),
            reference(munis, ReferenceFormat::Municipality, Some(crosswalk)),
        ],
    }
}

#[test]
fn test_update_rewrites_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(dir.path().join("processed_data.json"));
    seed_snapshot(&store);
    let resolver = AreaNameResolver::from_config(&config_with_references(dir.path())).unwrap();

    let summary = update_snapshot(&store, &resolver).unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.placeholders, 1);

    let records = store.load().unwrap().unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| r.area_name.as_deref().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "Chelsea and Clinton",
            "Hoboken, Hudson County",
            "Montclair, Essex County",
            AREA_NAME_PLACEHOLDER,
        ]
    );
    // Only areaName is touched
    assert_eq!(records[0].market_penetration, Some(0.238095));
    assert_eq!(records[2].extra["note"], "keep me");
}

#[test]
fn test_update_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(dir.path().join("processed_data.json"));
    seed_snapshot(&store);
    let resolver = AreaNameResolver::from_config(&config_with_references(dir.path())).unwrap();

    update_snapshot(&store, &resolver).unwrap();
    let first = std::fs::read_to_string(store.path()).unwrap();
    let summary = update_snapshot(&store, &resolver).unwrap();
    let second = std::fs::read_to_string(store.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(summary.changed, 0);
}

#[test]
fn test_static_tables_only() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(dir.path().join("processed_data.json"));
    seed_snapshot(&store);
    let resolver = AreaNameResolver::from_config(&AreaNamesConfig::default()).unwrap();

    update_snapshot(&store, &resolver).unwrap();

    let records = store.load().unwrap().unwrap();
    assert_eq!(records[0].area_name.as_deref(), Some("Chelsea"));
    assert_eq!(records[3].area_name.as_deref(), Some(AREA_NAME_PLACEHOLDER));
}

#[test]
fn test_replacement_static_tables() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(dir.path().join("processed_data.json"));
    seed_snapshot(&store);
    let tables = write(
        dir.path(),
        "tables.toml",
        "version = 1\n\n[specific]\n\"99999\" = \"Test Town\"\n\n[prefixes]\n\"070\" = \"Garden State\"\n",
    );
    let config = AreaNamesConfig {
        static_tables: Some(tables),
        reference: Vec::new(),
    };
    let resolver = AreaNameResolver::from_config(&config).unwrap();

    update_snapshot(&store, &resolver).unwrap();

    let records = store.load().unwrap().unwrap();
    // 10001 has no entry in the replacement tables, so the stale name stays
    assert_eq!(records[0].area_name.as_deref(), Some("Manhattan Area"));
    assert_eq!(records[1].area_name.as_deref(), Some("Garden State Area"));
    assert_eq!(records[3].area_name.as_deref(), Some("Test Town"));
}

#[test]
fn test_missing_snapshot_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = DatasetStore::new(dir.path().join("processed_data.json"));
    let resolver = AreaNameResolver::from_config(&AreaNamesConfig::default()).unwrap();

    let err = update_snapshot(&store, &resolver).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!store.exists());
}

#[test]
fn test_missing_reference_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = AreaNamesConfig {
        static_tables: None,
        reference: vec![reference(
            dir.path().join("absent.csv"),
            ReferenceFormat::Neighborhood,
            None,
        )],
    };

    assert!(matches!(AreaNameResolver::from_config(&config), Err(Error::Io(_))));
}
