//! Configuration resolution and environment override tests
//!
//! Tests that touch ZPA_* environment variables are marked #[serial] so
//! they never run concurrently with each other.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use zpa_common::config::{
    resolve_config_path, ReferenceFormat, ZpaConfig, CENSUS_API_KEY_ENV_VAR, CONFIG_ENV_VAR,
    LOGIN_PASSWORD_ENV_VAR, PORT_ENV_VAR,
};
use zpa_common::Error;

fn clear_env() {
    for var in [
        CONFIG_ENV_VAR,
        CENSUS_API_KEY_ENV_VAR,
        LOGIN_PASSWORD_ENV_VAR,
        PORT_ENV_VAR,
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/zpa-from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/zpa-from-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/zpa-from-cli.toml")));

    clear_env();
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    clear_env();
    env::set_var(CONFIG_ENV_VAR, "/tmp/zpa-from-env.toml");

    assert_eq!(
        resolve_config_path(None),
        Some(PathBuf::from("/tmp/zpa-from-env.toml"))
    );

    clear_env();
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    clear_env();

    let err = ZpaConfig::load(Some(Path::new("/nonexistent/zpa/config.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_load_from_file_then_env_overrides() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zpa.toml");
    std::fs::write(
        &path,
        r#"
        snapshot_path = "out/processed_data.json"

        [server]
        port = 8080

        [census]
        api_key = "from-file"
        batch_delay_ms = 250

        [auth]
        password = "file-password"

        [[area_names.reference]]
        path = "nyc_zip_borough_neighborhoods_pop.csv"
        format = "neighborhood"
        "#,
    )
    .unwrap();

    let config = ZpaConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.census.api_key.as_deref(), Some("from-file"));
    assert_eq!(config.census.batch_delay_ms, 250);
    assert_eq!(config.snapshot_path, PathBuf::from("out/processed_data.json"));
    assert_eq!(
        config.area_names.reference[0].format,
        ReferenceFormat::Neighborhood
    );

    env::set_var(CENSUS_API_KEY_ENV_VAR, "from-env");
    env::set_var(LOGIN_PASSWORD_ENV_VAR, "env-password");
    env::set_var(PORT_ENV_VAR, "9090");

    let config = ZpaConfig::load(Some(&path)).unwrap();
    assert_eq!(config.census.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.auth.password.as_deref(), Some("env-password"));
    assert_eq!(config.server.port, 9090);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_port_override_rejected() {
    clear_env();
    env::set_var(PORT_ENV_VAR, "not-a-port");

    let mut config = ZpaConfig::default();
    let err = config.apply_env_overrides().unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    clear_env();
}

#[test]
fn test_malformed_toml_rejected() {
    let err = ZpaConfig::from_toml_str("[server\nport = 1").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
