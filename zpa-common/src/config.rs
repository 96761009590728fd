//! Configuration loading and config file resolution
//!
//! Every field has a compiled default, so a missing config file is never fatal.
//! Secrets (census API key, login password) and the listen port may also be
//! supplied through environment variables, which override the TOML values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ZPA_CONFIG";
/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "zpa.toml";
/// Environment override for `census.api_key`
pub const CENSUS_API_KEY_ENV_VAR: &str = "ZPA_CENSUS_API_KEY";
/// Environment override for `auth.password`
pub const LOGIN_PASSWORD_ENV_VAR: &str = "ZPA_LOGIN_PASSWORD";
/// Environment override for `server.port`
pub const PORT_ENV_VAR: &str = "ZPA_PORT";

/// Top-level configuration (zpa.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZpaConfig {
    /// Delivery/order CSV consumed by the initial pipeline run
    pub data_csv: PathBuf,
    /// JSON snapshot of the enriched dataset
    pub snapshot_path: PathBuf,
    /// Directory of static UI assets served at `/`
    pub static_assets: PathBuf,
    pub server: ServerConfig,
    pub census: CensusConfig,
    pub auth: AuthConfig,
    pub area_names: AreaNamesConfig,
    pub logging: LoggingConfig,
}

impl Default for ZpaConfig {
    fn default() -> Self {
        Self {
            data_csv: PathBuf::from("data.csv"),
            snapshot_path: PathBuf::from("processed_data.json"),
            static_assets: PathBuf::from("public"),
            server: ServerConfig::default(),
            census: CensusConfig::default(),
            auth: AuthConfig::default(),
            area_names: AreaNamesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Census population service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    pub api_key: Option<String>,
    /// ACS endpoint, without query string
    pub base_url: String,
    pub timeout_secs: u64,
    /// Lookups issued concurrently per batch
    pub batch_size: usize,
    /// Pause between consecutive batches
    pub batch_delay_ms: u64,
    /// Optional hard cap on outbound request rate
    pub max_requests_per_second: Option<u32>,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.census.gov/data/2023/acs/acs5".to_string(),
            timeout_secs: 10,
            batch_size: 10,
            batch_delay_ms: 100,
            max_requests_per_second: None,
        }
    }
}

impl CensusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// Login gate settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Password accepted by `POST /api/login`. Login always fails when unset.
    pub password: Option<String>,
}

/// Area-name resolution sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaNamesConfig {
    /// Replacement for the compiled-in specific/prefix tables
    pub static_tables: Option<PathBuf>,
    /// Reference files, highest priority first
    pub reference: Vec<ReferenceSourceConfig>,
}

/// One reference file feeding the area-name resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSourceConfig {
    pub path: PathBuf,
    pub format: ReferenceFormat,
    /// ZIP↔municipality crosswalk, only meaningful for `municipality` sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crosswalk: Option<PathBuf>,
}

/// Column layout of a reference file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFormat {
    /// `zip`, `neighborhood`, `borough`, `post_office`
    Neighborhood,
    /// `ZIP Code`, `City`, `County`
    CityCounty,
    /// `MUNICIPALITY_NAME_COMMON`, `COUNTY_NAME_COMMON` (no ZIP column)
    Municipality,
}

impl ReferenceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceFormat::Neighborhood => "neighborhood",
            ReferenceFormat::CityCounty => "city_county",
            ReferenceFormat::Municipality => "municipality",
        }
    }
}

impl FromStr for ReferenceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "neighborhood" => Ok(ReferenceFormat::Neighborhood),
            "city_county" => Ok(ReferenceFormat::CityCounty),
            "municipality" => Ok(ReferenceFormat::Municipality),
            other => Err(Error::Config(format!(
                "Unknown reference format '{}' (expected neighborhood, city_county or municipality)",
                other
            ))),
        }
    }
}

/// Command-line form `FORMAT:PATH[:CROSSWALK]`
impl FromStr for ReferenceSourceConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let format: ReferenceFormat = parts.next().unwrap_or_default().parse()?;
        let path = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config(format!("Reference '{}' is missing a path", s)))?;
        let crosswalk = parts.next().filter(|p| !p.is_empty()).map(PathBuf::from);

        Ok(Self {
            path: PathBuf::from(path),
            format,
            crosswalk,
        })
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ZpaConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ZpaConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration following the resolution priority of
    /// [`resolve_config_path`], then apply environment overrides.
    ///
    /// An explicitly named file (CLI or environment) must exist; implicit
    /// locations fall back to compiled defaults when absent.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        let explicit = cli_arg.is_some() || std::env::var_os(CONFIG_ENV_VAR).is_some();

        let mut config = match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Read {} failed: {}", path.display(), e))
                })?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)?
            }
            Some(path) if explicit => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => {
                info!("No config file found, using compiled defaults");
                ZpaConfig::default()
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `ZPA_*` environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var(CENSUS_API_KEY_ENV_VAR) {
            if !key.trim().is_empty() {
                self.census.api_key = Some(key);
            }
        }

        if let Ok(password) = std::env::var(LOGIN_PASSWORD_ENV_VAR) {
            if !password.is_empty() {
                self.auth.password = Some(password);
            }
        }

        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            self.server.port = port.trim().parse().map_err(|_| {
                Error::Config(format!("{} is not a valid port: {}", PORT_ENV_VAR, port))
            })?;
        }

        Ok(())
    }

    /// Reject values that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        if self.census.batch_size == 0 {
            return Err(Error::Config("census.batch_size must be at least 1".to_string()));
        }
        if self.census.max_requests_per_second == Some(0) {
            return Err(Error::Config(
                "census.max_requests_per_second must be at least 1 when set".to_string(),
            ));
        }
        for source in &self.area_names.reference {
            if source.crosswalk.is_some() && source.format != ReferenceFormat::Municipality {
                warn!(
                    path = %source.path.display(),
                    "crosswalk is ignored for {} reference files",
                    source.format.as_str()
                );
            }
        }
        Ok(())
    }
}

/// Config file resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. `ZPA_CONFIG` environment variable
/// 3. `./zpa.toml` in the working directory
/// 4. `<user config dir>/zpa/config.toml`
///
/// Returns `None` when no candidate applies (compiled defaults are used).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    // Priority 4: Per-user config directory
    dirs::config_dir()
        .map(|d| d.join("zpa").join("config.toml"))
        .filter(|p| p.exists())
}
