//! Census ACS population client
//!
//! Looks up the total population (`B01003_001E`) of a ZIP Code Tabulation
//! Area. Every failure degrades to "no population": gaps are expected and
//! must never abort a batch.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde_json::Value;
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::{debug, warn};
use zpa_common::config::CensusConfig;

const USER_AGENT: &str = "ZIP-Penetration-Analysis/1.0";
const POPULATION_VARIABLE: &str = "B01003_001E";

/// Census client errors
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}")]
    ApiError(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid ZIP code: {0:?}")]
    InvalidZip(String),
}

/// Anything that can answer "what is the population of this ZIP?"
///
/// Implementations never fail: unknown or unreachable lookups are `None`.
#[async_trait]
pub trait PopulationSource: Send + Sync {
    async fn fetch_population(&self, zip_code: &str) -> Option<u64>;
}

/// HTTP client for the census statistical API
pub struct CensusClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    /// Optional outbound quota on top of the batch pacing
    rate_limiter: Option<
        RateLimiter<
            governor::state::direct::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl CensusClient {
    pub fn new(config: &CensusConfig) -> Result<Self, CensusError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| CensusError::NetworkError(e.to_string()))?;

        let rate_limiter = config
            .max_requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        if config.api_key.is_none() {
            warn!("No census API key configured; anonymous requests are heavily throttled");
        }

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            rate_limiter,
        })
    }

    /// Request URL for one ZCTA
    pub fn request_url(&self, zip_code: &str) -> String {
        let mut url = format!(
            "{}?get=NAME,{}&for=zip%20code%20tabulation%20area:{}",
            self.base_url, POPULATION_VARIABLE, zip_code
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }

    /// Query the population of one ZCTA, surfacing the failure reason
    pub async fn lookup(&self, zip_code: &str) -> Result<u64, CensusError> {
        if zip_code.is_empty() || !zip_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CensusError::InvalidZip(zip_code.to_string()));
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(zip = %zip_code, "Querying census API");

        let response = self
            .http_client
            .get(self.request_url(zip_code))
            .send()
            .await
            .map_err(|e| CensusError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CensusError::ApiError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CensusError::NetworkError(e.to_string()))?;

        parse_population_payload(&body)
    }
}

#[async_trait]
impl PopulationSource for CensusClient {
    async fn fetch_population(&self, zip_code: &str) -> Option<u64> {
        match self.lookup(zip_code).await {
            Ok(population) => Some(population),
            Err(e) => {
                warn!(zip = %zip_code, error = %e, "Failed to fetch population");
                None
            }
        }
    }
}

/// Extract the population from a census response body
///
/// The body is a JSON table whose first row is the header; the population is
/// the second field of the second row, usually as a string (`"21000"`).
pub fn parse_population_payload(body: &str) -> Result<u64, CensusError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)
        .map_err(|e| CensusError::ParseError(format!("unexpected body: {}", e)))?;

    let cell = rows
        .get(1)
        .and_then(|row| row.get(1))
        .ok_or_else(|| CensusError::ParseError("response has no data row".to_string()))?;

    let population = match cell {
        Value::String(s) => parse_integer(s),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
    .ok_or_else(|| CensusError::ParseError(format!("non-numeric population {}", cell)))?;

    // The ACS encodes suppressed/unavailable estimates as large negative sentinels
    u64::try_from(population)
        .map_err(|_| CensusError::ParseError(format!("negative population {}", population)))
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_population() {
        let body = r#"[["NAME","B01003_001E","zip code tabulation area"],
                       ["ZCTA5 10001","21000","10001"]]"#;
        assert_eq!(parse_population_payload(body).unwrap(), 21000);
    }

    #[test]
    fn test_parse_numeric_population() {
        let body = r#"[["NAME","B01003_001E"],["ZCTA5 10155",0]]"#;
        assert_eq!(parse_population_payload(body).unwrap(), 0);
    }

    #[test]
    fn test_parse_short_body() {
        let body = r#"[["NAME","B01003_001E","zip code tabulation area"]]"#;
        assert!(matches!(
            parse_population_payload(body),
            Err(CensusError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_non_numeric_and_sentinel() {
        let body = r#"[["NAME","B01003_001E"],["ZCTA5 99999","N/A"]]"#;
        assert!(parse_population_payload(body).is_err());

        let body = r#"[["NAME","B01003_001E"],["ZCTA5 99999","-666666666"]]"#;
        assert!(parse_population_payload(body).is_err());
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(parse_population_payload("").is_err());
        assert!(parse_population_payload("error: unknown variable").is_err());
    }

    #[test]
    fn test_request_url() {
        let config = CensusConfig {
            api_key: Some("abc123".to_string()),
            base_url: "https://api.census.gov/data/2023/acs/acs5/".to_string(),
            ..CensusConfig::default()
        };
        let client = CensusClient::new(&config).unwrap();
        assert_eq!(
            client.request_url("10001"),
            "https://api.census.gov/data/2023/acs/acs5?get=NAME,B01003_001E\
             &for=zip%20code%20tabulation%20area:10001&key=abc123"
        );
    }

    #[tokio::test]
    async fn test_invalid_zip_degrades_without_request() {
        let client = CensusClient::new(&CensusConfig::default()).unwrap();
        assert!(matches!(
            client.lookup("10001&key=x").await,
            Err(CensusError::InvalidZip(_))
        ));
        assert_eq!(client.fetch_population("").await, None);
    }
}
