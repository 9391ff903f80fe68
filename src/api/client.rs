//! API client for the PSGC administrative-geography directory service.
//!
//! This module provides the `PsgcClient` struct for fetching region,
//! province, city/municipality, and barangay listings. The directory is
//! read-only and requires no authentication.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::models::{AdministrativeUnit, ProvinceRecord};

use super::{ApiError, GeographyDirectory, ParentLevel};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the public PSGC directory API.
const DEFAULT_BASE_URL: &str = "https://psgc.gitlab.io/api";

/// Environment variable overriding the directory base URL.
const BASE_URL_ENV: &str = "PSGC_BASE_URL";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting; doubles per retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Client
// ============================================================================

/// Client for the PSGC directory service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PsgcClient {
    client: Client,
    base_url: String,
}

impl PsgcClient {
    /// Create a client against the default directory service, honoring the
    /// `PSGC_BASE_URL` override.
    pub fn new() -> anyhow::Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Create a client against an explicit directory base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Check if a response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry).
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self.client.get(url).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await.map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(
                        url = url,
                        retry = retries,
                        backoff_ms = backoff_ms,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl GeographyDirectory for PsgcClient {
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let url = format!("{}/regions/", self.base_url);
        let raw: Vec<UnitRaw> = self.get(&url).await?;
        debug!(count = raw.len(), "Regions fetched");
        Ok(raw.into_iter().map(UnitRaw::into_unit).collect())
    }

    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError> {
        let url = format!("{}/provinces/", self.base_url);
        let raw: Vec<ProvinceRaw> = self.get(&url).await?;
        debug!(count = raw.len(), "Provinces directory fetched");
        Ok(raw.into_iter().map(ProvinceRaw::into_record).collect())
    }

    async fn list_provinces(
        &self,
        region_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let url = format!("{}/regions/{}/provinces/", self.base_url, region_code);
        let raw: Vec<UnitRaw> = self.get(&url).await?;
        debug!(region = region_code, count = raw.len(), "Region provinces fetched");
        Ok(raw.into_iter().map(UnitRaw::into_unit).collect())
    }

    async fn list_cities(
        &self,
        parent_code: &str,
        parent: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let url = match parent {
            ParentLevel::Province => format!(
                "{}/provinces/{}/cities-municipalities/",
                self.base_url, parent_code
            ),
            ParentLevel::Region => format!(
                "{}/regions/{}/cities-municipalities/",
                self.base_url, parent_code
            ),
        };
        let raw: Vec<UnitRaw> = self.get(&url).await?;
        debug!(parent = parent_code, count = raw.len(), "Cities fetched");
        Ok(raw.into_iter().map(UnitRaw::into_unit).collect())
    }

    async fn list_barangays(&self, city_code: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let url = format!(
            "{}/cities-municipalities/{}/barangays/",
            self.base_url, city_code
        );
        let raw: Vec<UnitRaw> = self.get(&url).await?;
        debug!(city = city_code, count = raw.len(), "Barangays fetched");
        Ok(raw.into_iter().map(UnitRaw::into_unit).collect())
    }
}

// Internal API response types for parsing

#[derive(Debug, Deserialize)]
struct UnitRaw {
    code: String,
    name: String,
}

impl UnitRaw {
    fn into_unit(self) -> AdministrativeUnit {
        AdministrativeUnit {
            code: self.code,
            name: self.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProvinceRaw {
    code: String,
    name: String,
    #[serde(rename = "regionCode")]
    region_code: String,
}

impl ProvinceRaw {
    fn into_record(self) -> ProvinceRecord {
        ProvinceRecord {
            code: self.code,
            name: self.name,
            region_code: self.region_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_listing() {
        let json = r#"[
            {"code":"130000000","name":"National Capital Region","regionName":"NCR","islandGroupCode":"luzon"},
            {"code":"040000000","name":"Calabarzon","regionName":"Region IV-A","islandGroupCode":"luzon"}
        ]"#;

        let raw: Vec<UnitRaw> = serde_json::from_str(json).expect("Failed to parse region JSON");
        assert_eq!(raw.len(), 2);

        let units: Vec<AdministrativeUnit> = raw.into_iter().map(UnitRaw::into_unit).collect();
        assert_eq!(units[0].code, "130000000");
        assert_eq!(units[0].name, "National Capital Region");
    }

    #[test]
    fn test_parse_province_listing_with_region_code() {
        let json = r#"[
            {"code":"045800000","name":"Rizal","regionCode":"040000000","islandGroupCode":"luzon"},
            {"code":"042100000","name":"Cavite","regionCode":"040000000","islandGroupCode":"luzon"}
        ]"#;

        let raw: Vec<ProvinceRaw> =
            serde_json::from_str(json).expect("Failed to parse province JSON");
        let records: Vec<ProvinceRecord> =
            raw.into_iter().map(ProvinceRaw::into_record).collect();
        assert_eq!(records[0].name, "Rizal");
        assert_eq!(records[0].region_code, "040000000");
        assert_eq!(records[0].unit().code, "045800000");
    }

    #[test]
    fn test_parse_city_listing_ignores_extra_fields() {
        let json = r#"[
            {"code":"137402000","name":"Marikina City","oldName":"Marikina","isCapital":false,"districtCode":false,"provinceCode":false,"regionCode":"130000000"},
            {"code":"045815000","name":"Tanay","oldName":"","isCapital":false,"provinceCode":"045800000","regionCode":"040000000"}
        ]"#;

        let raw: Vec<UnitRaw> = serde_json::from_str(json).expect("Failed to parse city JSON");
        let units: Vec<AdministrativeUnit> = raw.into_iter().map(UnitRaw::into_unit).collect();
        assert_eq!(units[0].name, "Marikina City");
        assert_eq!(units[1].code, "045815000");
    }

    #[test]
    fn test_parse_barangay_listing() {
        let json = r#"[
            {"code":"137402009","name":"Malanday","oldName":"","cityCode":"137402000","municipalityCode":false}
        ]"#;

        let raw: Vec<UnitRaw> =
            serde_json::from_str(json).expect("Failed to parse barangay JSON");
        assert_eq!(raw[0].code, "137402009");
        assert_eq!(raw[0].name, "Malanday");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PsgcClient::with_base_url("https://example.test/api/").unwrap();
        assert_eq!(client.base_url, "https://example.test/api");
    }
}
