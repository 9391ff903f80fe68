//! In-memory directory fixtures for tests.
//!
//! `StaticDirectory` stands in for the network client so hierarchy and
//! resolution behavior can be exercised against a fixed directory.
//! Listings are returned in insertion order on purpose: consumers are
//! responsible for sorting, and the fixtures insert out of order to prove
//! they do.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use crate::api::{ApiError, GeographyDirectory, ParentLevel};
use crate::models::{AdministrativeUnit, ProvinceRecord};

/// Route crate logs to the test writer. Use RUST_LOG to turn them on;
/// repeated calls are fine.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct StaticDirectory {
    regions: Vec<AdministrativeUnit>,
    provinces_by_region: HashMap<String, Vec<ProvinceRecord>>,
    cities_by_province: HashMap<String, Vec<AdministrativeUnit>>,
    cities_by_region: HashMap<String, Vec<AdministrativeUnit>>,
    barangays_by_city: HashMap<String, Vec<AdministrativeUnit>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, code: &str, name: &str) -> Self {
        self.regions.push(AdministrativeUnit::new(code, name));
        self
    }

    pub fn province(mut self, region_code: &str, code: &str, name: &str) -> Self {
        self.provinces_by_region
            .entry(region_code.to_string())
            .or_default()
            .push(ProvinceRecord {
                code: code.to_string(),
                name: name.to_string(),
                region_code: region_code.to_string(),
            });
        self
    }

    pub fn city_under_province(mut self, province_code: &str, code: &str, name: &str) -> Self {
        self.cities_by_province
            .entry(province_code.to_string())
            .or_default()
            .push(AdministrativeUnit::new(code, name));
        self
    }

    pub fn city_under_region(mut self, region_code: &str, code: &str, name: &str) -> Self {
        self.cities_by_region
            .entry(region_code.to_string())
            .or_default()
            .push(AdministrativeUnit::new(code, name));
        self
    }

    pub fn barangay(mut self, city_code: &str, code: &str, name: &str) -> Self {
        self.barangays_by_city
            .entry(city_code.to_string())
            .or_default()
            .push(AdministrativeUnit::new(code, name));
        self
    }
}

#[async_trait]
impl GeographyDirectory for StaticDirectory {
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Ok(self.regions.clone())
    }

    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError> {
        Ok(self
            .provinces_by_region
            .values()
            .flat_map(|records| records.iter().cloned())
            .collect())
    }

    async fn list_provinces(
        &self,
        region_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Ok(self
            .provinces_by_region
            .get(region_code)
            .map(|records| records.iter().map(ProvinceRecord::unit).collect())
            .unwrap_or_default())
    }

    async fn list_cities(
        &self,
        parent_code: &str,
        parent: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let map = match parent {
            ParentLevel::Province => &self.cities_by_province,
            ParentLevel::Region => &self.cities_by_region,
        };
        Ok(map.get(parent_code).cloned().unwrap_or_default())
    }

    async fn list_barangays(&self, city_code: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Ok(self.barangays_by_city.get(city_code).cloned().unwrap_or_default())
    }
}

/// A directory with one province-bearing region and one capital-style region
/// whose cities attach directly. Listings are deliberately unsorted.
pub fn sample_directory() -> StaticDirectory {
    StaticDirectory::new()
        .region("040000000", "Calabarzon")
        .region("130000000", "National Capital Region")
        .province("040000000", "045800000", "Rizal")
        .province("040000000", "042100000", "Cavite")
        .city_under_province("045800000", "045815000", "Tanay")
        .city_under_province("045800000", "045801000", "Angono")
        .city_under_province("042100000", "042106000", "Dasmariñas")
        .city_under_region("130000000", "137402000", "Marikina City")
        .city_under_region("130000000", "137404000", "Quezon City")
        .barangay("045815000", "045815018", "Sampaloc")
        .barangay("045815000", "045815004", "Cayabu")
        .barangay("137402000", "137402009", "Malanday")
        .barangay("137402000", "137402012", "Concepcion Uno")
}

/// Counts every call that reaches the inner directory.
pub struct CountingDirectory<D> {
    inner: D,
    calls: AtomicUsize,
}

impl<D> CountingDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<D: GeographyDirectory> GeographyDirectory for CountingDirectory<D> {
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError> {
        self.tick();
        self.inner.list_regions().await
    }

    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError> {
        self.tick();
        self.inner.list_all_provinces().await
    }

    async fn list_provinces(
        &self,
        region_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        self.tick();
        self.inner.list_provinces(region_code).await
    }

    async fn list_cities(
        &self,
        parent_code: &str,
        parent: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        self.tick();
        self.inner.list_cities(parent_code, parent).await
    }

    async fn list_barangays(&self, city_code: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        self.tick();
        self.inner.list_barangays(city_code).await
    }
}

/// Fails every call, for degradation tests.
pub struct FailingDirectory;

impl FailingDirectory {
    fn err() -> ApiError {
        ApiError::ServerError("directory unavailable".to_string())
    }
}

#[async_trait]
impl GeographyDirectory for FailingDirectory {
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Err(Self::err())
    }

    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError> {
        Err(Self::err())
    }

    async fn list_provinces(&self, _: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Err(Self::err())
    }

    async fn list_cities(
        &self,
        _: &str,
        _: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Err(Self::err())
    }

    async fn list_barangays(&self, _: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        Err(Self::err())
    }
}
