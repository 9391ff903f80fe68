//! Memoizing wrapper over a directory implementation.
//!
//! Directory listings are immutable for the lifetime of a selection
//! context, so repeated fetches for the same parent code can be served
//! from memory without changing observable behavior. Only successful
//! responses are kept; a failed fetch passes through uncached so a later
//! attempt can still recover.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::models::{AdministrativeUnit, ProvinceRecord};

use super::{ApiError, GeographyDirectory, ParentLevel};

/// Transparent memo keyed by parent code over an inner directory.
pub struct CachingDirectory<D> {
    inner: D,
    units: Mutex<HashMap<String, Vec<AdministrativeUnit>>>,
    provinces_directory: Mutex<Option<Vec<ProvinceRecord>>>,
}

impl<D> CachingDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            units: Mutex::new(HashMap::new()),
            provinces_directory: Mutex::new(None),
        }
    }

    fn lookup(&self, key: &str) -> Option<Vec<AdministrativeUnit>> {
        let hit = self.units.lock().expect("cache lock poisoned").get(key).cloned();
        if hit.is_some() {
            debug!(key = key, "Directory cache hit");
        }
        hit
    }

    fn store(&self, key: String, units: &[AdministrativeUnit]) {
        self.units
            .lock()
            .expect("cache lock poisoned")
            .insert(key, units.to_vec());
    }
}

#[async_trait]
impl<D: GeographyDirectory> GeographyDirectory for CachingDirectory<D> {
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let key = "regions".to_string();
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let units = self.inner.list_regions().await?;
        self.store(key, &units);
        Ok(units)
    }

    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError> {
        if let Some(ref hit) = *self
            .provinces_directory
            .lock()
            .expect("cache lock poisoned")
        {
            debug!("Provinces directory cache hit");
            return Ok(hit.clone());
        }
        let records = self.inner.list_all_provinces().await?;
        *self
            .provinces_directory
            .lock()
            .expect("cache lock poisoned") = Some(records.clone());
        Ok(records)
    }

    async fn list_provinces(
        &self,
        region_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let key = format!("provinces:{}", region_code);
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let units = self.inner.list_provinces(region_code).await?;
        self.store(key, &units);
        Ok(units)
    }

    async fn list_cities(
        &self,
        parent_code: &str,
        parent: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError> {
        // Parent level is part of the key: province and region code spaces
        // are distinct, but a collision here would be silent.
        let key = match parent {
            ParentLevel::Province => format!("cities:province:{}", parent_code),
            ParentLevel::Region => format!("cities:region:{}", parent_code),
        };
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let units = self.inner.list_cities(parent_code, parent).await?;
        self.store(key, &units);
        Ok(units)
    }

    async fn list_barangays(&self, city_code: &str) -> Result<Vec<AdministrativeUnit>, ApiError> {
        let key = format!("barangays:{}", city_code);
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let units = self.inner.list_barangays(city_code).await?;
        self.store(key, &units);
        Ok(units)
    }
}
