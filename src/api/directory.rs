//! The injectable directory seam.
//!
//! The picker and resolver only ever see [`GeographyDirectory`], so tests
//! substitute a fixed in-memory directory for the network client, and a
//! memoizing wrapper can slot in without either side noticing.

use async_trait::async_trait;
use tracing::warn;

use crate::models::{sort_by_name, AdministrativeUnit, ProvinceRecord};

use super::ApiError;

/// Which parent a city/municipality listing hangs off. Regions without a
/// province level attach their cities directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLevel {
    Province,
    Region,
}

/// Read-only access to the administrative-geography directory service.
///
/// All four levels are listed by parent code. Implementations report
/// failures as errors; consumers degrade those to empty option lists, so
/// nothing here ever reaches the UI as a blocking failure.
#[async_trait]
pub trait GeographyDirectory: Send + Sync {
    /// All top-level regions.
    async fn list_regions(&self) -> Result<Vec<AdministrativeUnit>, ApiError>;

    /// The full provinces directory across all regions, with owning-region
    /// codes. Reverse resolution matches stored province names against this.
    async fn list_all_provinces(&self) -> Result<Vec<ProvinceRecord>, ApiError>;

    /// Provinces under one region. Empty for province-less regions.
    async fn list_provinces(&self, region_code: &str)
        -> Result<Vec<AdministrativeUnit>, ApiError>;

    /// Cities/municipalities under a province, or directly under a region
    /// when the region has no province level.
    async fn list_cities(
        &self,
        parent_code: &str,
        parent: ParentLevel,
    ) -> Result<Vec<AdministrativeUnit>, ApiError>;

    /// Barangays under one city/municipality.
    async fn list_barangays(&self, city_code: &str) -> Result<Vec<AdministrativeUnit>, ApiError>;
}

/// Degrade a directory result to a name-sorted option list.
///
/// A failed fetch is logged and becomes an empty list: the user sees an
/// empty dropdown for that level and the form stays interactive.
pub(crate) fn sorted_or_empty(
    what: &str,
    result: Result<Vec<AdministrativeUnit>, ApiError>,
) -> Vec<AdministrativeUnit> {
    match result {
        Ok(mut units) => {
            sort_by_name(&mut units);
            units
        }
        Err(e) => {
            warn!(error = %e, what = what, "Directory fetch failed, using empty list");
            Vec::new()
        }
    }
}
