//! Reverse resolution: from a stored string back to directory codes.
//!
//! Decoding a canonical string yields names only; the directory is the
//! sole source of codes, so reconstruction walks it level by level. A
//! stored address that no longer maps onto the directory (renamed or
//! merged units, free-typed historical data) resolves to whatever partial
//! state is reachable - never an error.

use futures::future;
use tracing::{debug, warn};

use crate::api::{sorted_or_empty, GeographyDirectory, ParentLevel};
use crate::models::{find_by_name, AdministrativeUnit, ParsedFragments, ProvinceRecord};
use crate::utils::{eq_ignore_case, has_marker, strip_marker};

use super::state::HierarchySelection;

/// A reconstructed selection plus the option lists the dropdowns need.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLocation {
    pub selection: HierarchySelection,
    pub regions: Vec<AdministrativeUnit>,
    pub provinces: Vec<AdministrativeUnit>,
    pub cities: Vec<AdministrativeUnit>,
    pub barangays: Vec<AdministrativeUnit>,
}

/// Resolve decoded fragments against the directory.
///
/// The initial regions + provinces-directory pair is the only concurrent
/// fetch; every later step depends on the previous result and runs
/// sequentially.
pub async fn resolve(
    directory: &dyn GeographyDirectory,
    fragments: &ParsedFragments,
) -> ResolvedLocation {
    let mut resolved = ResolvedLocation::default();

    if fragments.remote {
        resolved.selection.is_remote = true;
        return resolved;
    }

    let (regions, provinces_directory) =
        future::join(directory.list_regions(), directory.list_all_provinces()).await;
    resolved.regions = sorted_or_empty("regions", regions);
    let provinces_directory = match provinces_directory {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Provinces directory fetch failed, using empty list");
            Vec::new()
        }
    };

    if let Some(province_name) = fragments.province.as_deref() {
        let matched = provinces_directory
            .iter()
            .find(|record| eq_ignore_case(&record.name, province_name));
        if let Some(record) = matched {
            return resolve_under_province(directory, fragments, record, resolved).await;
        }
        debug!(province = province_name, "No province match, trying direct region resolution");
    }

    resolve_under_direct_region(directory, fragments, resolved).await
}

/// The province-bearing path: owning region, province dropdown, then city
/// and barangay matches underneath.
async fn resolve_under_province(
    directory: &dyn GeographyDirectory,
    fragments: &ParsedFragments,
    record: &ProvinceRecord,
    mut resolved: ResolvedLocation,
) -> ResolvedLocation {
    match resolved.regions.iter().find(|r| r.code == record.region_code) {
        Some(region) => resolved.selection.region = Some(region.clone()),
        None => debug!(
            region_code = %record.region_code,
            "Owning region missing from regions listing"
        ),
    }

    resolved.provinces = sorted_or_empty(
        "provinces",
        directory.list_provinces(&record.region_code).await,
    );
    resolved.selection.province = Some(record.unit());
    resolved.cities = sorted_or_empty(
        "cities",
        directory.list_cities(&record.code, ParentLevel::Province).await,
    );

    let Some(city_name) = fragments.city.as_deref() else {
        return resolved;
    };
    let Some(city) = find_by_name(&resolved.cities, city_name).cloned() else {
        debug!(city = city_name, province = %record.name, "City not found under province");
        return resolved;
    };

    resolved.barangays = sorted_or_empty("barangays", directory.list_barangays(&city.code).await);
    resolved.selection.city = Some(city);
    if let Some(barangay) = fragments.barangay.as_deref() {
        resolved.selection.barangay = Some(match_barangay(&resolved.barangays, barangay));
    }
    resolved
}

/// The province-less path: the stored province field matched nothing, so
/// either the address belongs to a region whose cities attach directly, or
/// a 2-segment address put the city in the province slot.
async fn resolve_under_direct_region(
    directory: &dyn GeographyDirectory,
    fragments: &ParsedFragments,
    mut resolved: ResolvedLocation,
) -> ResolvedLocation {
    let city_slot = fragments.city.as_deref();
    let province_slot = fragments.province.as_deref();

    // The 2-segment form is ambiguous between {city, province} and
    // {barangay, city-under-region}, so try the fragment that does not look
    // like a barangay first.
    let city_slot_marked = city_slot.map(has_marker).unwrap_or(false);
    let candidates: Vec<&str> = if city_slot_marked {
        [province_slot, city_slot].into_iter().flatten().collect()
    } else {
        [city_slot, province_slot].into_iter().flatten().collect()
    };
    if candidates.is_empty() {
        return resolved;
    }

    let regions = resolved.regions.clone();
    for region in &regions {
        let provinces = match directory.list_provinces(&region.code).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, region = %region.name, "Province listing failed, skipping region");
                continue;
            }
        };
        if !provinces.is_empty() {
            continue;
        }

        let cities = sorted_or_empty(
            "cities",
            directory.list_cities(&region.code, ParentLevel::Region).await,
        );
        for candidate in &candidates {
            let Some(city) = find_by_name(&cities, candidate).cloned() else {
                continue;
            };

            resolved.selection.region = Some(region.clone());
            resolved.provinces = Vec::new();
            resolved.barangays =
                sorted_or_empty("barangays", directory.list_barangays(&city.code).await);

            if let Some(barangay) = fragments.barangay.as_deref() {
                resolved.selection.barangay =
                    Some(match_barangay(&resolved.barangays, barangay));
            } else if city_slot_marked && Some(*candidate) == province_slot {
                // The city matched out of the province slot, which means the
                // marker-bearing city slot holds a displaced barangay.
                if let Some(displaced) = city_slot {
                    resolved.selection.barangay =
                        Some(match_barangay(&resolved.barangays, strip_marker(displaced)));
                }
            }

            resolved.selection.city = Some(city);
            resolved.cities = cities;
            return resolved;
        }
    }

    debug!("Stored address matched no direct-region city, leaving partial state");
    resolved
}

/// Match a decoded barangay against the fetched listing, keeping the stored
/// text verbatim when the directory no longer lists it - historical data may
/// reference a renamed or removed barangay.
fn match_barangay(options: &[AdministrativeUnit], name: &str) -> String {
    match find_by_name(options, name) {
        Some(unit) => unit.name.clone(),
        None => {
            debug!(barangay = name, "Barangay not in directory, keeping stored name");
            name.to_string()
        }
    }
}
