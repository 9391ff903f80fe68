//! Domain models for administrative-geography units.
//!
//! These types represent directory data in a clean domain format,
//! decoupled from the API response structures.

use serde::{Deserialize, Serialize};

use crate::utils::{cmp_ignore_case, eq_ignore_case};

/// A single administrative unit as listed by the geography directory.
///
/// Codes are stable and globally unique within their level. Units are only
/// ever produced by the directory; this crate fetches them, it never mints
/// or mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeUnit {
    pub code: String,
    pub name: String,
}

impl AdministrativeUnit {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A province row from the full provinces directory.
///
/// Carries the code of its owning region so a province matched by name can
/// be tied back to its region without scanning every region's province list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    pub code: String,
    pub name: String,
    pub region_code: String,
}

impl ProvinceRecord {
    /// The province as a plain directory unit, for selections and dropdowns.
    pub fn unit(&self) -> AdministrativeUnit {
        AdministrativeUnit::new(&self.code, &self.name)
    }
}

/// Sort a directory listing lexicographically by name, case-insensitively.
/// Every option list exposed to the UI goes through this so presentation is
/// deterministic regardless of service ordering.
pub fn sort_by_name(units: &mut [AdministrativeUnit]) {
    units.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
}

/// Find a unit by case-insensitive name match.
pub fn find_by_name<'a>(
    units: &'a [AdministrativeUnit],
    name: &str,
) -> Option<&'a AdministrativeUnit> {
    units.iter().find(|u| eq_ignore_case(&u.name, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_name() {
        let mut units = vec![
            AdministrativeUnit::new("3", "Tanay"),
            AdministrativeUnit::new("1", "angono"),
            AdministrativeUnit::new("2", "Baras"),
        ];
        sort_by_name(&mut units);
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["angono", "Baras", "Tanay"]);
    }

    #[test]
    fn test_find_by_name() {
        let units = vec![
            AdministrativeUnit::new("045815000", "Tanay"),
            AdministrativeUnit::new("045816000", "Taytay"),
        ];
        assert_eq!(
            find_by_name(&units, "TANAY").map(|u| u.code.as_str()),
            Some("045815000")
        );
        assert!(find_by_name(&units, "Teresa").is_none());
    }
}
