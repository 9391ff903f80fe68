//! Data models for the location picker.
//!
//! This module contains the domain structures shared across the subsystem:
//!
//! - `AdministrativeUnit`, `ProvinceRecord`: directory entries
//! - `CanonicalLocation`, `ParsedFragments`: the stored-string codec
//!
//! Raw API response structures stay private to the gateway client; only
//! these clean domain types cross module boundaries.

pub mod location;
pub mod unit;

pub use location::{decode, CanonicalLocation, ParsedFragments, ONLINE};
pub use unit::{find_by_name, sort_by_name, AdministrativeUnit, ProvinceRecord};
