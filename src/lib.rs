//! Hierarchical location picker over the Philippine administrative-geography
//! directory.
//!
//! Monitoring forms store a location as a single comma-joined string
//! ("Brgy. Malanday, Marikina City, Metro Manila"). This crate owns
//! everything between that string and the four cascading dropdowns a user
//! actually interacts with:
//!
//! - [`api`]: the Geography Data Gateway - an injectable directory trait,
//!   the PSGC REST client behind it, and a memoizing wrapper
//! - [`models`]: directory units and the canonical-string codec
//! - [`picker`]: the hierarchy state machine and the reverse resolver that
//!   reconstructs codes from a stored string
//!
//! The picker tolerates everything a decade of free-typed historical data
//! throws at it: failed fetches degrade to empty dropdowns, unresolvable
//! addresses to partially-filled ones, and out-of-order fetch completions
//! are discarded by generation tag. Nothing in this crate blocks the
//! embedding form.

pub mod api;
pub mod models;
pub mod picker;
pub mod utils;

#[cfg(test)]
mod testutil;

pub use api::{ApiError, CachingDirectory, GeographyDirectory, ParentLevel, PsgcClient};
pub use models::{decode, AdministrativeUnit, CanonicalLocation, ParsedFragments, ProvinceRecord};
pub use picker::{
    resolve, CompletionLevel, HierarchySelection, LocationPicker, PickerProps, ResolvedLocation,
};
