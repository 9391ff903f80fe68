//! Geography Data Gateway for the PSGC directory service.
//!
//! This module provides the `GeographyDirectory` trait the rest of the
//! subsystem consumes, the `PsgcClient` that implements it over the public
//! PSGC REST API, and a memoizing `CachingDirectory` wrapper.
//!
//! The directory is read-only and unauthenticated: four list endpoints
//! addressed by parent code, returning `{code, name}` pairs.

pub mod cache;
pub mod client;
pub mod directory;
pub mod error;

pub use cache::CachingDirectory;
pub use client::PsgcClient;
pub use directory::{GeographyDirectory, ParentLevel};
pub use error::ApiError;

pub(crate) use directory::sorted_or_empty;
