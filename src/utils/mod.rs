//! Utility functions for string comparison and address-segment handling.

pub mod text;

// Re-export commonly used functions at module level
pub use text::{cmp_ignore_case, eq_ignore_case, has_marker, strip_marker};
