//! The canonical location string and its codec.
//!
//! Callers store a single comma-joined text field in place of structured
//! address data. Internally the four shapes of that field are a tagged
//! union; the legacy string only exists at the boundary, so encoding and
//! decoding stay total functions instead of string-pattern guessing.

use std::fmt;

use crate::utils::strip_marker;

/// The stored value and display name of the remote pseudo-location.
pub const ONLINE: &str = "Online";

/// The shapes a stored location string can take.
///
/// - `Remote` - the "Online" pseudo-location
/// - `FullChain` - barangay + city, with a province when the owning region
///   has a province level
/// - `PartialChain` - city + province, no barangay yet
/// - `BareCity` - a single segment; also the best-effort reading of
///   degraded one-segment legacy values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalLocation {
    Remote,
    FullChain {
        barangay: String,
        city: String,
        province: Option<String>,
    },
    PartialChain {
        city: String,
        province: String,
    },
    BareCity {
        city: String,
    },
}

/// Name fragments recovered from a stored string.
///
/// The region never appears in the canonical format, so it is absent here;
/// reverse resolution against the directory is the only way to recover it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFragments {
    pub barangay: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub remote: bool,
}

impl CanonicalLocation {
    /// Decode a stored string. Pure and synchronous; never consults the
    /// directory. Returns `None` for an empty value.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == ONLINE {
            return Some(Self::Remote);
        }

        let segments: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        match segments.len() {
            0 => None,
            1 => Some(Self::BareCity {
                city: segments[0].to_string(),
            }),
            2 => Some(Self::PartialChain {
                city: segments[0].to_string(),
                province: segments[1].to_string(),
            }),
            // Last segment is the province, second-to-last the city,
            // third-to-last the barangay; anything earlier (sitio, purok)
            // is not representable and gets dropped.
            n => Some(Self::FullChain {
                barangay: strip_marker(segments[n - 3]).to_string(),
                city: segments[n - 2].to_string(),
                province: Some(segments[n - 1].to_string()),
            }),
        }
    }

    /// Encode the most specific shape the given fields support. Remote mode
    /// wins over any stale positional fields. A barangay without a city
    /// cannot occur (the state machine clears downward); `None` means there
    /// is nothing encodable yet.
    pub fn from_parts(
        barangay: Option<&str>,
        city: Option<&str>,
        province: Option<&str>,
        remote: bool,
    ) -> Option<Self> {
        if remote {
            return Some(Self::Remote);
        }
        let city = city?;
        match (barangay, province) {
            (Some(b), p) => Some(Self::FullChain {
                barangay: b.to_string(),
                city: city.to_string(),
                province: p.map(str::to_string),
            }),
            (None, Some(p)) => Some(Self::PartialChain {
                city: city.to_string(),
                province: p.to_string(),
            }),
            (None, None) => Some(Self::BareCity {
                city: city.to_string(),
            }),
        }
    }

    /// The name fragments this shape carries.
    pub fn fragments(&self) -> ParsedFragments {
        match self {
            Self::Remote => ParsedFragments {
                remote: true,
                ..ParsedFragments::default()
            },
            Self::FullChain {
                barangay,
                city,
                province,
            } => ParsedFragments {
                barangay: Some(barangay.clone()),
                city: Some(city.clone()),
                province: province.clone(),
                remote: false,
            },
            Self::PartialChain { city, province } => ParsedFragments {
                city: Some(city.clone()),
                province: Some(province.clone()),
                ..ParsedFragments::default()
            },
            Self::BareCity { city } => ParsedFragments {
                city: Some(city.clone()),
                ..ParsedFragments::default()
            },
        }
    }
}

impl fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str(ONLINE),
            Self::FullChain {
                barangay,
                city,
                province: Some(province),
            } => write!(f, "Brgy. {}, {}, {}", barangay, city, province),
            Self::FullChain {
                barangay,
                city,
                province: None,
            } => write!(f, "Brgy. {}, {}", barangay, city),
            Self::PartialChain { city, province } => write!(f, "{}, {}", city, province),
            Self::BareCity { city } => f.write_str(city),
        }
    }
}

/// Decode a stored string into name fragments. Convenience over
/// [`CanonicalLocation::parse`]; an empty value yields empty fragments.
pub fn decode(raw: &str) -> ParsedFragments {
    CanonicalLocation::parse(raw)
        .map(|location| location.fragments())
        .unwrap_or_default()
}
