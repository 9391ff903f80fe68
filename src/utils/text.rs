use std::cmp::Ordering;

/// Compare two strings case-insensitively, for sorting directory listings.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Case-insensitive equality. Unicode-aware: directory names carry
/// characters like the enye in "Las Piñas" or "Peñablanca".
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Leading tokens that mark a sub-city segment in stored address strings.
/// "Brgy." must come before "Brgy" so the dotted form wins.
const SEGMENT_MARKERS: [&str; 3] = ["Brgy.", "Brgy", "Sitio"];

/// Strip a leading `Brgy.`/`Sitio` marker token from an address segment.
/// Returns the trimmed remainder, or the trimmed input when no marker leads.
pub fn strip_marker(segment: &str) -> &str {
    let trimmed = segment.trim();
    for marker in SEGMENT_MARKERS {
        if trimmed.len() <= marker.len() {
            continue;
        }
        let Some(head) = trimmed.get(..marker.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(marker) {
            continue;
        }
        let rest = &trimmed[marker.len()..];
        // A dotted marker may run straight into the name ("Brgy.Malanday");
        // a bare word must be followed by whitespace so "Sitios" survives.
        if marker.ends_with('.') || rest.starts_with(char::is_whitespace) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// Whether an address segment carries a leading barangay/sitio marker.
pub fn has_marker(segment: &str) -> bool {
    strip_marker(segment) != segment.trim()
}
