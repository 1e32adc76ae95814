//! Wall-clock timestamp formatting, shared by process creation/completion marks
//! and per-instruction log-line prefixes (§6: `MM/DD/YYYY HH:MM:SSam|pm`).

use chrono::Local;

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S%p";

/// Render the current local time in the spec's fixed-width format, e.g.
/// `07/26/2026 03:04:05PM`.
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_matches_expected_shape() {
        let ts = timestamp();
        // MM/DD/YYYY HH:MM:SSAM or PM, e.g. "07/26/2026 03:04:05PM"
        assert_eq!(ts.len(), 21, "unexpected timestamp shape: {ts}");
        assert_eq!(ts.as_bytes()[2], b'/');
        assert_eq!(ts.as_bytes()[5], b'/');
        assert_eq!(ts.as_bytes()[10], b' ');
        assert!(ts.ends_with("AM") || ts.ends_with("PM"));
    }
}
