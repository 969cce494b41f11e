//! Shared utility functions

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// Parse a datetime string (RFC3339 format) or return current time
///
/// This helper is used throughout the database layer to handle datetime parsing
/// with a fallback to the current time if parsing fails.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an optional datetime column, dropping values that fail to parse
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Decode a JSON text column, falling back to the type's default
///
/// Document-valued fields (passenger lists, itineraries, tag lists) are
/// stored as JSON text. A corrupt column degrades to an empty value rather
/// than failing the whole row.
pub fn parse_json_or_default<T: DeserializeOwned + Default>(s: &str) -> T {
    serde_json::from_str(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let invalid_time = "invalid";
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now(invalid_time);
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }

    #[test]
    fn test_parse_datetime_opt() {
        assert!(parse_datetime_opt(None).is_none());
        assert!(parse_datetime_opt(Some("garbage".to_string())).is_none());
        assert!(parse_datetime_opt(Some("2024-01-01T12:00:00Z".to_string())).is_some());
    }

    #[test]
    fn test_parse_json_or_default() {
        let tags: Vec<String> = parse_json_or_default(r#"["beach","family"]"#);
        assert_eq!(tags, vec!["beach".to_string(), "family".to_string()]);

        let broken: Vec<String> = parse_json_or_default("not json");
        assert!(broken.is_empty());
    }
}
