//! Header generation for API version deprecation.
//!
//! Implements standard deprecation-signaling headers:
//! - Deprecation header (draft-ietf-httpapi-deprecation-header)
//! - Sunset header (RFC 8594)
//! - Link headers pointing at deprecation and sunset documentation

use crate::config::{GlobalSettings, VersionSpec};
use chrono::{DateTime, Utc};

/// Destination for response headers.
///
/// Keeps the handler decoupled from any particular HTTP stack: anything that
/// can set and append header values by name can receive deprecation
/// signaling.
pub trait HeaderSink {
    /// Replace any existing values for `name` with `value`.
    fn set_header(&mut self, name: &str, value: String);

    /// Add `value` as an additional value for `name`.
    fn append_header(&mut self, name: &str, value: String);
}

/// Insertion-ordered multi-map of response headers with case-insensitive
/// names. Used by tests and the CLI; real callers typically wire up their
/// own [`HeaderSink`] over the server's header map.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over all (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl HeaderSink for ResponseHeaders {
    fn set_header(&mut self, name: &str, value: String) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.entries.push((name.to_string(), value));
    }

    fn append_header(&mut self, name: &str, value: String) {
        self.entries.push((name.to_string(), value));
    }
}

/// Computed header plan for a deprecated version.
///
/// Single-valued headers (Deprecation, Sunset) are set, link values are
/// appended so both documentation links can accumulate under one name.
pub struct DeprecationHeaders {
    set: Vec<(String, String)>,
    appended: Vec<(String, String)>,
}

impl DeprecationHeaders {
    /// Build the headers for a version's deprecation metadata.
    pub fn for_spec(spec: &VersionSpec, settings: &GlobalSettings) -> Self {
        let mut set = Vec::new();
        let mut appended = Vec::new();

        // Deprecation header, format: @<unix-epoch-seconds>
        if let Some(deprecated_at) = &spec.deprecated_at {
            set.push((
                settings.deprecation_header.clone(),
                format!("@{}", deprecated_at.timestamp()),
            ));
        }

        // Sunset header (RFC 8594), format: <HTTP-date>
        if let Some(sunset_at) = &spec.sunset_at {
            set.push((settings.sunset_header.clone(), format_http_date(sunset_at)));
        }

        if let Some(link) = &spec.deprecation_link {
            appended.push((settings.link_header.clone(), link_value(link, "deprecation")));
        }

        if let Some(link) = &spec.sunset_link {
            appended.push((settings.link_header.clone(), link_value(link, "sunset")));
        }

        Self { set, appended }
    }

    /// Write the headers into a sink.
    pub fn apply<S: HeaderSink>(&self, sink: &mut S) {
        for (name, value) in &self.set {
            sink.set_header(name, value.clone());
        }
        for (name, value) in &self.appended {
            sink.append_header(name, value.clone());
        }
    }

    /// Whether no headers would be emitted.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.appended.is_empty()
    }

    /// All planned headers as (name, value) pairs.
    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.set.iter().chain(self.appended.iter()).cloned().collect()
    }
}

fn link_value(uri: &str, rel: &str) -> String {
    format!("<{}>; rel=\"{}\"; type=\"text/html\"", uri, rel)
}

/// Format a datetime as an HTTP date (RFC 7231 / RFC 1123).
/// Example: Sun, 06 Nov 1994 08:49:37 GMT
pub fn format_http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date to DateTime<Utc>.
pub fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    use chrono::NaiveDateTime;

    // Try RFC 7231 format first (strip " GMT" suffix and parse as naive, then add UTC)
    if let Some(without_tz) = s.strip_suffix(" GMT") {
        if let Ok(naive) = NaiveDateTime::parse_from_str(without_tz, "%a, %d %b %Y %H:%M:%S") {
            return Some(naive.and_utc());
        }
    }

    // Try ISO 8601 as fallback
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Some(dt);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec() -> VersionSpec {
        VersionSpec {
            deprecated_at: Some("2023-06-30T23:59:59Z".parse().unwrap()),
            deprecation_link: Some("https://example.org/deprecation".to_string()),
            sunset_at: Some("2026-11-11T11:11:11Z".parse().unwrap()),
            sunset_link: Some("https://example.org/sunset".to_string()),
        }
    }

    #[test]
    fn test_deprecation_header() {
        let mut headers = ResponseHeaders::new();
        DeprecationHeaders::for_spec(&test_spec(), &GlobalSettings::default())
            .apply(&mut headers);

        assert_eq!(headers.get_first("Deprecation"), Some("@1688169599"));
    }

    #[test]
    fn test_sunset_header() {
        let mut headers = ResponseHeaders::new();
        DeprecationHeaders::for_spec(&test_spec(), &GlobalSettings::default())
            .apply(&mut headers);

        assert_eq!(
            headers.get_first("Sunset"),
            Some("Wed, 11 Nov 2026 11:11:11 GMT")
        );
    }

    #[test]
    fn test_link_headers_accumulate() {
        let mut headers = ResponseHeaders::new();
        DeprecationHeaders::for_spec(&test_spec(), &GlobalSettings::default())
            .apply(&mut headers);

        let links = headers.get_all("Link");
        assert_eq!(links.len(), 2);
        assert!(links
            .contains(&"<https://example.org/deprecation>; rel=\"deprecation\"; type=\"text/html\""));
        assert!(links.contains(&"<https://example.org/sunset>; rel=\"sunset\"; type=\"text/html\""));
    }

    #[test]
    fn test_unset_fields_suppress_headers() {
        let spec = VersionSpec {
            sunset_at: Some("2026-11-11T11:11:11Z".parse().unwrap()),
            ..Default::default()
        };

        let mut headers = ResponseHeaders::new();
        DeprecationHeaders::for_spec(&spec, &GlobalSettings::default()).apply(&mut headers);

        assert!(headers.get_first("Deprecation").is_none());
        assert!(headers.get_all("Link").is_empty());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_empty_spec_emits_nothing() {
        let plan = DeprecationHeaders::for_spec(&VersionSpec::default(), &GlobalSettings::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_custom_header_names() {
        let settings = GlobalSettings {
            deprecation_header: "X-Deprecated-Since".to_string(),
            ..Default::default()
        };

        let mut headers = ResponseHeaders::new();
        DeprecationHeaders::for_spec(&test_spec(), &settings).apply(&mut headers);

        assert!(headers.get_first("Deprecation").is_none());
        assert_eq!(headers.get_first("X-Deprecated-Since"), Some("@1688169599"));
    }

    #[test]
    fn test_response_headers_case_insensitive() {
        let mut headers = ResponseHeaders::new();
        headers.set_header("Sunset", "a".to_string());
        assert_eq!(headers.get_first("sunset"), Some("a"));

        // set replaces regardless of case
        headers.set_header("SUNSET", "b".to_string());
        assert_eq!(headers.get_all("Sunset"), vec!["b"]);
    }

    #[test]
    fn test_format_http_date() {
        let dt: DateTime<Utc> = "2026-11-11T11:11:11Z".parse().unwrap();
        assert_eq!(format_http_date(&dt), "Wed, 11 Nov 2026 11:11:11 GMT");
    }

    #[test]
    fn test_parse_http_date() {
        let parsed = parse_http_date("Fri, 30 Jun 2023 23:59:59 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 1688169599);

        // Also works with ISO 8601
        let parsed_iso = parse_http_date("2023-06-30T23:59:59Z").unwrap();
        assert_eq!(parsed_iso.timestamp(), 1688169599);

        assert!(parse_http_date("not a date").is_none());
    }
}
