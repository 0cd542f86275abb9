//! Configuration for API version deprecation signaling.
//!
//! Defines per-version deprecation metadata, header name overrides, and
//! metrics options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("version string cannot be empty")]
    EmptyVersion,

    #[error("version {version:?} was rejected by the version parser")]
    UnparseableVersion { version: String },
}

/// Main configuration for version deprecation signaling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecationConfig {
    /// Deprecation rules, one per API version
    #[serde(default)]
    pub versions: Vec<VersionRule>,

    /// Global settings
    #[serde(default)]
    pub settings: GlobalSettings,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl DeprecationConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.versions {
            rule.validate()?;
        }
        Ok(())
    }

    /// Find the rule for an exact version string. When the same version is
    /// declared more than once, the last declaration wins.
    pub fn find_version(&self, version: &str) -> Option<&VersionRule> {
        self.versions.iter().rev().find(|r| r.version == version)
    }
}

/// Deprecation metadata for a single API version.
///
/// All fields are optional; an unset field suppresses the corresponding
/// response header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// Date from which the version is considered deprecated (RFC 3339).
    /// Rendered as `Deprecation: @<epoch-seconds>`.
    #[serde(default)]
    pub deprecated_at: Option<DateTime<Utc>>,

    /// Link to human-readable deprecation documentation
    #[serde(default)]
    pub deprecation_link: Option<String>,

    /// Date after which the version will no longer be served (RFC 3339).
    /// Rendered as an RFC 8594 `Sunset` header.
    #[serde(default)]
    pub sunset_at: Option<DateTime<Utc>>,

    /// Link to human-readable sunset documentation
    #[serde(default)]
    pub sunset_link: Option<String>,
}

impl VersionSpec {
    /// Whether no metadata is configured at all.
    pub fn is_empty(&self) -> bool {
        self.deprecated_at.is_none()
            && self.deprecation_link.is_none()
            && self.sunset_at.is_none()
            && self.sunset_link.is_none()
    }

    /// Check if the version has passed its sunset date.
    pub fn is_past_sunset(&self) -> bool {
        self.sunset_at
            .map(|sunset| Utc::now() > sunset)
            .unwrap_or(false)
    }

    /// Whole days until the sunset date (negative if past).
    pub fn days_until_sunset(&self) -> Option<i64> {
        self.sunset_at.map(|sunset| (sunset - Utc::now()).num_days())
    }
}

/// Configuration entry tying a version string to its deprecation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionRule {
    /// API version this rule applies to (exact-match key)
    pub version: String,

    #[serde(default)]
    pub deprecated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deprecation_link: Option<String>,

    #[serde(default)]
    pub sunset_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub sunset_link: Option<String>,
}

impl VersionRule {
    /// Validate the rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }

        if let Some(sunset) = &self.sunset_at {
            if *sunset < Utc::now() {
                tracing::warn!(
                    version = %self.version,
                    sunset = %sunset,
                    "Sunset date is in the past but the version is still configured"
                );
            }
            if let Some(deprecated) = &self.deprecated_at {
                if sunset < deprecated {
                    tracing::warn!(
                        version = %self.version,
                        "Sunset date precedes deprecation date"
                    );
                }
            }
        }

        Ok(())
    }

    /// Extract the deprecation metadata for handler registration.
    pub fn spec(&self) -> VersionSpec {
        VersionSpec {
            deprecated_at: self.deprecated_at,
            deprecation_link: self.deprecation_link.clone(),
            sunset_at: self.sunset_at,
            sunset_link: self.sunset_link.clone(),
        }
    }
}

/// Global settings controlling header emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Header name for the deprecation timestamp (default: Deprecation)
    #[serde(default = "default_deprecation_header")]
    pub deprecation_header: String,

    /// Header name for the sunset date (default: Sunset)
    #[serde(default = "default_sunset_header")]
    pub sunset_header: String,

    /// Header name for documentation links (default: Link)
    #[serde(default = "default_link_header")]
    pub link_header: String,

    /// Whether to log each handled deprecated-version request
    #[serde(default = "default_true")]
    pub log_access: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            deprecation_header: default_deprecation_header(),
            sunset_header: default_sunset_header(),
            link_header: default_link_header(),
            log_access: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_deprecation_header() -> String {
    "Deprecation".to_string()
}

fn default_sunset_header() -> String {
    "Sunset".to_string()
}

fn default_link_header() -> String {
    "Link".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether to collect Prometheus metrics
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix for metric names
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,

    /// Labels to include in metrics
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: default_metrics_prefix(),
            labels: HashMap::new(),
        }
    }
}

fn default_metrics_prefix() -> String {
    "api_version_deprecation".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_config() {
        let yaml = r#"
versions:
  - version: "1.1"
    deprecated_at: "2023-06-30T23:59:59Z"
    deprecation_link: https://example.org/deprecation
    sunset_at: "2026-11-11T11:11:11Z"
    sunset_link: https://example.org/sunset
"#;
        let config: DeprecationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.versions.len(), 1);
        assert_eq!(config.versions[0].version, "1.1");
        assert_eq!(
            config.versions[0].deprecation_link.as_deref(),
            Some("https://example.org/deprecation")
        );
        assert!(config.versions[0].sunset_at.is_some());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = r#"
versions:
  - version: "1.1"
    sunset_date: "2026-11-11T11:11:11Z"
"#;
        let result: Result<DeprecationConfig, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_version_rejected() {
        let yaml = r#"
versions:
  - version: ""
    deprecation_link: https://example.org/deprecation
"#;
        let config: DeprecationConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyVersion)));
    }

    #[test]
    fn test_duplicate_version_last_wins() {
        let yaml = r#"
versions:
  - version: "1.0"
    deprecation_link: https://example.org/old
  - version: "1.0"
    deprecation_link: https://example.org/new
"#;
        let config: DeprecationConfig = serde_yaml::from_str(yaml).unwrap();
        let rule = config.find_version("1.0").unwrap();
        assert_eq!(
            rule.deprecation_link.as_deref(),
            Some("https://example.org/new")
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
versions:
  - version: "0.9"
    sunset_at: "2030-01-01T00:00:00Z"
settings:
  log_access: false
"#
        )
        .unwrap();

        let config = DeprecationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.versions.len(), 1);
        assert!(!config.settings.log_access);
        // Defaults apply to everything left out
        assert_eq!(config.settings.deprecation_header, "Deprecation");
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_from_missing_file() {
        let result = DeprecationConfig::from_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_spec_is_empty() {
        assert!(VersionSpec::default().is_empty());

        let spec = VersionSpec {
            sunset_link: Some("https://example.org/sunset".to_string()),
            ..Default::default()
        };
        assert!(!spec.is_empty());
    }

    #[test]
    fn test_past_sunset() {
        let spec = VersionSpec {
            sunset_at: Some("2020-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert!(spec.is_past_sunset());
        assert!(spec.days_until_sunset().unwrap() < 0);

        let spec = VersionSpec {
            sunset_at: Some("2099-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert!(!spec.is_past_sunset());
    }
}
