//! Version deprecation handler.
//!
//! Maps a requested API version to configured deprecation metadata and
//! writes the corresponding response headers. Registration happens during
//! startup; handling is a read-only lookup plus header formatting and never
//! fails.

use crate::config::{ConfigError, DeprecationConfig, GlobalSettings, VersionSpec};
use crate::headers::{DeprecationHeaders, HeaderSink};
use crate::metrics::VersionMetrics;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

/// Strategy converting a raw request-supplied version token into the
/// canonical key used for lookup.
///
/// Implemented for any `Fn(&str) -> Option<V>` closure, so a parser can be
/// supplied inline:
///
/// ```
/// use api_version_deprecation::{ApiVersionDeprecationHandler, ApiVersionParser};
///
/// let handler = ApiVersionDeprecationHandler::new(|raw: &str| {
///     raw.strip_prefix('v').map(str::to_string)
/// });
/// ```
pub trait ApiVersionParser {
    type Version: Clone + Eq + Hash;

    /// Parse a raw version token. `None` means the token is malformed;
    /// malformed tokens are treated as lookup misses during handling.
    fn parse_version(&self, raw: &str) -> Option<Self::Version>;
}

impl<F, V> ApiVersionParser for F
where
    F: Fn(&str) -> Option<V>,
    V: Clone + Eq + Hash,
{
    type Version = V;

    fn parse_version(&self, raw: &str) -> Option<V> {
        self(raw)
    }
}

/// Parser that uses the trimmed version string itself as the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringVersionParser;

impl ApiVersionParser for StringVersionParser {
    type Version = String;

    fn parse_version(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Maps requested API versions to deprecation metadata and writes
/// `Deprecation`, `Sunset`, and `Link` response headers.
///
/// Configure versions at startup, then share the handler read-only across
/// request handling.
pub struct ApiVersionDeprecationHandler<P: ApiVersionParser = StringVersionParser> {
    parser: P,
    versions: HashMap<P::Version, VersionSpec>,
    settings: GlobalSettings,
    metrics: Option<Arc<VersionMetrics>>,
}

impl Default for ApiVersionDeprecationHandler<StringVersionParser> {
    fn default() -> Self {
        Self::new(StringVersionParser)
    }
}

impl ApiVersionDeprecationHandler<StringVersionParser> {
    /// Build a handler from a loaded configuration file, using the plain
    /// string parser.
    pub fn from_config(config: &DeprecationConfig) -> Result<Self, ConfigError> {
        Self::from_config_with_parser(config, StringVersionParser)
    }
}

impl<P: ApiVersionParser> ApiVersionDeprecationHandler<P> {
    /// Create an empty handler with the given version parsing strategy.
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            versions: HashMap::new(),
            settings: GlobalSettings::default(),
            metrics: None,
        }
    }

    /// Build a handler from a loaded configuration file.
    ///
    /// Registers every rule, creates the metrics collector when enabled, and
    /// initializes the days-until-sunset gauges.
    pub fn from_config_with_parser(
        config: &DeprecationConfig,
        parser: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut handler = Self::new(parser).with_settings(config.settings.clone());

        if config.metrics.enabled {
            let metrics = Arc::new(VersionMetrics::new(&config.metrics.prefix));
            for rule in &config.versions {
                if let Some(days) = rule.spec().days_until_sunset() {
                    metrics.set_days_until_sunset(&rule.version, days);
                }
            }
            handler.metrics = Some(metrics);
        }

        for rule in &config.versions {
            let key = handler.parser.parse_version(&rule.version).ok_or_else(|| {
                ConfigError::UnparseableVersion {
                    version: rule.version.clone(),
                }
            })?;
            handler.versions.insert(key, rule.spec());
        }

        Ok(handler)
    }

    /// Replace the header-name settings.
    pub fn with_settings(mut self, settings: GlobalSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attach a metrics collector.
    pub fn with_metrics(mut self, metrics: Arc<VersionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Get the metrics collector, if one is attached.
    pub fn metrics(&self) -> Option<&Arc<VersionMetrics>> {
        self.metrics.as_ref()
    }

    /// Number of registered versions.
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Open the deprecation entry for `version`, creating it if absent.
    ///
    /// Repeated calls for the same version return a builder over the same
    /// entry; each setter is last-write-wins. Registration is a startup-time
    /// activity and is not synchronized with handling.
    ///
    /// # Panics
    ///
    /// Panics if the version parser rejects `version`. A version that cannot
    /// be registered is a configuration mistake and should surface at
    /// startup, not per request.
    pub fn configure_version(&mut self, version: &str) -> VersionSpecBuilder<'_> {
        let key = self
            .parser
            .parse_version(version)
            .unwrap_or_else(|| panic!("version {version:?} rejected by the version parser"));

        VersionSpecBuilder {
            spec: self.versions.entry(key).or_default(),
        }
    }

    /// Write deprecation headers for a requested version into `response`.
    ///
    /// Malformed and unregistered versions are no-ops. This never fails;
    /// header emission is best-effort signaling alongside the real response
    /// work.
    pub fn handle_version<S: HeaderSink>(&self, version: &str, response: &mut S) {
        let Some(key) = self.parser.parse_version(version) else {
            debug!(version = %version, "Version token not parseable, skipping deprecation headers");
            return;
        };
        let Some(spec) = self.versions.get(&key) else {
            return;
        };

        if self.settings.log_access {
            debug!(
                version = %version,
                past_sunset = spec.is_past_sunset(),
                "Request for deprecated API version"
            );
        }

        if spec.is_past_sunset() {
            warn!(
                version = %version,
                sunset = ?spec.sunset_at,
                "Request for API version past its sunset date"
            );
        }

        if let Some(metrics) = &self.metrics {
            let status = if spec.is_past_sunset() {
                "sunset"
            } else {
                "deprecated"
            };
            metrics.record_request(version, status);
        }

        DeprecationHeaders::for_spec(spec, &self.settings).apply(response);
    }
}

/// Chainable builder over one version's deprecation entry.
///
/// Obtained from [`ApiVersionDeprecationHandler::configure_version`]; setters
/// mutate the registered entry directly.
pub struct VersionSpecBuilder<'a> {
    spec: &'a mut VersionSpec,
}

impl<'a> VersionSpecBuilder<'a> {
    /// Set the date from which the version counts as deprecated.
    pub fn set_deprecation_date(self, date: DateTime<Utc>) -> Self {
        self.spec.deprecated_at = Some(date);
        self
    }

    /// Set the link to deprecation documentation.
    pub fn set_deprecation_link(self, uri: impl Into<String>) -> Self {
        self.spec.deprecation_link = Some(uri.into());
        self
    }

    /// Set the date after which the version will no longer be served.
    pub fn set_sunset_date(self, date: DateTime<Utc>) -> Self {
        self.spec.sunset_at = Some(date);
        self
    }

    /// Set the link to sunset documentation.
    pub fn set_sunset_link(self, uri: impl Into<String>) -> Self {
        self.spec.sunset_link = Some(uri.into());
        self
    }
}
