//! API version deprecation signaling.
//!
//! Maps a requested API version to configured deprecation metadata and
//! writes standard deprecation-signaling response headers.
//!
//! # Features
//!
//! - **Sunset Headers**: RFC 8594 compliant Sunset headers
//! - **Deprecation Headers**: `@<epoch-seconds>` deprecation timestamps
//! - **Link Headers**: deprecation and sunset documentation links
//! - **Pluggable Version Parsing**: custom raw-token to version-key strategies
//! - **Usage Tracking**: Prometheus metrics for deprecated version usage
//!
//! # Example
//!
//! ```
//! use api_version_deprecation::{ApiVersionDeprecationHandler, ResponseHeaders};
//! use api_version_deprecation::headers::parse_http_date;
//!
//! let mut handler = ApiVersionDeprecationHandler::default();
//! handler
//!     .configure_version("1.1")
//!     .set_deprecation_date(parse_http_date("Fri, 30 Jun 2023 23:59:59 GMT").unwrap())
//!     .set_deprecation_link("https://example.org/deprecation")
//!     .set_sunset_date(parse_http_date("Wed, 11 Nov 2026 11:11:11 GMT").unwrap())
//!     .set_sunset_link("https://example.org/sunset");
//!
//! let mut headers = ResponseHeaders::new();
//! handler.handle_version("1.1", &mut headers);
//!
//! assert_eq!(headers.get_first("Deprecation"), Some("@1688169599"));
//! assert_eq!(headers.get_first("Sunset"), Some("Wed, 11 Nov 2026 11:11:11 GMT"));
//! assert_eq!(headers.get_all("Link").len(), 2);
//! ```
//!
//! # Example Configuration
//!
//! ```yaml
//! versions:
//!   - version: "1.1"
//!     deprecated_at: "2023-06-30T23:59:59Z"
//!     deprecation_link: https://example.org/deprecation
//!     sunset_at: "2026-11-11T11:11:11Z"
//!     sunset_link: https://example.org/sunset
//! ```

pub mod config;
pub mod handler;
pub mod headers;
pub mod metrics;

pub use config::{ConfigError, DeprecationConfig, GlobalSettings, VersionSpec};
pub use handler::{ApiVersionDeprecationHandler, ApiVersionParser, StringVersionParser};
pub use headers::{HeaderSink, ResponseHeaders};
