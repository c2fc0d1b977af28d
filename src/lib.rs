//! Versioned API service kit
//!
//! Resolves API version tokens, dispatches operations to per-version
//! handlers, and generates one annotated API document per declared version.
//!
//! # Features
//!
//! - **Version Resolution**: URL-segment, query-string, or header tokens,
//!   integer or calendar-date versions, optional assumed default
//! - **Per-Version Dispatch**: explicit operation bindings with an
//!   all-versions fallback
//! - **Deprecation Metadata**: RFC 8594 Sunset headers, Deprecation headers,
//!   and supported/deprecated version reporting
//! - **Generated Documents**: one OpenAPI-style document per version with
//!   deprecation notices, sunset dates, and policy links
//! - **Usage Metrics**: Prometheus counters for dispatched and rejected
//!   requests
//!
//! # Example Configuration
//!
//! ```yaml
//! title: Route Versioning Web API
//! source:
//!   type: url_segment
//! format: integer
//! default_version: "1"
//! assume_default_when_unspecified: true
//! versions:
//!   - version: "1"
//!     deprecated: true
//!     sunset:
//!       effective: 2024-12-31
//!       links:
//!         - uri: https://docs.example.com/version-policies
//!           title: Version Policies
//!           media_type: text/html
//!   - version: "2"
//! ```

pub mod config;
pub mod dispatch;
pub mod docs;
pub mod error;
pub mod headers;
pub mod metrics;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod service;
pub mod version;

pub use config::VersioningConfig;
pub use error::VersionError;
pub use service::VersionedService;
pub use version::ApiVersion;
