//! Configuration for a versioned API service.
//!
//! Declares the version set, which versions are deprecated, sunset policies,
//! and where the version token is read from. Loaded once at startup; every
//! component works against the immutable value built from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::version::{ApiVersion, VersionFormat};

/// Main configuration for a versioned API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersioningConfig {
    /// Service title used in generated documents
    #[serde(default = "default_title")]
    pub title: String,

    /// Base description sentence for generated documents
    #[serde(default = "default_description")]
    pub description: String,

    /// Where the version token is read from
    #[serde(default)]
    pub source: VersionSource,

    /// Token format accepted by this service
    #[serde(default)]
    pub format: VersionFormat,

    /// Version to use when no token is present (string form)
    #[serde(default)]
    pub default_version: Option<String>,

    /// Whether an absent token resolves to the default version
    #[serde(default)]
    pub assume_default_when_unspecified: bool,

    /// Whether responses report supported/deprecated version headers
    #[serde(default = "default_true")]
    pub report_versions: bool,

    /// Declared versions, in the order documents are generated
    #[serde(default)]
    pub versions: Vec<VersionDeclaration>,

    /// Response header names
    #[serde(default)]
    pub headers: HeaderSettings,

    /// Whether deprecated-version access is logged
    #[serde(default = "default_true")]
    pub log_access: bool,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            source: VersionSource::default(),
            format: VersionFormat::default(),
            default_version: None,
            assume_default_when_unspecified: false,
            report_versions: true,
            versions: Vec::new(),
            headers: HeaderSettings::default(),
            log_access: true,
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "Versioned Web API".to_string()
}

fn default_description() -> String {
    "A web API served under explicit version declarations.".to_string()
}

impl VersioningConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.versions.is_empty() {
            anyhow::bail!("at least one version must be declared");
        }

        let mut seen = Vec::with_capacity(self.versions.len());
        for declaration in &self.versions {
            let version = declaration.parse_version(self.format)?;
            if seen.contains(&version) {
                anyhow::bail!("version {} is declared twice", version);
            }
            seen.push(version);
            declaration.validate()?;
        }

        if let Some(default) = &self.default_version {
            let version = ApiVersion::parse(default, self.format).map_err(|_| {
                anyhow::anyhow!(
                    "default_version {:?} does not parse as a {:?} version",
                    default,
                    self.format
                )
            })?;
            if !seen.contains(&version) {
                anyhow::bail!("default_version {} is not declared", version);
            }
        }

        if self.assume_default_when_unspecified && self.default_version.is_none() {
            anyhow::bail!("assume_default_when_unspecified requires default_version");
        }

        Ok(())
    }
}

/// Where the raw version token is extracted from. Exactly one source is
/// active per service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VersionSource {
    /// URL path segment, `/api/v{version}/...`
    #[default]
    UrlSegment,

    /// Query parameter, `?api-version=<token>`
    Query {
        #[serde(default = "default_query_name")]
        name: String,
    },

    /// Request header
    Header {
        #[serde(default = "default_header_name")]
        name: String,
    },
}

fn default_query_name() -> String {
    "api-version".to_string()
}

fn default_header_name() -> String {
    "x-api-version".to_string()
}

/// A single declared API version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDeclaration {
    /// Version identifier in its string form ("1" or "2024-01-01")
    pub version: String,

    /// Whether the version is still served but scheduled for removal
    #[serde(default)]
    pub deprecated: bool,

    /// Sunset policy attached to this version
    #[serde(default)]
    pub sunset: Option<SunsetPolicy>,
}

impl VersionDeclaration {
    /// Validate the declaration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version.is_empty() {
            anyhow::bail!("version identifier cannot be empty");
        }
        if let Some(sunset) = &self.sunset {
            for link in &sunset.links {
                if link.uri.is_empty() {
                    anyhow::bail!("sunset link for version {} has an empty URI", self.version);
                }
            }
        }
        Ok(())
    }

    /// Parse the declared identifier under the service's format.
    pub fn parse_version(&self, format: VersionFormat) -> anyhow::Result<ApiVersion> {
        ApiVersion::parse(&self.version, format).map_err(|_| {
            anyhow::anyhow!(
                "declared version {:?} does not parse as a {:?} version",
                self.version,
                format
            )
        })
    }
}

/// Sunset policy: a future removal date plus informational links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SunsetPolicy {
    /// Date after which the version stops being supported
    #[serde(default)]
    pub effective: Option<NaiveDate>,

    /// Informational links, order preserved
    #[serde(default)]
    pub links: Vec<SunsetLink>,
}

/// One informational link attached to a sunset policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SunsetLink {
    /// Link target
    pub uri: String,

    /// Human-readable title; the URI is used when unset
    #[serde(default)]
    pub title: Option<String>,

    /// Media type of the target; only "text/html" links are rendered into
    /// generated document descriptions
    #[serde(default = "default_media_type")]
    pub media_type: String,
}

fn default_media_type() -> String {
    "text/html".to_string()
}

/// Response header names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderSettings {
    /// Header announcing deprecation (default: Deprecation)
    #[serde(default = "default_deprecation_header")]
    pub deprecation: String,

    /// Header carrying the sunset date (default: Sunset)
    #[serde(default = "default_sunset_header")]
    pub sunset: String,

    /// Header carrying sunset links (default: Link)
    #[serde(default = "default_link_header")]
    pub link: String,

    /// Header listing supported versions (default: api-supported-versions)
    #[serde(default = "default_supported_header")]
    pub supported_versions: String,

    /// Header listing deprecated versions (default: api-deprecated-versions)
    #[serde(default = "default_deprecated_header")]
    pub deprecated_versions: String,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            deprecation: default_deprecation_header(),
            sunset: default_sunset_header(),
            link: default_link_header(),
            supported_versions: default_supported_header(),
            deprecated_versions: default_deprecated_header(),
        }
    }
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

fn default_supported_header() -> String {
    "api-supported-versions".to_string()
}

fn default_deprecated_header() -> String {
    "api-deprecated-versions".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether to expose Prometheus metrics
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix for metric names
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: default_metrics_prefix(),
        }
    }
}

fn default_metrics_prefix() -> String {
    "versioned_api".to_string()
}
