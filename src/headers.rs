//! Response metadata for version lifecycle.
//!
//! Standard headers announcing deprecation and sunset state:
//! - Deprecation header (draft-ietf-httpapi-deprecation-header)
//! - Sunset header (RFC 8594) with its policy links
//! - api-supported-versions / api-deprecated-versions reporting

use chrono::NaiveDate;

use crate::config::HeaderSettings;
use crate::registry::{DeclaredVersion, VersionRegistry};

/// Headers attached to responses served by a deprecated version.
///
/// Healthy versions produce no lifecycle headers. A sunset effective date is
/// rendered as an HTTP date; policy links are combined into one Link header
/// value with `rel="sunset"` and their title/type parameters when present.
pub fn lifecycle_headers(
    declaration: &DeclaredVersion,
    settings: &HeaderSettings,
) -> Vec<(String, String)> {
    let mut headers = Vec::new();

    if !declaration.deprecated {
        return headers;
    }

    headers.push((settings.deprecation.clone(), "true".to_string()));

    if let Some(policy) = &declaration.sunset {
        if let Some(date) = policy.effective {
            headers.push((settings.sunset.clone(), format_http_date(date)));
        }

        let links: Vec<String> = policy
            .links
            .iter()
            .map(|link| {
                let mut value = format!("<{}>; rel=\"sunset\"", link.uri);
                if let Some(title) = &link.title {
                    value.push_str(&format!("; title=\"{}\"", title));
                }
                value.push_str(&format!("; type=\"{}\"", link.media_type));
                value
            })
            .collect();
        if !links.is_empty() {
            headers.push((settings.link.clone(), links.join(", ")));
        }
    }

    headers
}

/// Headers listing the service's declared versions, declared order.
pub fn report_headers(registry: &VersionRegistry, settings: &HeaderSettings) -> Vec<(String, String)> {
    let mut headers = Vec::new();

    let supported = registry.supported_tokens();
    if !supported.is_empty() {
        headers.push((settings.supported_versions.clone(), supported.join(", ")));
    }

    let deprecated = registry.deprecated_tokens();
    if !deprecated.is_empty() {
        headers.push((settings.deprecated_versions.clone(), deprecated.join(", ")));
    }

    headers
}

/// Format a sunset date as an HTTP date (RFC 7231), midnight UTC.
/// Example: Tue, 31 Dec 2024 00:00:00 GMT
fn format_http_date(date: NaiveDate) -> String {
    date.format("%a, %d %b %Y 00:00:00 GMT").to_string()
}
