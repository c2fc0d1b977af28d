//! Version resolution.
//!
//! Turns the raw token an outer router extracted (path segment, query
//! parameter, or header value) into a declared [`ApiVersion`]. Resolution is
//! pure: the same token against the same registry always yields the same
//! result.

use crate::error::VersionError;
use crate::registry::VersionRegistry;
use crate::version::{ApiVersion, VersionFormat};

/// Resolves raw version tokens against a registry.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    format: VersionFormat,
    default_version: Option<ApiVersion>,
    assume_default_when_unspecified: bool,
}

impl VersionResolver {
    pub fn new(
        format: VersionFormat,
        default_version: Option<ApiVersion>,
        assume_default_when_unspecified: bool,
    ) -> Self {
        Self {
            format,
            default_version,
            assume_default_when_unspecified,
        }
    }

    /// Resolve a raw token, or the configured default when the token is
    /// absent and the service assumes it.
    ///
    /// An absent token with no applicable default is reported as a malformed
    /// empty token.
    pub fn resolve(
        &self,
        registry: &VersionRegistry,
        raw: Option<&str>,
    ) -> Result<ApiVersion, VersionError> {
        let version = match raw {
            Some(token) => ApiVersion::parse(token, self.format)?,
            None => match self.applicable_default() {
                Some(default) => default,
                None => {
                    return Err(VersionError::InvalidVersionFormat {
                        token: String::new(),
                    })
                }
            },
        };

        if registry.contains(version) {
            Ok(version)
        } else {
            Err(VersionError::UnsupportedVersion { version })
        }
    }

    fn applicable_default(&self) -> Option<ApiVersion> {
        if self.assume_default_when_unspecified {
            self.default_version
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersioningConfig;

    fn registry(yaml: &str) -> VersionRegistry {
        let config: VersioningConfig = serde_yaml::from_str(yaml).unwrap();
        VersionRegistry::from_config(&config).unwrap()
    }

    fn integer_registry() -> VersionRegistry {
        registry(
            r#"
versions:
  - version: "1"
  - version: "2"
"#,
        )
    }

    #[test]
    fn test_declared_token_resolves() {
        let registry = integer_registry();
        let resolver = VersionResolver::new(VersionFormat::Integer, None, false);

        assert_eq!(
            resolver.resolve(&registry, Some("1")).unwrap(),
            ApiVersion::Number(1)
        );
        assert_eq!(
            resolver.resolve(&registry, Some("2")).unwrap(),
            ApiVersion::Number(2)
        );
    }

    #[test]
    fn test_malformed_token() {
        let registry = integer_registry();
        let resolver = VersionResolver::new(VersionFormat::Integer, None, false);

        for token in ["abc", "v1", "1.5", ""] {
            let err = resolver.resolve(&registry, Some(token)).unwrap_err();
            assert!(
                matches!(err, VersionError::InvalidVersionFormat { .. }),
                "token {:?} gave {:?}",
                token,
                err
            );
        }
    }

    #[test]
    fn test_undeclared_token() {
        // Token "3" against a registry holding only {1, 2}.
        let registry = integer_registry();
        let resolver = VersionResolver::new(VersionFormat::Integer, None, false);

        let err = resolver.resolve(&registry, Some("3")).unwrap_err();
        assert_eq!(
            err,
            VersionError::UnsupportedVersion {
                version: ApiVersion::Number(3)
            }
        );
    }

    #[test]
    fn test_absent_token_with_assumed_default() {
        let registry = integer_registry();
        let resolver =
            VersionResolver::new(VersionFormat::Integer, Some(ApiVersion::Number(1)), true);

        assert_eq!(
            resolver.resolve(&registry, None).unwrap(),
            ApiVersion::Number(1)
        );
    }

    #[test]
    fn test_absent_token_without_assumption() {
        let registry = integer_registry();

        // Default configured but not assumed for unspecified requests.
        let resolver =
            VersionResolver::new(VersionFormat::Integer, Some(ApiVersion::Number(1)), false);
        assert!(matches!(
            resolver.resolve(&registry, None).unwrap_err(),
            VersionError::InvalidVersionFormat { .. }
        ));

        // No default at all.
        let resolver = VersionResolver::new(VersionFormat::Integer, None, true);
        assert!(resolver.resolve(&registry, None).is_err());
    }

    #[test]
    fn test_date_tokens() {
        let registry = registry(
            r#"
format: date
versions:
  - version: "2024-01-01"
  - version: "2024-09-20"
"#,
        );
        let resolver = VersionResolver::new(VersionFormat::Date, None, false);

        let resolved = resolver.resolve(&registry, Some("2024-09-20")).unwrap();
        assert_eq!(resolved.as_token(), "2024-09-20");

        assert!(matches!(
            resolver.resolve(&registry, Some("2025-01-01")).unwrap_err(),
            VersionError::UnsupportedVersion { .. }
        ));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = integer_registry();
        let resolver =
            VersionResolver::new(VersionFormat::Integer, Some(ApiVersion::Number(1)), true);

        for _ in 0..3 {
            assert_eq!(
                resolver.resolve(&registry, Some("2")).unwrap(),
                ApiVersion::Number(2)
            );
            assert_eq!(
                resolver.resolve(&registry, None).unwrap(),
                ApiVersion::Number(1)
            );
        }
    }
}
