//! Immutable registry of declared API versions.
//!
//! Built once from configuration at startup and shared read-only afterwards;
//! resolution and documentation generation both walk it.

use crate::config::{SunsetPolicy, VersioningConfig};
use crate::version::{ApiVersion, VersionFormat};

/// A declared version with its parsed identifier.
#[derive(Debug, Clone)]
pub struct DeclaredVersion {
    pub version: ApiVersion,
    pub deprecated: bool,
    pub sunset: Option<SunsetPolicy>,
}

/// The set of versions a service declares, in declaration order.
#[derive(Debug, Clone)]
pub struct VersionRegistry {
    declarations: Vec<DeclaredVersion>,
    format: VersionFormat,
}

impl VersionRegistry {
    /// Build the registry from validated configuration.
    pub fn from_config(config: &VersioningConfig) -> anyhow::Result<Self> {
        let mut declarations = Vec::with_capacity(config.versions.len());
        for declaration in &config.versions {
            let version = declaration.parse_version(config.format)?;
            if declarations
                .iter()
                .any(|d: &DeclaredVersion| d.version == version)
            {
                anyhow::bail!("version {} is declared twice", version);
            }
            declarations.push(DeclaredVersion {
                version,
                deprecated: declaration.deprecated,
                sunset: declaration.sunset.clone(),
            });
        }
        Ok(Self {
            declarations,
            format: config.format,
        })
    }

    /// Token format this registry's versions were declared under.
    pub fn format(&self) -> VersionFormat {
        self.format
    }

    /// Declarations in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &DeclaredVersion> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Look up a declared version.
    pub fn find(&self, version: ApiVersion) -> Option<&DeclaredVersion> {
        self.declarations.iter().find(|d| d.version == version)
    }

    pub fn contains(&self, version: ApiVersion) -> bool {
        self.find(version).is_some()
    }

    /// Newest declared version by version ordering.
    pub fn newest(&self) -> Option<ApiVersion> {
        self.declarations.iter().map(|d| d.version).max()
    }

    /// String forms of all declared versions, declared order.
    pub fn supported_tokens(&self) -> Vec<String> {
        self.declarations.iter().map(|d| d.version.as_token()).collect()
    }

    /// String forms of deprecated versions, declared order.
    pub fn deprecated_tokens(&self) -> Vec<String> {
        self.declarations
            .iter()
            .filter(|d| d.deprecated)
            .map(|d| d.version.as_token())
            .collect()
    }

    /// Look up the declaration owning a group name ("v1", "v2024-01-01").
    pub fn find_by_group(&self, group: &str) -> Option<&DeclaredVersion> {
        self.declarations
            .iter()
            .find(|d| d.version.group_name() == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersioningConfig;

    fn registry_from(yaml: &str) -> VersionRegistry {
        let config: VersioningConfig = serde_yaml::from_str(yaml).unwrap();
        VersionRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_declared_order_preserved() {
        let registry = registry_from(
            r#"
versions:
  - version: "2"
  - version: "1"
"#,
        );
        let order: Vec<_> = registry.iter().map(|d| d.version.as_token()).collect();
        assert_eq!(order, vec!["2", "1"]);
    }

    #[test]
    fn test_find_and_contains() {
        let registry = registry_from(
            r#"
versions:
  - version: "1"
    deprecated: true
  - version: "2"
"#,
        );
        assert!(registry.contains(ApiVersion::Number(1)));
        assert!(!registry.contains(ApiVersion::Number(3)));
        assert!(registry.find(ApiVersion::Number(1)).unwrap().deprecated);
        assert!(!registry.find(ApiVersion::Number(2)).unwrap().deprecated);
    }

    #[test]
    fn test_newest() {
        let registry = registry_from(
            r#"
versions:
  - version: "2"
  - version: "1"
"#,
        );
        assert_eq!(registry.newest(), Some(ApiVersion::Number(2)));
    }

    #[test]
    fn test_token_lists() {
        let registry = registry_from(
            r#"
versions:
  - version: "1"
    deprecated: true
  - version: "2"
"#,
        );
        assert_eq!(registry.supported_tokens(), vec!["1", "2"]);
        assert_eq!(registry.deprecated_tokens(), vec!["1"]);
    }

    #[test]
    fn test_find_by_group() {
        let registry = registry_from(
            r#"
format: date
versions:
  - version: "2024-01-01"
"#,
        );
        assert!(registry.find_by_group("v2024-01-01").is_some());
        assert!(registry.find_by_group("v2024-09-20").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let config: VersioningConfig = serde_yaml::from_str(
            r#"
versions:
  - version: "1"
  - version: "1"
"#,
        )
        .unwrap();
        assert!(VersionRegistry::from_config(&config).is_err());
    }
}
