//! Versioned service core.
//!
//! Owns the immutable registry, resolver, and dispatch table built at
//! startup, and runs the per-request flow: resolve the version token, select
//! the operation's handler, invoke it, and attach lifecycle and reporting
//! headers. Shared read-only across all concurrent requests.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::VersioningConfig;
use crate::dispatch::DispatchTable;
use crate::docs;
use crate::error::VersionError;
use crate::headers;
use crate::metrics::VersioningMetrics;
use crate::registry::VersionRegistry;
use crate::resolver::VersionResolver;
use crate::version::ApiVersion;

/// Outcome of a handled request, ready for the transport layer.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

/// A configured versioned API service.
pub struct VersionedService {
    config: VersioningConfig,
    registry: VersionRegistry,
    resolver: VersionResolver,
    dispatch: DispatchTable,
    metrics: VersioningMetrics,
}

impl VersionedService {
    /// Build a service from validated configuration and a dispatch table.
    pub fn new(config: VersioningConfig, dispatch: DispatchTable) -> anyhow::Result<Self> {
        config.validate()?;

        let registry = VersionRegistry::from_config(&config)?;
        let default_version = config
            .default_version
            .as_deref()
            .map(|token| {
                ApiVersion::parse(token, config.format)
                    .map_err(|_| anyhow::anyhow!("default_version {:?} is malformed", token))
            })
            .transpose()?;
        let resolver = VersionResolver::new(
            config.format,
            default_version,
            config.assume_default_when_unspecified,
        );
        let metrics = VersioningMetrics::new(&config.metrics.prefix);

        // Initialize days_until_sunset gauges for all declared versions
        let today = Utc::now().date_naive();
        for declaration in registry.iter() {
            if let Some(date) = declaration.sunset.as_ref().and_then(|p| p.effective) {
                let days = (date - today).num_days();
                metrics.set_days_until_sunset(&declaration.version.as_token(), days);
            }
        }

        info!(
            versions = registry.len(),
            bindings = dispatch.len(),
            "versioned service initialized"
        );

        Ok(Self {
            config,
            registry,
            resolver,
            dispatch,
            metrics,
        })
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &VersioningMetrics {
        &self.metrics
    }

    /// Handle one request: resolve the token, dispatch the operation, invoke
    /// its handler, and attach response metadata.
    pub fn handle(
        &self,
        operation: &str,
        raw_token: Option<&str>,
    ) -> Result<ServiceResponse, VersionError> {
        let version = self
            .resolver
            .resolve(&self.registry, raw_token)
            .map_err(|err| self.reject(raw_token, &err))?;

        let binding = self
            .dispatch
            .select(operation, version)
            .map_err(|err| self.reject(raw_token, &err))?;

        let reply = (binding.handler)();

        // The resolver only returns declared versions.
        let declaration = self
            .registry
            .find(version)
            .ok_or(VersionError::UnsupportedVersion { version })?;

        if declaration.deprecated && self.config.log_access {
            info!(
                version = %version,
                operation = %operation,
                "deprecated version accessed"
            );
        }

        let mut response_headers = Vec::new();
        if self.config.report_versions {
            response_headers.extend(headers::report_headers(&self.registry, &self.config.headers));
        }
        response_headers.extend(headers::lifecycle_headers(declaration, &self.config.headers));

        self.metrics
            .record_request(&version.as_token(), operation, "ok");

        Ok(ServiceResponse {
            status: reply.status,
            body: reply.body,
            headers: response_headers,
        })
    }

    /// Shape an error into the transport-facing response, version report
    /// headers included.
    pub fn error_response(&self, err: &VersionError) -> ServiceResponse {
        let headers = if self.config.report_versions {
            headers::report_headers(&self.registry, &self.config.headers)
        } else {
            Vec::new()
        };

        ServiceResponse {
            status: err.status_code(),
            body: Some(err.response_body()),
            headers,
        }
    }

    /// Generated document for a group name, if that group is declared.
    pub fn document(&self, group: &str) -> Option<Value> {
        let declaration = self.registry.find_by_group(group)?;
        self.metrics.record_document(group);
        Some(docs::openapi_document(
            &self.config,
            declaration,
            &self.dispatch,
        ))
    }

    /// All generated documents keyed by group name, declared order.
    pub fn documents(&self) -> Vec<(String, Value)> {
        docs::version_documents(&self.config, &self.registry, &self.dispatch)
    }

    fn reject(&self, raw_token: Option<&str>, err: &VersionError) -> VersionError {
        debug!(token = ?raw_token, error = %err, "request rejected");
        self.metrics.record_rejection(err.code());
        err.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{OperationHandler, OperationReply, VersionScope};
    use std::sync::Arc;

    fn ok_handler() -> OperationHandler {
        Arc::new(OperationReply::ok)
    }

    fn test_service() -> VersionedService {
        let config: VersioningConfig = serde_yaml::from_str(
            r#"
title: Route Versioning Web API
default_version: "1"
assume_default_when_unspecified: true
versions:
  - version: "1"
    deprecated: true
    sunset:
      effective: 2030-06-01
      links:
        - uri: https://docs.example.com/version-policies
          title: Version Policies
  - version: "2"
"#,
        )
        .unwrap();

        let mut dispatch = DispatchTable::new();
        dispatch
            .register("ping", VersionScope::Exact(ApiVersion::Number(1)), ok_handler())
            .unwrap();
        dispatch
            .register("ping", VersionScope::Exact(ApiVersion::Number(2)), ok_handler())
            .unwrap();
        dispatch
            .register("pong", VersionScope::Exact(ApiVersion::Number(2)), ok_handler())
            .unwrap();
        dispatch
            .register("status", VersionScope::AllVersions, ok_handler())
            .unwrap();

        VersionedService::new(config, dispatch).unwrap()
    }

    fn header<'a>(response: &'a ServiceResponse, name: &str) -> Option<&'a str> {
        response
            .headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_handle_ok() {
        let service = test_service();
        let response = service.handle("ping", Some("2")).unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.is_none());
        assert_eq!(header(&response, "api-supported-versions"), Some("1, 2"));
        // Version 2 is healthy, no lifecycle headers.
        assert!(header(&response, "Deprecation").is_none());
    }

    #[test]
    fn test_handle_deprecated_version_attaches_lifecycle_headers() {
        let service = test_service();
        let response = service.handle("ping", Some("1")).unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(header(&response, "Deprecation"), Some("true"));
        assert!(header(&response, "Sunset").unwrap().contains("2030"));
        assert!(header(&response, "Link").unwrap().contains("rel=\"sunset\""));
    }

    #[test]
    fn test_handle_assumes_default() {
        let service = test_service();
        let response = service.handle("ping", None).unwrap();

        assert_eq!(response.status, 200);
        // Default is version 1, which is deprecated.
        assert_eq!(header(&response, "Deprecation"), Some("true"));
    }

    #[test]
    fn test_handle_unsupported_version() {
        let service = test_service();
        let err = service.handle("ping", Some("3")).unwrap_err();

        assert!(matches!(err, VersionError::UnsupportedVersion { .. }));
        let response = service.error_response(&err);
        assert_eq!(response.status, 400);
        // Error responses still report the declared versions.
        assert_eq!(header(&response, "api-supported-versions"), Some("1, 2"));
        assert_eq!(response.body.unwrap()["error"], "unsupported_version");
    }

    #[test]
    fn test_handle_unknown_operation() {
        let service = test_service();

        // "pong" exists only at version 2.
        let err = service.handle("pong", Some("1")).unwrap_err();
        assert!(matches!(err, VersionError::NoMatchingOperation { .. }));
        assert_eq!(service.error_response(&err).status, 404);

        // "status" is bound for all versions.
        assert!(service.handle("status", Some("1")).is_ok());
    }

    #[test]
    fn test_rejections_recorded() {
        let service = test_service();
        let _ = service.handle("ping", Some("abc"));
        let _ = service.handle("ping", Some("9"));

        let output = service.metrics().encode();
        assert!(output.contains("invalid_version_format"));
        assert!(output.contains("unsupported_version"));
    }

    #[test]
    fn test_document_lookup() {
        let service = test_service();

        let doc = service.document("v1").unwrap();
        assert_eq!(doc["info"]["version"], "1");
        assert!(doc["paths"]["/api/v1/ping"]["get"]["deprecated"] == true);

        assert!(service.document("v9").is_none());

        let groups: Vec<_> = service.documents().into_iter().map(|(g, _)| g).collect();
        assert_eq!(groups, vec!["v1", "v2"]);
    }
}
