//! HTTP surface for a versioned service.
//!
//! Builds the axum router for the configured token source, plus the
//! generated-documentation, health, and metrics endpoints. The version token
//! is extracted here and handed to the core as a plain string.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::VersionSource;
use crate::service::{ServiceResponse, VersionedService};

/// Build the router for a configured service.
pub fn build_router(service: Arc<VersionedService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    let api = match &service.config().source {
        VersionSource::UrlSegment => {
            Router::new().route("/api/:version/:operation", get(segment_operation))
        }
        VersionSource::Query { .. } => Router::new().route("/api/:operation", get(query_operation)),
        VersionSource::Header { .. } => {
            Router::new().route("/api/:operation", get(header_operation))
        }
    };

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/openapi/:document", get(openapi_document))
        .merge(api);

    if service.config().metrics.enabled {
        router = router.route("/metrics", get(metrics));
    }

    router.layer(cors).with_state(service)
}

/// Strip the "v" the URL mount prepends: "/api/v1/ping" carries segment "v1",
/// the core expects token "1".
fn version_token_from_segment(segment: &str) -> &str {
    segment.strip_prefix('v').unwrap_or(segment)
}

/// Group name for a document path: "v1.json" -> "v1".
fn group_from_document(document: &str) -> Option<&str> {
    document.strip_suffix(".json")
}

async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn segment_operation(
    State(service): State<Arc<VersionedService>>,
    Path((version, operation)): Path<(String, String)>,
) -> Response {
    let token = version_token_from_segment(&version);
    run(&service, &operation, Some(token))
}

async fn query_operation(
    State(service): State<Arc<VersionedService>>,
    Path(operation): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = match &service.config().source {
        VersionSource::Query { name } => params.get(name).map(String::as_str),
        _ => None,
    };
    run(&service, &operation, token)
}

async fn header_operation(
    State(service): State<Arc<VersionedService>>,
    Path(operation): Path<String>,
    request_headers: HeaderMap,
) -> Response {
    let token = match &service.config().source {
        VersionSource::Header { name } => request_headers
            .get(name.as_str())
            .and_then(|value| value.to_str().ok()),
        _ => None,
    };
    run(&service, &operation, token)
}

async fn openapi_document(
    State(service): State<Arc<VersionedService>>,
    Path(document): Path<String>,
) -> Response {
    let doc = group_from_document(&document).and_then(|group| service.document(group));
    match doc {
        Some(doc) => Json(doc).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "unknown_document",
                "message": format!("no generated document named {:?}", document),
            })),
        )
            .into_response(),
    }
}

async fn metrics(State(service): State<Arc<VersionedService>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        service.metrics().encode(),
    )
        .into_response()
}

fn run(service: &VersionedService, operation: &str, token: Option<&str>) -> Response {
    let outcome = match service.handle(operation, token) {
        Ok(response) => response,
        Err(err) => service.error_response(&err),
    };
    into_response(outcome)
}

fn into_response(outcome: ServiceResponse) -> Response {
    let status =
        StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &outcome.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }

    match outcome.body {
        Some(body) => (status, headers, Json(body)).into_response(),
        None => (status, headers).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersioningConfig;
    use crate::dispatch::{DispatchTable, OperationReply, VersionScope};
    use crate::version::ApiVersion;

    fn service(source_yaml: &str) -> Arc<VersionedService> {
        let yaml = format!(
            r#"
{source_yaml}
versions:
  - version: "1"
  - version: "2"
"#
        );
        let config: VersioningConfig = serde_yaml::from_str(&yaml).unwrap();
        let mut dispatch = DispatchTable::new();
        dispatch
            .register(
                "ping",
                VersionScope::Exact(ApiVersion::Number(1)),
                Arc::new(OperationReply::ok),
            )
            .unwrap();
        Arc::new(VersionedService::new(config, dispatch).unwrap())
    }

    #[test]
    fn test_version_token_from_segment() {
        assert_eq!(version_token_from_segment("v1"), "1");
        assert_eq!(version_token_from_segment("v2024-01-01"), "2024-01-01");
        // A bare token passes through untouched.
        assert_eq!(version_token_from_segment("1"), "1");
    }

    #[test]
    fn test_group_from_document() {
        assert_eq!(group_from_document("v1.json"), Some("v1"));
        assert_eq!(group_from_document("v2024-01-01.json"), Some("v2024-01-01"));
        assert_eq!(group_from_document("v1"), None);
    }

    #[test]
    fn test_build_router_for_each_source() {
        build_router(service("source:\n  type: url_segment"));
        build_router(service("source:\n  type: query\n  name: api-version"));
        build_router(service("source:\n  type: header\n  name: x-api-version"));
    }

    #[test]
    fn test_into_response_status() {
        let response = into_response(ServiceResponse {
            status: 404,
            body: Some(json!({ "error": "no_matching_operation" })),
            headers: vec![("api-supported-versions".to_string(), "1, 2".to_string())],
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("api-supported-versions").unwrap(),
            "1, 2"
        );
    }
}
