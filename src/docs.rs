//! Generated per-version API documents.
//!
//! Walks the version registry and dispatch table to produce one OpenAPI-style
//! JSON document per declared version: a synthesized info block (title,
//! version, description with deprecation/sunset notices and policy links) and
//! the operations served at that version with their deprecation flags.

use serde_json::{json, Map, Value};

use crate::config::{SunsetPolicy, VersioningConfig, VersionSource};
use crate::dispatch::DispatchTable;
use crate::registry::{DeclaredVersion, VersionRegistry};

/// Media type of links rendered into document descriptions.
const RENDERED_LINK_TYPE: &str = "text/html";

/// Assemble the description text for one declared version.
///
/// Pure function over the declaration's flags and policy data. Sentences are
/// appended in fixed order: base, deprecation notice, sunset date, then an
/// HTML list of the policy's `text/html` links. Links of other media types
/// stay machine-readable on the policy but are not rendered here.
pub fn description_text(base: &str, deprecated: bool, sunset: Option<&SunsetPolicy>) -> String {
    let mut text = String::from(base);

    if deprecated {
        text.push_str(" This API version has been deprecated.");
    }

    if let Some(policy) = sunset {
        if let Some(date) = policy.effective {
            text.push_str(&format!(
                " The API will be sunset on {}.",
                date.format("%Y-%m-%d")
            ));
        }

        let rendered: Vec<_> = policy
            .links
            .iter()
            .filter(|link| link.media_type == RENDERED_LINK_TYPE)
            .collect();

        if !rendered.is_empty() {
            text.push('\n');
            text.push_str("<h4>Links</h4><ul>");
            for link in rendered {
                let label = link.title.as_deref().unwrap_or(&link.uri);
                text.push_str(&format!("<li><a href=\"{}\">{}</a></li>", link.uri, label));
            }
            text.push_str("</ul>");
        }
    }

    text
}

/// Fold a version's deprecation state into an operation's flag.
///
/// Logical OR, so applying the transform any number of times yields the same
/// flag as applying it once.
pub fn annotate_deprecated(current: bool, version_deprecated: bool) -> bool {
    current || version_deprecated
}

/// Route path an operation is served under for a given version.
///
/// URL-segment services mount operations below the version group; query and
/// header services share one mount for all versions.
pub fn operation_path(source: &VersionSource, declaration: &DeclaredVersion, operation: &str) -> String {
    match source {
        VersionSource::UrlSegment => {
            format!("/api/{}/{}", declaration.version.group_name(), operation)
        }
        VersionSource::Query { .. } | VersionSource::Header { .. } => {
            format!("/api/{}", operation)
        }
    }
}

/// Build the OpenAPI document for one declared version.
pub fn openapi_document(
    config: &VersioningConfig,
    declaration: &DeclaredVersion,
    table: &DispatchTable,
) -> Value {
    let description = description_text(
        &config.description,
        declaration.deprecated,
        declaration.sunset.as_ref(),
    );

    let mut paths = Map::new();
    for operation in table.operations_for(declaration.version) {
        let path = operation_path(&config.source, declaration, operation);
        let mut op = Map::new();
        op.insert("operationId".to_string(), json!(operation));
        if annotate_deprecated(false, declaration.deprecated) {
            op.insert("deprecated".to_string(), json!(true));
        }
        if let VersionSource::Query { name } = &config.source {
            op.insert(
                "parameters".to_string(),
                json!([{
                    "name": name,
                    "in": "query",
                    "required": false,
                    "schema": { "type": "string" },
                }]),
            );
        }
        op.insert(
            "responses".to_string(),
            json!({ "200": { "description": "OK" } }),
        );
        paths.insert(path, json!({ "get": Value::Object(op) }));
    }

    json!({
        "openapi": "3.0.1",
        "info": {
            "title": config.title,
            "version": declaration.version.as_token(),
            "description": description,
        },
        "paths": Value::Object(paths),
    })
}

/// Build every version's document, keyed by group name, in declared order.
pub fn version_documents(
    config: &VersioningConfig,
    registry: &VersionRegistry,
    table: &DispatchTable,
) -> Vec<(String, Value)> {
    registry
        .iter()
        .map(|declaration| {
            (
                declaration.version.group_name(),
                openapi_document(config, declaration, table),
            )
        })
        .collect()
}
