//! Per-version operation dispatch.
//!
//! Operations register an explicit mapping from a version scope to their
//! handler at startup. Selection is by exact version match, falling back to
//! an all-versions binding; registration order never changes the outcome.

use serde_json::Value;
use std::sync::Arc;

use crate::error::VersionError;
use crate::version::ApiVersion;

/// Fixed reply produced by an operation handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl OperationReply {
    /// The empty success reply every demo handler returns.
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    pub fn with_body(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }
}

/// Handlers are pure, synchronous, and cannot fail.
pub type OperationHandler = Arc<dyn Fn() -> OperationReply + Send + Sync>;

/// Which resolved versions a binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionScope {
    /// Serves every declared version that has no exact binding.
    AllVersions,
    /// Serves exactly one declared version.
    Exact(ApiVersion),
}

/// One registered (operation, scope, handler) entry.
#[derive(Clone)]
pub struct OperationBinding {
    pub operation: String,
    pub scope: VersionScope,
    pub handler: OperationHandler,
}

impl std::fmt::Debug for OperationBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationBinding")
            .field("operation", &self.operation)
            .field("scope", &self.scope)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// Table of operation bindings, immutable once the service starts.
#[derive(Clone, Default)]
pub struct DispatchTable {
    bindings: Vec<OperationBinding>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an operation at the given scope.
    ///
    /// Two bindings for the same operation and scope would make selection
    /// depend on registration order, so the second is rejected.
    pub fn register(
        &mut self,
        operation: impl Into<String>,
        scope: VersionScope,
        handler: OperationHandler,
    ) -> anyhow::Result<()> {
        let operation = operation.into();
        if operation.is_empty() {
            anyhow::bail!("operation name cannot be empty");
        }
        if self
            .bindings
            .iter()
            .any(|b| b.operation == operation && b.scope == scope)
        {
            anyhow::bail!(
                "operation {:?} already has a binding for {:?}",
                operation,
                scope
            );
        }
        self.bindings.push(OperationBinding {
            operation,
            scope,
            handler,
        });
        Ok(())
    }

    /// Select the binding serving an operation at a resolved version.
    ///
    /// An exact-version binding wins; otherwise the operation's all-versions
    /// binding; otherwise the operation is not served at this version.
    pub fn select(
        &self,
        operation: &str,
        version: ApiVersion,
    ) -> Result<&OperationBinding, VersionError> {
        self.bindings
            .iter()
            .find(|b| b.operation == operation && b.scope == VersionScope::Exact(version))
            .or_else(|| {
                self.bindings
                    .iter()
                    .find(|b| b.operation == operation && b.scope == VersionScope::AllVersions)
            })
            .ok_or_else(|| VersionError::NoMatchingOperation {
                operation: operation.to_string(),
                version,
            })
    }

    /// Operation names served at a version, first-registered order, deduped.
    pub fn operations_for(&self, version: ApiVersion) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for binding in &self.bindings {
            let applies = match binding.scope {
                VersionScope::AllVersions => true,
                VersionScope::Exact(v) => v == version,
            };
            if applies && !names.contains(&binding.operation.as_str()) {
                names.push(&binding.operation);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
