//! Document-store client that reports security-rule denials on the event hub.
//!
//! [`GuardedStore`] wraps any [`DocumentBackend`]. Every call whose backend
//! result is [`StoreError::PermissionDenied`] emits a `permission-error`
//! event describing the denied request before the error is returned.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pulsecheck_event_bus::EventHub;
use pulsecheck_types::{
    AuthIdentity, PermissionError, SecurityRuleContext, StoreOperation, path_is_under,
};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("permission denied: {operation} on '{path}'")]
    PermissionDenied {
        operation: StoreOperation,
        path: String,
    },
    #[error("document not found: '{path}'")]
    NotFound { path: String },
    #[error("document at '{path}' is not a JSON object")]
    NotAnObject { path: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, StoreError::PermissionDenied { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal document-store surface the application writes through.
///
/// Paths are slash-separated, e.g. `surveys/q3/responses/r1`.
pub trait DocumentBackend: Send + Sync {
    fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Direct children of a collection path, ordered by path
    fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>>;

    /// Replace the document, or merge top-level fields into it when `merge` is set
    fn set(&self, path: &str, data: Value, merge: bool) -> StoreResult<()>;

    /// Merge top-level fields into an existing document
    fn update(&self, path: &str, data: Value) -> StoreResult<()>;

    fn delete(&self, path: &str) -> StoreResult<()>;
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Grants `operations` on every path under `prefix`
#[derive(Debug, Clone)]
pub struct AccessRule {
    pub prefix: String,
    pub operations: Vec<StoreOperation>,
}

impl AccessRule {
    fn allows(&self, operation: StoreOperation, path: &str) -> bool {
        path_is_under(path, &self.prefix)
            && self
                .operations
                .iter()
                .any(|grant| operation.is_granted_by(*grant))
    }
}

/// In-memory backend with a deny-by-default rule table
#[derive(Default)]
pub struct MemoryBackend {
    documents: Mutex<BTreeMap<String, Value>>,
    rules: Vec<AccessRule>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `operations` under `prefix`; an empty prefix matches everything
    pub fn allow(mut self, prefix: impl Into<String>, operations: &[StoreOperation]) -> Self {
        self.rules.push(AccessRule {
            prefix: prefix.into(),
            operations: operations.to_vec(),
        });
        self
    }

    /// Insert a document bypassing the rules
    pub fn seed(self, path: &str, data: Value) -> Self {
        self.documents().insert(normalize(path).to_string(), data);
        self
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, operation: StoreOperation, path: &str) -> StoreResult<()> {
        if self.rules.iter().any(|rule| rule.allows(operation, path)) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                operation,
                path: path.to_string(),
            })
        }
    }
}

fn merge_into(path: &str, target: &mut Value, data: Value) -> StoreResult<()> {
    match (target.as_object_mut(), data) {
        (Some(target), Value::Object(fields)) => {
            target.extend(fields);
            Ok(())
        }
        _ => Err(StoreError::NotAnObject {
            path: path.to_string(),
        }),
    }
}

impl DocumentBackend for MemoryBackend {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let path = normalize(path);
        self.check(StoreOperation::Get, path)?;
        Ok(self.documents().get(path).cloned())
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        let collection = normalize(collection);
        self.check(StoreOperation::List, collection)?;
        let prefix = format!("{}/", collection);
        Ok(self
            .documents()
            .iter()
            .filter(|(path, _)| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect())
    }

    fn set(&self, path: &str, data: Value, merge: bool) -> StoreResult<()> {
        let path = normalize(path);
        self.check(StoreOperation::Write, path)?;
        let mut documents = self.documents();
        if merge {
            if let Some(existing) = documents.get_mut(path) {
                return merge_into(path, existing, data);
            }
        }
        documents.insert(path.to_string(), data);
        Ok(())
    }

    fn update(&self, path: &str, data: Value) -> StoreResult<()> {
        let path = normalize(path);
        self.check(StoreOperation::Update, path)?;
        let mut documents = self.documents();
        let existing = documents.get_mut(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        merge_into(path, existing, data)
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        let path = normalize(path);
        self.check(StoreOperation::Delete, path)?;
        self.documents().remove(path);
        Ok(())
    }
}

/// Store client that publishes permission failures to the hub
pub struct GuardedStore<B> {
    backend: B,
    hub: EventHub,
    auth: Option<AuthIdentity>,
}

impl<B: DocumentBackend> GuardedStore<B> {
    pub fn new(backend: B, hub: EventHub) -> Self {
        Self {
            backend,
            hub,
            auth: None,
        }
    }

    /// Identity attached to reported permission errors
    pub fn with_auth(mut self, auth: AuthIdentity) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn set_auth(&mut self, auth: Option<AuthIdentity>) {
        self.auth = auth;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn guard<T>(
        &self,
        operation: StoreOperation,
        path: &str,
        data: Option<&Value>,
        result: StoreResult<T>,
    ) -> StoreResult<T> {
        if let Err(StoreError::PermissionDenied { .. }) = &result {
            let mut context = SecurityRuleContext::new(operation, path);
            if let Some(data) = data {
                context = context.with_data(data.clone());
            }
            let error = PermissionError::new(context).with_auth(self.auth.clone());
            log::debug!("Reporting denied {} on '{}'", operation, path);
            let report = self.hub.emit_permission_error(error);
            if !report.is_clean() {
                log::warn!(
                    "{} permission-error handler(s) failed for '{}'",
                    report.failures.len(),
                    path
                );
            }
        }
        result
    }

    pub fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        self.guard(StoreOperation::Get, path, None, self.backend.get(path))
    }

    pub fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        self.guard(
            StoreOperation::List,
            collection,
            None,
            self.backend.list(collection),
        )
    }

    pub fn set(&self, path: &str, data: Value, merge: bool) -> StoreResult<()> {
        let result = self.backend.set(path, data.clone(), merge);
        self.guard(StoreOperation::Write, path, Some(&data), result)
    }

    pub fn update(&self, path: &str, data: Value) -> StoreResult<()> {
        let result = self.backend.update(path, data.clone());
        self.guard(StoreOperation::Update, path, Some(&data), result)
    }

    pub fn delete(&self, path: &str) -> StoreResult<()> {
        self.guard(StoreOperation::Delete, path, None, self.backend.delete(path))
    }

    /// Fire-and-forget write: failures are reported, never returned
    pub fn set_non_blocking(&self, path: &str, data: Value, merge: bool) {
        log_unreported(path, self.set(path, data, merge));
    }

    pub fn update_non_blocking(&self, path: &str, data: Value) {
        log_unreported(path, self.update(path, data));
    }

    pub fn delete_non_blocking(&self, path: &str) {
        log_unreported(path, self.delete(path));
    }
}

// Permission denials already went out on the hub.
fn log_unreported(path: &str, result: StoreResult<()>) {
    match result {
        Err(e) if !e.is_permission_denied() => {
            log::warn!("Background write to '{}' failed: {}", path, e);
        }
        _ => {}
    }
}
