use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Names of the events the application bus recognizes.
///
/// Each name is tied to exactly one payload type through [`AppEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A document-store request was rejected by the security rules.
    /// Payload: [`PermissionError`].
    PermissionError,
}

impl EventName {
    /// Wire name used by producers and consumers outside the bus.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::PermissionError => "permission-error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event paired with its payload
#[derive(Clone, Debug)]
pub enum AppEvent {
    PermissionError(PermissionError),
}

impl AppEvent {
    pub fn name(&self) -> EventName {
        match self {
            AppEvent::PermissionError(_) => EventName::PermissionError,
        }
    }
}

/// Document-store operations as named by the security rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOperation {
    Get,
    List,
    Create,
    Update,
    Delete,
    Write,
}

impl StoreOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Get => "get",
            StoreOperation::List => "list",
            StoreOperation::Create => "create",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
            StoreOperation::Write => "write",
        }
    }

    /// Whether a rule granting `grant` allows this operation.
    ///
    /// `write` grants every mutating operation; everything else only grants itself.
    pub fn is_granted_by(&self, grant: StoreOperation) -> bool {
        if *self == grant {
            return true;
        }
        grant == StoreOperation::Write
            && matches!(
                self,
                StoreOperation::Create | StoreOperation::Update | StoreOperation::Delete
            )
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the signed-in caller at the time of the request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthIdentity {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The request a security rule evaluated and denied
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityRuleContext {
    /// Document or collection path, relative to the database root
    pub path: String,
    pub operation: StoreOperation,
    /// Document data sent with a write, if any
    pub request_resource_data: Option<Value>,
}

impl SecurityRuleContext {
    pub fn new(operation: StoreOperation, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operation,
            request_resource_data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.request_resource_data = Some(data);
        self
    }
}

/// Whether `path` is `prefix` itself or lies below it.
///
/// Compares whole segments, so `users` covers `users/u1` but not
/// `users_private/u1`. An empty prefix covers every path.
pub fn path_is_under(path: &str, prefix: &str) -> bool {
    let path = path.trim_matches('/');
    let prefix = prefix.trim_matches('/');
    prefix.is_empty()
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

const DENIED_PREFIX: &str = "Missing or insufficient permissions: The following request was denied by Firestore Security Rules:";

/// Payload of the `permission-error` event.
///
/// Renders the denied request as JSON so a developer can paste it into the
/// rules simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionError {
    pub context: SecurityRuleContext,
    pub auth: Option<AuthIdentity>,
}

impl PermissionError {
    pub fn new(context: SecurityRuleContext) -> Self {
        Self {
            context,
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: Option<AuthIdentity>) -> Self {
        self.auth = auth;
        self
    }

    pub fn path(&self) -> &str {
        &self.context.path
    }

    pub fn operation(&self) -> StoreOperation {
        self.context.operation
    }

    /// The denied request in the shape the rules engine sees it
    pub fn request(&self) -> Value {
        let mut request = Map::new();
        request.insert(
            "auth".to_string(),
            serde_json::to_value(&self.auth).unwrap_or(Value::Null),
        );
        request.insert(
            "method".to_string(),
            Value::String(self.context.operation.as_str().to_string()),
        );
        request.insert(
            "path".to_string(),
            Value::String(format!(
                "/databases/(default)/documents/{}",
                self.context.path.trim_start_matches('/')
            )),
        );
        if let Some(data) = &self.context.request_resource_data {
            request.insert("resource".to_string(), json!({ "data": data }));
        }
        Value::Object(request)
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.request();
        let rendered =
            serde_json::to_string_pretty(&request).unwrap_or_else(|_| request.to_string());
        write!(f, "{}\n{}", DENIED_PREFIX, rendered)
    }
}

impl std::error::Error for PermissionError {}
