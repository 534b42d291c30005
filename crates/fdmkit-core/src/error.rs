//! Error types for reconciliation against the FDM REST API.
//!
//! The reconciler recovers only a handful of narrowly identified remote
//! conditions (duplicate name on create, invalid identifier on delete,
//! expired access token). Everything else is surfaced unchanged.

use std::fmt;

use serde_json::Value;

/// Marker in a 422 body returned when an object with the same name exists.
pub const DUPLICATE_NAME_MARKER: &str = "Validation failed due to a duplicate name";

/// Marker in a 422 body returned when the referenced object id does not exist.
pub const INVALID_UUID_MARKER: &str = "Validation failed due to an invalid UUID";

const UNPROCESSABLE_ENTITY: u16 = 422;
const UNAUTHORIZED: u16 = 401;

/// A non-2xx response from the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Parsed JSON when possible, otherwise the raw text as a string.
    pub body: Value,
}

impl ApiError {
    /// Creates a new `ApiError`.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// The body flattened to text, used for marker matching.
    #[must_use]
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` for the 422 "duplicate name" rejection of a create call.
    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        self.status == UNPROCESSABLE_ENTITY && self.body_text().contains(DUPLICATE_NAME_MARKER)
    }

    /// Returns `true` for the 422 "invalid UUID" rejection of a call addressing a missing object.
    #[must_use]
    pub fn is_invalid_uuid(&self) -> bool {
        self.status == UNPROCESSABLE_ENTITY && self.body_text().contains(INVALID_UUID_MARKER)
    }

    /// Returns `true` when the server rejected the bearer token as expired or invalid.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        if self.status != UNAUTHORIZED {
            return false;
        }
        let text = self.body_text().to_lowercase();
        text.contains("token") && (text.contains("expired") || text.contains("invalid"))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body_text())
    }
}

/// Errors produced by the reconciliation core.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// An argument that must be a JSON object was something else.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The desired state is structurally insufficient.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No object matched a lookup where existence was required.
    #[error("Object not found: {what}")]
    NotFound {
        /// What was looked up, e.g. `name "Foo" at /object/networks`.
        what: String,
    },

    /// An object with the same name but a different configuration already exists.
    #[error(
        "Cannot add new object. An object with the name \"{name}\" but different parameters already exists"
    )]
    Conflict {
        /// Name of the conflicting object.
        name: String,
    },

    /// The operation is unknown or not supported by the resource type.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The remote API answered with a non-success status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Network failure, timeout or malformed response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The token-refresh collaborator failed.
    #[error("Token refresh failed: {0}")]
    AuthRefresh(String),

    /// JSON (de)serialization failure.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ApiError> for ReconcileError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl ReconcileError {
    /// Creates a new `TypeMismatch` error.
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Creates a new `UnsupportedOperation` error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation(operation.into())
    }

    /// Creates a new `Api` error.
    #[must_use]
    pub fn api(status: u16, body: Value) -> Self {
        Self::Api(ApiError::new(status, body))
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a new `AuthRefresh` error.
    #[must_use]
    pub fn auth_refresh(message: impl Into<String>) -> Self {
        Self::AuthRefresh(message.into())
    }

    /// The remote API error, if this is one.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for the remote duplicate-name rejection.
    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_duplicate_name)
    }

    /// Returns `true` for the remote invalid-identifier rejection.
    #[must_use]
    pub fn is_invalid_uuid(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_invalid_uuid)
    }

    /// Returns `true` for an expired access token.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_token_expired)
    }

    /// Returns `true` if the failure lies with the request rather than the
    /// appliance or the network.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::TypeMismatch(_)
            | Self::Validation(_)
            | Self::UnsupportedOperation(_)
            | Self::NotFound { .. }
            | Self::Conflict { .. } => true,
            Self::Api(err) => (400..500).contains(&err.status),
            Self::Transport(_) | Self::AuthRefresh(_) | Self::Json(_) => false,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TypeMismatch(_) | Self::Validation(_) | Self::UnsupportedOperation(_) => {
                ErrorCategory::Validation
            }
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Api(err) if err.is_token_expired() => ErrorCategory::Auth,
            Self::AuthRefresh(_) => ErrorCategory::Auth,
            Self::Api(_) => ErrorCategory::Remote,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Json(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Auth,
    Remote,
    Transport,
    Serialization,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Auth => write!(f, "auth"),
            Self::Remote => write!(f, "remote"),
            Self::Transport => write!(f, "transport"),
            Self::Serialization => write!(f, "serialization"),
        }
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_name_detection() {
        let err = ApiError::new(
            422,
            json!({"error": {"messages": [{"description": "Validation failed due to a duplicate name"}]}}),
        );
        assert!(err.is_duplicate_name());
        assert!(!err.is_invalid_uuid());

        let wrong_status = ApiError::new(400, json!("Validation failed due to a duplicate name"));
        assert!(!wrong_status.is_duplicate_name());
    }

    #[test]
    fn test_invalid_uuid_detection() {
        let err = ReconcileError::api(422, json!("Validation failed due to an invalid UUID"));
        assert!(err.is_invalid_uuid());
        assert!(!err.is_duplicate_name());
        assert_eq!(err.category(), ErrorCategory::Remote);
    }

    #[test]
    fn test_token_expired_detection() {
        let err = ReconcileError::api(401, json!({"message": "Access token has expired"}));
        assert!(err.is_token_expired());
        assert_eq!(err.category(), ErrorCategory::Auth);

        let bad_credentials = ReconcileError::api(401, json!({"message": "Bad credentials"}));
        assert!(!bad_credentials.is_token_expired());

        let forbidden = ReconcileError::api(403, json!({"message": "Access token has expired"}));
        assert!(!forbidden.is_token_expired());
    }

    #[test]
    fn test_error_display() {
        let err = ReconcileError::conflict("web-servers");
        assert_eq!(
            err.to_string(),
            "Cannot add new object. An object with the name \"web-servers\" but different parameters already exists"
        );

        let err = ReconcileError::api(500, json!("boom"));
        assert_eq!(err.to_string(), "API error: HTTP 500: boom");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ReconcileError::validation("no name").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ReconcileError::not_found("x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ReconcileError::transport("timeout").category(),
            ErrorCategory::Transport
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ReconcileError::validation("no name").is_client_error());
        assert!(ReconcileError::api(422, json!("bad")).is_client_error());
        assert!(!ReconcileError::api(503, json!("down")).is_client_error());
        assert!(!ReconcileError::transport("reset").is_client_error());
    }
}
