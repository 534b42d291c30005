//! Transport abstraction.
//!
//! The core never talks HTTP itself. Every remote call goes through a
//! [`Transport`], which takes an [`ApiRequest`] and returns the decoded JSON
//! response or a [`ReconcileError`]. Non-2xx responses must be reported as
//! [`ReconcileError::Api`] so the reconciler can recognise the few remote
//! conditions it recovers from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ReconcileError, Result};
use crate::object::ConfigObject;

/// Path or query parameters, keyed by name.
pub type Params = BTreeMap<String, String>;

/// HTTP methods used by the FDM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a call with this method changes remote state.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(ReconcileError::validation(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

/// A single call against the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path relative to the API base, with `{name}` placeholders.
    pub url_path: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub path_params: Params,
    pub query_params: Params,
}

impl ApiRequest {
    /// Creates a request without body or parameters.
    #[must_use]
    pub fn new(method: HttpMethod, url_path: impl Into<String>) -> Self {
        Self {
            url_path: url_path.into(),
            method,
            body: None,
            path_params: Params::new(),
            query_params: Params::new(),
        }
    }

    #[must_use]
    pub fn get(url_path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url_path)
    }

    #[must_use]
    pub fn post(url_path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url_path)
    }

    #[must_use]
    pub fn put(url_path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url_path)
    }

    #[must_use]
    pub fn delete(url_path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url_path)
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: ConfigObject) -> Self {
        self.body = Some(Value::Object(body));
        self
    }

    /// Replaces the path parameters.
    #[must_use]
    pub fn with_path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.query_params = params;
        self
    }

    /// The URL path with every placeholder substituted.
    pub fn rendered_path(&self) -> Result<String> {
        render_path(&self.url_path, &self.path_params)
    }
}

/// Substitutes `{name}` placeholders in `url_path` with values from `params`.
///
/// # Errors
///
/// Returns `ReconcileError::Validation` if a placeholder has no value, a
/// placeholder is unterminated, or a value contains `/`.
pub fn render_path(url_path: &str, params: &Params) -> Result<String> {
    let mut out = String::with_capacity(url_path.len());
    let mut rest = url_path;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            ReconcileError::validation(format!("unterminated placeholder in {url_path}"))
        })?;
        let name = &after[..end];
        let value = params.get(name).ok_or_else(|| {
            ReconcileError::validation(format!(
                "missing path parameter '{name}' for {url_path}"
            ))
        })?;
        if value.contains('/') {
            return Err(ReconcileError::validation(format!(
                "path parameter '{name}' must not contain '/'"
            )));
        }
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// The sole transport primitive the core depends on.
///
/// Implementations perform exactly one network request per call and never
/// retry on their own; retry policy lives in [`crate::auth`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the decoded JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Api` for non-2xx responses and
    /// `ReconcileError::Transport` for network failures, timeouts and
    /// malformed responses.
    async fn send_request(&self, request: &ApiRequest) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        (**self).send_request(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        (**self).send_request(request).await
    }
}
