//! Operation names and dispatch.
//!
//! API operations are addressed by name (`addNetworkObject`,
//! `getRadiusIdentitySourceList`, ...). Names are resolved once into typed
//! values: [`OperationSpec`] for raw endpoint operations, [`OperationKind`]
//! for the reconciliation behaviour they get, and [`ResourceOperation`] for
//! the operations a typed resource supports.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{ReconcileError, Result};
use crate::object::ConfigObject;
use crate::reconciler::{Reconciler, item_url};
use crate::resource::ConfigResource;
use crate::transport::{ApiRequest, HttpMethod, Params, Transport};

/// How a raw operation is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `add*` + POST: ensure present.
    Add,
    /// `edit*` + PUT: update if different.
    Edit,
    /// `delete*` + DELETE: delete, absent is fine.
    Delete,
    /// Anything else is sent as is.
    Other,
}

impl OperationKind {
    /// Classifies an operation by name prefix and method.
    ///
    /// Some endpoints expose non-CRUD operations, so the method alone is not
    /// enough.
    #[must_use]
    pub fn classify(operation_name: &str, method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post if operation_name.starts_with("add") => Self::Add,
            HttpMethod::Put if operation_name.starts_with("edit") => Self::Edit,
            HttpMethod::Delete if operation_name.starts_with("delete") => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// Method and URL of an API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub method: HttpMethod,
    pub url: String,
}

impl OperationSpec {
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }
}

/// Operations a typed resource can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    Add,
    Delete,
    Edit,
    Get,
    GetList,
    GetByName,
    Upsert,
    EditByName,
    DeleteByName,
}

impl ResourceOperation {
    pub const ALL: [Self; 9] = [
        Self::Add,
        Self::Delete,
        Self::Edit,
        Self::Get,
        Self::GetList,
        Self::GetByName,
        Self::Upsert,
        Self::EditByName,
        Self::DeleteByName,
    ];

    /// The operation name for a resource type, e.g. `getNetworkObjectList`.
    #[must_use]
    pub fn operation_name(&self, type_name: &str) -> String {
        match self {
            Self::Add => format!("add{type_name}"),
            Self::Delete => format!("delete{type_name}"),
            Self::Edit => format!("edit{type_name}"),
            Self::Get => format!("get{type_name}"),
            Self::GetList => format!("get{type_name}List"),
            Self::GetByName => format!("get{type_name}ByName"),
            Self::Upsert => format!("upsert{type_name}"),
            Self::EditByName => format!("edit{type_name}ByName"),
            Self::DeleteByName => format!("delete{type_name}ByName"),
        }
    }

    /// Resolves an operation name for a resource type.
    #[must_use]
    pub fn parse(operation_name: &str, type_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.operation_name(type_name) == operation_name)
    }

    /// The single endpoint call behind this operation, if it maps to one.
    /// Composite operations (upsert and the by-name variants) return `None`.
    #[must_use]
    pub fn endpoint(&self, collection_url: &str) -> Option<OperationSpec> {
        match self {
            Self::Add => Some(OperationSpec::new(HttpMethod::Post, collection_url)),
            Self::GetList => Some(OperationSpec::new(HttpMethod::Get, collection_url)),
            Self::Get => Some(OperationSpec::new(HttpMethod::Get, item_url(collection_url))),
            Self::Edit => Some(OperationSpec::new(HttpMethod::Put, item_url(collection_url))),
            Self::Delete => Some(OperationSpec::new(
                HttpMethod::Delete,
                item_url(collection_url),
            )),
            Self::GetByName | Self::Upsert | Self::EditByName | Self::DeleteByName => None,
        }
    }
}

impl fmt::Display for ResourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operation_name(""))
    }
}

/// Endpoint operations known by name.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    specs: BTreeMap<String, OperationSpec>,
}

impl OperationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every resource type bundled in [`crate::models`].
    #[must_use]
    pub fn with_builtin_resources() -> Self {
        use crate::models::{
            InternalCertificate, NetworkObject, RadiusIdentitySource,
            SecurityIntelligenceNetworkPolicy,
        };

        Self::new()
            .register::<NetworkObject>()
            .register::<RadiusIdentitySource>()
            .register::<InternalCertificate>()
            .register::<SecurityIntelligenceNetworkPolicy>()
    }

    /// Registers the endpoint operations a resource type supports.
    #[must_use]
    pub fn register<R: ConfigResource>(mut self) -> Self {
        for op in R::OPERATIONS {
            if let Some(spec) = op.endpoint(R::COLLECTION_URL) {
                self.specs.insert(op.operation_name(R::TYPE_NAME), spec);
            }
        }
        self
    }

    /// Looks up an operation by name.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::UnsupportedOperation` for unknown names.
    pub fn get(&self, name: &str) -> Result<&OperationSpec> {
        self.specs.get(name).ok_or_else(|| {
            ReconcileError::unsupported(format!("Invalid operation name provided: {name}"))
        })
    }

    /// Names of all registered operations.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }
}

/// Executes a named endpoint operation with reconciliation semantics.
///
/// `add*` operations are idempotent creates, `edit*` operations skip the
/// write when nothing changed, `delete*` operations tolerate an already
/// absent object. Everything else is sent unchanged.
pub async fn run_operation<T: Transport>(
    reconciler: &mut Reconciler<T>,
    name: &str,
    spec: &OperationSpec,
    data: Option<ConfigObject>,
    path_params: &Params,
    query_params: &Params,
) -> Result<Value> {
    let require_data = |data: Option<ConfigObject>| {
        data.ok_or_else(|| ReconcileError::validation(format!("{name} requires data")))
    };

    match OperationKind::classify(name, spec.method) {
        OperationKind::Add => {
            reconciler
                .ensure_present(&spec.url, require_data(data)?, path_params, query_params)
                .await
        }
        OperationKind::Edit => {
            reconciler
                .update(&spec.url, require_data(data)?, path_params)
                .await
        }
        OperationKind::Delete => Ok(reconciler
            .delete(&spec.url, path_params)
            .await?
            .into_response()),
        OperationKind::Other => {
            let mut request = ApiRequest::new(spec.method, spec.url.clone())
                .with_path_params(path_params.clone())
                .with_query_params(query_params.clone());
            if let Some(data) = data {
                request = request.with_body(data);
            }
            reconciler.send_request(&request).await
        }
    }
}
