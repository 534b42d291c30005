//! Typed resources.
//!
//! A [`ConfigResource`] ties a serde model to its collection URL and the
//! operations the API exposes for it. [`ResourceClient`] runs those
//! operations through a [`Reconciler`], so typed callers get the same
//! idempotent behaviour as raw operations.

use std::marker::PhantomData;

use futures_util::stream::TryStreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ReconcileError, Result};
use crate::object::{ConfigObject, OBJECT_ID_PARAM, into_object};
use crate::operation::ResourceOperation;
use crate::paging::{ListParams, iterate_pages, page_fetcher};
use crate::reconciler::{DeleteOutcome, Reconciler, item_url};
use crate::transport::{ApiRequest, Params, Transport};

/// A configuration object type managed through the API.
pub trait ConfigResource: Serialize + DeserializeOwned + Send + Sync {
    /// Type name used in operation names, e.g. `NetworkObject`.
    const TYPE_NAME: &'static str;

    /// Collection URL relative to the API base, e.g. `/object/networks`.
    const COLLECTION_URL: &'static str;

    /// Operations the API supports for this type.
    const OPERATIONS: &'static [ResourceOperation] = &ResourceOperation::ALL;

    fn name(&self) -> Option<&str>;

    fn id(&self) -> Option<&str>;

    /// `<collection>/{objId}`.
    fn item_url() -> String {
        item_url(Self::COLLECTION_URL)
    }

    fn supports(operation: ResourceOperation) -> bool {
        Self::OPERATIONS.contains(&operation)
    }

    /// Serializes into the wire object.
    fn to_object(&self) -> Result<ConfigObject> {
        into_object(serde_json::to_value(self)?, Self::TYPE_NAME)
    }

    /// Deserializes a server response.
    fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Runs the operations of one resource type.
#[derive(Debug)]
pub struct ResourceClient<R, T> {
    reconciler: Reconciler<T>,
    _resource: PhantomData<fn() -> R>,
}

impl<R, T> ResourceClient<R, T>
where
    R: ConfigResource,
    T: Transport,
{
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_reconciler(Reconciler::new(transport))
    }

    #[must_use]
    pub fn with_reconciler(reconciler: Reconciler<T>) -> Self {
        Self {
            reconciler,
            _resource: PhantomData,
        }
    }

    /// Whether any operation run through this client changed the configuration.
    #[must_use]
    pub fn config_changed(&self) -> bool {
        self.reconciler.config_changed()
    }

    /// Creates `resource` unless an equal object with its name exists.
    pub async fn add(&mut self, resource: &R) -> Result<R> {
        self.ensure_supported(ResourceOperation::Add)?;
        let response = self
            .reconciler
            .ensure_present(
                R::COLLECTION_URL,
                resource.to_object()?,
                &Params::new(),
                &Params::new(),
            )
            .await?;
        R::from_value(response)
    }

    /// Updates the object with `resource`'s id.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Validation` if `resource` carries no id.
    pub async fn edit(&mut self, resource: &R) -> Result<R> {
        self.ensure_supported(ResourceOperation::Edit)?;
        let id = resource.id().ok_or_else(|| {
            ReconcileError::validation(format!("{} to edit has no id", R::TYPE_NAME))
        })?;
        let response = self
            .reconciler
            .update(&R::item_url(), resource.to_object()?, &id_param(id))
            .await?;
        R::from_value(response)
    }

    pub async fn delete(&mut self, id: &str) -> Result<DeleteOutcome> {
        self.ensure_supported(ResourceOperation::Delete)?;
        self.reconciler.delete(&R::item_url(), &id_param(id)).await
    }

    pub async fn get(&self, id: &str) -> Result<R> {
        self.ensure_supported(ResourceOperation::Get)?;
        let request = ApiRequest::get(R::item_url()).with_path_params(id_param(id));
        R::from_value(self.reconciler.send_request(&request).await?)
    }

    /// Lists every object, following pagination.
    pub async fn list(&self, params: ListParams) -> Result<Vec<R>> {
        self.ensure_supported(ResourceOperation::GetList)?;
        let path_params = Params::new();
        let fetch = page_fetcher(self.reconciler.transport(), R::COLLECTION_URL, &path_params);
        iterate_pages(fetch, params)
            .and_then(|item| async move { R::from_value(Value::Object(item)) })
            .try_collect()
            .await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<R>> {
        self.ensure_supported(ResourceOperation::GetByName)?;
        self.reconciler
            .get_object_by_name(R::COLLECTION_URL, name, &Params::new())
            .await?
            .map(|obj| R::from_value(Value::Object(obj)))
            .transpose()
    }

    /// Creates `resource`, or updates the same-named object if it exists.
    pub async fn upsert(&mut self, resource: &R) -> Result<R> {
        self.ensure_supported(ResourceOperation::Upsert)?;
        let response = self
            .reconciler
            .ensure_present_or_update(R::COLLECTION_URL, resource.to_object()?, &Params::new())
            .await?;
        R::from_value(response)
    }

    pub async fn edit_by_name(&mut self, resource: &R) -> Result<R> {
        self.ensure_supported(ResourceOperation::EditByName)?;
        let response = self
            .reconciler
            .edit_by_name(R::COLLECTION_URL, resource.to_object()?, &Params::new())
            .await?;
        R::from_value(response)
    }

    pub async fn delete_by_name(&mut self, name: &str) -> Result<DeleteOutcome> {
        self.ensure_supported(ResourceOperation::DeleteByName)?;
        self.reconciler
            .delete_by_name(R::COLLECTION_URL, name, &Params::new())
            .await
    }

    /// Runs `operation` with untyped parameters.
    ///
    /// `params` may carry `data` (the object payload), `objId`, `name`, and
    /// the list parameters `offset`, `limit`, `filter` and `sort`. Payloads
    /// are passed through as JSON, so fields the model does not know about
    /// survive.
    pub async fn execute(
        &mut self,
        operation: ResourceOperation,
        params: &ConfigObject,
    ) -> Result<Value> {
        self.ensure_supported(operation)?;
        debug!(resource = R::TYPE_NAME, %operation, "executing resource operation");

        let url = R::COLLECTION_URL;
        let no_params = Params::new();
        match operation {
            ResourceOperation::Add => {
                self.reconciler
                    .ensure_present(url, data_param(params)?, &no_params, &no_params)
                    .await
            }
            ResourceOperation::Edit => {
                let id = string_param(params, OBJECT_ID_PARAM)?;
                self.reconciler
                    .update(&R::item_url(), data_param(params)?, &id_param(id))
                    .await
            }
            ResourceOperation::Delete => {
                let id = string_param(params, OBJECT_ID_PARAM)?;
                Ok(self.delete(id).await?.into_response())
            }
            ResourceOperation::Get => {
                let id = string_param(params, OBJECT_ID_PARAM)?;
                let request = ApiRequest::get(R::item_url()).with_path_params(id_param(id));
                self.reconciler.send_request(&request).await
            }
            ResourceOperation::GetList => {
                let list_params = ListParams::from_object(params)?;
                let fetch = page_fetcher(self.reconciler.transport(), url, &no_params);
                let items: Vec<Value> = iterate_pages(fetch, list_params)
                    .map_ok(Value::Object)
                    .try_collect()
                    .await?;
                Ok(Value::Array(items))
            }
            ResourceOperation::GetByName => {
                let name = string_param(params, "name")?;
                Ok(self
                    .reconciler
                    .get_object_by_name(url, name, &no_params)
                    .await?
                    .map_or(Value::Null, Value::Object))
            }
            ResourceOperation::Upsert => {
                self.reconciler
                    .ensure_present_or_update(url, data_param(params)?, &no_params)
                    .await
            }
            ResourceOperation::EditByName => {
                self.reconciler
                    .edit_by_name(url, data_param(params)?, &no_params)
                    .await
            }
            ResourceOperation::DeleteByName => {
                let name = string_param(params, "name")?;
                Ok(self.delete_by_name(name).await?.into_response())
            }
        }
    }

    fn ensure_supported(&self, operation: ResourceOperation) -> Result<()> {
        if R::supports(operation) {
            Ok(())
        } else {
            Err(ReconcileError::unsupported(
                operation.operation_name(R::TYPE_NAME),
            ))
        }
    }
}

fn id_param(id: &str) -> Params {
    Params::from([(OBJECT_ID_PARAM.to_string(), id.to_string())])
}

fn data_param(params: &ConfigObject) -> Result<ConfigObject> {
    match params.get("data") {
        Some(Value::Object(data)) => Ok(data.clone()),
        Some(_) => Err(ReconcileError::type_mismatch("data must be a JSON object")),
        None => Err(ReconcileError::validation("missing required parameter: data")),
    }
}

fn string_param<'a>(params: &'a ConfigObject, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ReconcileError::validation(format!("missing required parameter: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_param() {
        let params = json!({"data": {"name": "a"}});
        let data = data_param(params.as_object().unwrap()).unwrap();
        assert_eq!(data.get("name"), Some(&json!("a")));

        let params = json!({"data": [1]});
        assert!(matches!(
            data_param(params.as_object().unwrap()),
            Err(ReconcileError::TypeMismatch(_))
        ));
        assert!(matches!(
            data_param(&ConfigObject::new()),
            Err(ReconcileError::Validation(_))
        ));
    }

    #[test]
    fn test_string_param() {
        let params = json!({"objId": "abc", "name": ""});
        let params = params.as_object().unwrap();
        assert_eq!(string_param(params, "objId").unwrap(), "abc");
        assert!(string_param(params, "name").is_err());
        assert!(string_param(params, "missing").is_err());
    }
}
