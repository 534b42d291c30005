//! Idempotent add/update/delete of named configuration objects.
//!
//! A [`Reconciler`] is created per invocation and records whether any
//! mutating call went through in [`Reconciler::config_changed`]. Lookups and
//! comparisons decide whether a write is needed at all; the transport is
//! expected to handle token refresh (see [`crate::auth`]).

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::compare::objects_equal;
use crate::error::{ReconcileError, Result};
use crate::object::{
    ConfigObject, OBJECT_ID_PARAM, copy_identity_fields, is_falsy, object_id, object_name,
};
use crate::paging::{ListParams, find_by_name, page_fetcher};
use crate::transport::{ApiRequest, HttpMethod, Params, Transport};

/// Response body returned for a delete of an object that does not exist.
pub const ABSENT_OBJECT_RESPONSE: &str = "Referenced object does not exist";

/// Result of a delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The object was deleted; carries the server response.
    Deleted(Value),
    /// The server reported the identifier as unknown, nothing to delete.
    AlreadyAbsent,
}

impl DeleteOutcome {
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    /// The response to report to the caller.
    #[must_use]
    pub fn into_response(self) -> Value {
        match self {
            Self::Deleted(response) => response,
            Self::AlreadyAbsent => serde_json::json!({ "response": ABSENT_OBJECT_RESPONSE }),
        }
    }
}

/// Item URL for a collection URL: `<url>/{objId}`.
#[must_use]
pub fn item_url(collection_url: &str) -> String {
    format!(
        "{}/{{{OBJECT_ID_PARAM}}}",
        collection_url.trim_end_matches('/')
    )
}

/// Reconciles desired objects against the remote API.
#[derive(Debug)]
pub struct Reconciler<T> {
    transport: T,
    config_changed: bool,
}

impl<T: Transport> Reconciler<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config_changed: false,
        }
    }

    /// Whether a mutating call has succeeded through this reconciler.
    #[must_use]
    pub fn config_changed(&self) -> bool {
        self.config_changed
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request without marking the configuration as changed.
    pub async fn send_request(&self, request: &ApiRequest) -> Result<Value> {
        debug!(method = %request.method, url = %request.url_path, "sending request");
        self.transport.send_request(request).await
    }

    async fn send_modifying_request(&mut self, request: ApiRequest) -> Result<Value> {
        debug!(method = %request.method, url = %request.url_path, "sending modifying request");
        let response = self.transport.send_request(&request).await?;
        self.config_changed = true;
        info!(method = %request.method, url = %request.url_path, "configuration changed");
        Ok(response)
    }

    /// Finds the object named `name` in the collection at `url`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::NotFound` if there is none.
    pub async fn find_object_by_name(
        &self,
        url: &str,
        name: &str,
        path_params: &Params,
    ) -> Result<ConfigObject> {
        let fetch = page_fetcher(&self.transport, url, path_params);
        find_by_name(fetch, ListParams::new(), name)
            .await
            .map_err(|err| match err {
                ReconcileError::NotFound { .. } => {
                    ReconcileError::not_found(format!("object named \"{name}\" at {url}"))
                }
                other => other,
            })
    }

    /// Like [`Self::find_object_by_name`], with a miss reported as `None`.
    pub async fn get_object_by_name(
        &self,
        url: &str,
        name: &str,
        path_params: &Params,
    ) -> Result<Option<ConfigObject>> {
        match self.find_object_by_name(url, name, path_params).await {
            Ok(obj) => Ok(Some(obj)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Creates an object unconditionally.
    pub async fn create(
        &mut self,
        url: &str,
        desired: ConfigObject,
        path_params: &Params,
        query_params: &Params,
    ) -> Result<Value> {
        let request = ApiRequest::post(url)
            .with_body(desired)
            .with_path_params(path_params.clone())
            .with_query_params(query_params.clone());
        self.send_modifying_request(request).await
    }

    /// Makes sure an object named like `desired` exists with the same
    /// configuration.
    ///
    /// Creates it when missing and returns the existing object when it is
    /// already equal. An existing object with a different configuration is
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Validation` if `desired` has no name and
    /// `ReconcileError::Conflict` if a differently configured object with the
    /// same name exists.
    pub async fn ensure_present(
        &mut self,
        url: &str,
        desired: ConfigObject,
        path_params: &Params,
        query_params: &Params,
    ) -> Result<Value> {
        let name = required_name(&desired)?.to_string();

        match self.get_object_by_name(url, &name, path_params).await? {
            None => {
                debug!(%name, url, "object does not exist, creating");
                self.create(url, desired, path_params, query_params).await
            }
            Some(existing) if objects_equal(&existing, &desired) => {
                debug!(%name, url, "object already exists with the same configuration");
                Ok(Value::Object(existing))
            }
            Some(_) => Err(ReconcileError::conflict(name)),
        }
    }

    /// Creates `desired`, falling back to an update of the same-named object
    /// when the server rejects the create as a duplicate name.
    ///
    /// The fallback sends no PUT when the existing object already equals
    /// `desired`; it returns the existing object and `config_changed` stays
    /// unset. Any other create failure is returned as is.
    pub async fn ensure_present_or_update(
        &mut self,
        url: &str,
        desired: ConfigObject,
        path_params: &Params,
    ) -> Result<Value> {
        match self
            .create(url, desired.clone(), path_params, &Params::new())
            .await
        {
            Err(err) if err.is_duplicate_name() => {
                let name = required_name(&desired)?;
                warn!(%name, url, "object with this name already exists, updating it instead");
                let existing = self.find_object_by_name(url, name, path_params).await?;
                self.replace_existing(&item_url(url), existing, desired, path_params)
                    .await
            }
            other => other,
        }
    }

    /// Updates the object addressed by `url` and `path_params`.
    ///
    /// No write happens when the current object already matches `desired`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::NotFound` if the object does not exist.
    pub async fn update(
        &mut self,
        url: &str,
        desired: ConfigObject,
        path_params: &Params,
    ) -> Result<Value> {
        let request = ApiRequest::get(url).with_path_params(path_params.clone());
        let current = match self.send_request(&request).await {
            Ok(Value::Object(current)) if !current.is_empty() => current,
            Ok(other) if is_falsy(&other) => return Err(missing_object(url, path_params)),
            Ok(_) => {
                return Err(ReconcileError::transport(format!(
                    "malformed response from {url}: expected a JSON object"
                )));
            }
            Err(ReconcileError::Api(err)) if err.status == 404 || err.is_invalid_uuid() => {
                return Err(missing_object(url, path_params));
            }
            Err(err) => return Err(err),
        };

        if objects_equal(&current, &desired) {
            debug!(url, "object is up to date");
            return Ok(Value::Object(current));
        }

        let request = ApiRequest::put(url)
            .with_body(desired)
            .with_path_params(path_params.clone());
        self.send_modifying_request(request).await
    }

    /// Deletes the object addressed by `url` and `path_params`.
    ///
    /// A delete of an unknown identifier is reported as
    /// [`DeleteOutcome::AlreadyAbsent`] rather than an error.
    pub async fn delete(&mut self, url: &str, path_params: &Params) -> Result<DeleteOutcome> {
        let request = ApiRequest::delete(url).with_path_params(path_params.clone());
        match self.send_modifying_request(request).await {
            Ok(response) => Ok(DeleteOutcome::Deleted(response)),
            Err(err) if err.is_invalid_uuid() => {
                warn!(url, ?path_params, "referenced object does not exist, nothing to delete");
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(err) => Err(err),
        }
    }

    /// Updates the object in the collection at `url` named like `desired`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::NotFound` if no object has that name.
    pub async fn edit_by_name(
        &mut self,
        url: &str,
        desired: ConfigObject,
        path_params: &Params,
    ) -> Result<Value> {
        let name = required_name(&desired)?;
        let existing = self.find_object_by_name(url, name, path_params).await?;
        self.replace_existing(&item_url(url), existing, desired, path_params)
            .await
    }

    /// Deletes the object named `name` from the collection at `url`.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::NotFound` if no object has that name.
    pub async fn delete_by_name(
        &mut self,
        url: &str,
        name: &str,
        path_params: &Params,
    ) -> Result<DeleteOutcome> {
        let existing = self.find_object_by_name(url, name, path_params).await?;
        let params = with_object_id(path_params, &existing)?;
        self.delete(&item_url(url), &params).await
    }

    /// Writes `desired` over `existing` unless they are already equal.
    async fn replace_existing(
        &mut self,
        item_url: &str,
        existing: ConfigObject,
        mut desired: ConfigObject,
        path_params: &Params,
    ) -> Result<Value> {
        copy_identity_fields(&existing, &mut desired);
        if objects_equal(&existing, &desired) {
            debug!(url = item_url, "object is up to date");
            return Ok(Value::Object(existing));
        }

        let params = with_object_id(path_params, &existing)?;
        let request = ApiRequest::new(HttpMethod::Put, item_url)
            .with_body(desired)
            .with_path_params(params);
        self.send_modifying_request(request).await
    }
}

fn required_name(desired: &ConfigObject) -> Result<&str> {
    object_name(desired).filter(|name| !name.is_empty()).ok_or_else(|| {
        ReconcileError::validation(
            "New object cannot be added without name. The name field is mandatory for new objects",
        )
    })
}

fn with_object_id(path_params: &Params, existing: &ConfigObject) -> Result<Params> {
    let id = object_id(existing)
        .ok_or_else(|| ReconcileError::transport("existing object has no id"))?;
    let mut params = path_params.clone();
    params.insert(OBJECT_ID_PARAM.to_string(), id.to_string());
    Ok(params)
}

fn missing_object(url: &str, path_params: &Params) -> ReconcileError {
    ReconcileError::not_found(format!("referenced object {url} {path_params:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_url() {
        assert_eq!(item_url("/object/networks"), "/object/networks/{objId}");
        assert_eq!(item_url("/object/networks/"), "/object/networks/{objId}");
    }

    #[test]
    fn test_delete_outcome_response() {
        assert_eq!(
            DeleteOutcome::AlreadyAbsent.into_response(),
            json!({"response": "Referenced object does not exist"})
        );
        let deleted = DeleteOutcome::Deleted(json!({}));
        assert!(deleted.is_deleted());
        assert_eq!(deleted.into_response(), json!({}));
    }

    #[test]
    fn test_required_name() {
        let named = json!({"name": "x"});
        assert_eq!(required_name(named.as_object().unwrap()).unwrap(), "x");

        for payload in [json!({}), json!({"name": ""}), json!({"name": 5})] {
            let err = required_name(payload.as_object().unwrap()).unwrap_err();
            assert!(matches!(err, ReconcileError::Validation(_)));
        }
    }
}
