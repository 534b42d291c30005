//! Object representation helpers.
//!
//! Desired-state payloads and server-returned objects are both plain JSON
//! objects. Field sets vary per resource type, so nothing here assumes a
//! schema beyond `name` and the server-assigned identity fields.

use serde_json::{Map, Value};

use crate::error::{ReconcileError, Result};

/// A configuration object as exchanged with the API.
pub type ConfigObject = Map<String, Value>;

/// Server bookkeeping fields excluded from equality comparison.
pub const IGNORED_FIELDS: [&str; 4] = ["id", "version", "isSystemDefined", "links"];

/// Server-assigned fields copied onto a desired payload before update or delete.
pub const IDENTITY_FIELDS: [&str; 2] = ["id", "version"];

/// Field carrying the object name.
pub const NAME_FIELD: &str = "name";

/// Path parameter naming the object id in item URLs.
pub const OBJECT_ID_PARAM: &str = "objId";

/// Returns `true` for values that count as "not set": null, `false`, zero,
/// and empty strings, arrays or objects.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Borrows a value as an object, or fails with `TypeMismatch`.
pub fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a ConfigObject> {
    value
        .as_object()
        .ok_or_else(|| ReconcileError::type_mismatch(format!("{what} must be a JSON object")))
}

/// Converts a value into an object, or fails with `TypeMismatch`.
pub fn into_object(value: Value, what: &str) -> Result<ConfigObject> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ReconcileError::type_mismatch(format!(
            "{what} must be a JSON object"
        ))),
    }
}

/// The object's `name` field, if it is a string.
#[must_use]
pub fn object_name(obj: &ConfigObject) -> Option<&str> {
    obj.get(NAME_FIELD).and_then(Value::as_str)
}

/// The object's server-assigned `id`, if it is a string.
#[must_use]
pub fn object_id(obj: &ConfigObject) -> Option<&str> {
    obj.get("id").and_then(Value::as_str)
}

/// Copies identity fields from `source` onto `dest`.
///
/// A field absent from `source` is left untouched on `dest`; some resources
/// are versionless.
pub fn copy_identity_fields(source: &ConfigObject, dest: &mut ConfigObject) {
    for field in IDENTITY_FIELDS {
        if let Some(value) = source.get(field) {
            dest.insert(field.to_string(), value.clone());
        }
    }
}
