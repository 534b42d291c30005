//! Structural equality of configuration objects.
//!
//! Two objects are equal when they agree on every field that is set on
//! either side, ignoring server bookkeeping ([`IGNORED_FIELDS`]) and values
//! that are falsy (empty, `false`, zero, null). Nested objects are compared
//! recursively under the same rules; arrays and scalars compare exactly and
//! arrays are order-sensitive.

use serde_json::Value;

use crate::error::Result;
use crate::object::{ConfigObject, IGNORED_FIELDS, as_object, is_falsy};

/// Compares two JSON values that must both be objects.
///
/// # Errors
///
/// Returns `ReconcileError::TypeMismatch` if either argument is not an object.
pub fn equal_objects(a: &Value, b: &Value) -> Result<bool> {
    let a = as_object(a, "first argument")?;
    let b = as_object(b, "second argument")?;
    Ok(objects_equal(a, b))
}

/// Compares two objects. Infallible form of [`equal_objects`].
#[must_use]
pub fn objects_equal(a: &ConfigObject, b: &ConfigObject) -> bool {
    if significant_fields(a).count() != significant_fields(b).count() {
        return false;
    }

    significant_fields(a).all(|(key, value1)| match b.get(key) {
        Some(value2) if !is_falsy(value2) => values_equal(value1, value2),
        _ => false,
    })
}

fn significant_fields(obj: &ConfigObject) -> impl Iterator<Item = (&String, &Value)> {
    obj.iter()
        .filter(|(k, v)| !IGNORED_FIELDS.contains(&k.as_str()) && !is_falsy(v))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => objects_equal(a, b),
        (Value::Number(x), Value::Number(y)) => x.is_f64() == y.is_f64() && x == y,
        (Value::String(_), Value::String(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::Array(_), Value::Array(_))
        | (Value::Null, Value::Null) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;
    use serde_json::json;

    #[test]
    fn test_non_objects_are_rejected() {
        let err = equal_objects(&json!([]), &json!({})).unwrap_err();
        assert!(matches!(err, ReconcileError::TypeMismatch(_)));
        assert!(equal_objects(&json!({}), &json!("x")).is_err());
    }

    #[test]
    fn test_reflexive_and_symmetric() {
        let a = json!({"name": "n", "value": "10.0.0.1", "nested": {"k": [1, 2]}});
        let b = json!({"name": "n", "value": "10.0.0.2", "nested": {"k": [1, 2]}});
        assert!(equal_objects(&a, &a).unwrap());
        assert_eq!(
            equal_objects(&a, &b).unwrap(),
            equal_objects(&b, &a).unwrap()
        );
        assert!(!equal_objects(&a, &b).unwrap());
    }

    #[test]
    fn test_ignored_fields_do_not_matter() {
        let desired = json!({"name": "n", "subType": "HOST"});
        let existing = json!({
            "name": "n",
            "subType": "HOST",
            "id": "123",
            "version": "abc",
            "isSystemDefined": true,
            "links": {"self": "https://fdm/api/object/networks/123"}
        });
        assert!(equal_objects(&desired, &existing).unwrap());
    }

    #[test]
    fn test_falsy_fields_do_not_matter() {
        let a = json!({"name": "n"});
        let b = json!({"name": "n", "description": "", "tags": [], "enabled": false, "port": 0, "x": null, "o": {}});
        assert!(equal_objects(&a, &b).unwrap());
        assert!(equal_objects(&b, &a).unwrap());
    }

    #[test]
    fn test_types_are_strict() {
        assert!(!equal_objects(&json!({"n": "1"}), &json!({"n": 1})).unwrap());
        assert!(!equal_objects(&json!({"n": 1}), &json!({"n": 1.0})).unwrap());
        assert!(!equal_objects(&json!({"n": true}), &json!({"n": 1})).unwrap());
        assert!(equal_objects(&json!({"n": 1}), &json!({"n": 1})).unwrap());
    }

    #[test]
    fn test_nested_objects_ignore_bookkeeping() {
        let a = json!({"name": "n", "ref": {"id": "1", "type": "networkobject", "name": "x"}});
        let b = json!({"name": "n", "ref": {"id": "2", "version": "v", "type": "networkobject", "name": "x"}});
        assert!(equal_objects(&a, &b).unwrap());
    }

    #[test]
    fn test_arrays_are_order_sensitive() {
        let a = json!({"name": "n", "ports": [1, 2]});
        let b = json!({"name": "n", "ports": [2, 1]});
        assert!(!equal_objects(&a, &b).unwrap());
    }

    #[test]
    fn test_missing_key_on_either_side() {
        let a = json!({"name": "n", "description": "d"});
        let b = json!({"name": "n", "value": "v"});
        assert!(!equal_objects(&a, &b).unwrap());
        assert!(!equal_objects(&json!({"name": "n"}), &json!({"name": "n", "value": "v"})).unwrap());
    }
}
