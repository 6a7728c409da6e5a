//! Schema enforcement
//!
//! Enforcement semantics:
//! - Every required property is present (all missing names reported at once)
//! - No undeclared properties exist (all extra names reported at once)
//! - Missing properties are checked before extra ones
//! - Primitive values match the declared kind, with upward numeric widening only
//! - Sequences must be plain lists; typed buffers are rejected
//! - Array elements fail fast at the first bad element
//!
//! Enforcement never mutates its input. A successful call returns a freshly
//! built value holding exactly the validated subset of the input; optional
//! properties that were absent stay absent.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::errors::{EnforceResult, EnforcementError};
use super::primitive::PrimitiveKind;
use super::types::{ArraySchema, ObjectSchema, Property, SchemaNode};
use super::value::Value;

/// Enforces `data` against any schema node.
///
/// This is the single entry point used before model invocation.
pub fn enforce(data: &Value, schema: &SchemaNode) -> EnforceResult<Value> {
    match schema {
        SchemaNode::Primitive(kind) => enforce_primitive(data, *kind),
        SchemaNode::Object(object) => enforce_object(data, object),
        SchemaNode::Array(array) => enforce_array(data, array),
    }
}

/// Checks a scalar against a primitive kind.
///
/// The value is returned unchanged on success; nothing is re-encoded.
pub fn enforce_primitive(value: &Value, kind: PrimitiveKind) -> EnforceResult<Value> {
    if kind.accepts(value) {
        Ok(value.clone())
    } else {
        Err(EnforcementError::TypeCoercionFailure {
            value: value.clone(),
            kind,
        })
    }
}

/// Enforces a value known to be present against a property's node.
///
/// Presence and `required` are the object enforcer's concern.
pub fn enforce_property(value: &Value, property: &Property) -> EnforceResult<Value> {
    enforce(value, property.node())
}

/// Enforces a mapping against an object schema.
pub fn enforce_object(data: &Value, schema: &ObjectSchema) -> EnforceResult<Value> {
    let entries = match data {
        Value::Map(entries) => entries,
        other => return Err(EnforcementError::type_mismatch("dictionary", other)),
    };

    let missing: BTreeSet<String> = schema
        .required_names()
        .filter(|name| !entries.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(EnforcementError::MissingRequiredProperties(missing));
    }

    let declared: HashSet<&str> = schema.properties().iter().map(Property::name).collect();
    let extra: BTreeSet<String> = entries
        .keys()
        .filter(|key| !declared.contains(key.as_str()))
        .cloned()
        .collect();
    if !extra.is_empty() {
        return Err(EnforcementError::UnexpectedProperties(extra));
    }

    let mut enforced = BTreeMap::new();
    for property in schema.properties() {
        if let Some(value) = entries.get(property.name()) {
            let value =
                enforce_property(value, property).map_err(|e| e.at_key(property.name()))?;
            enforced.insert(property.name().to_string(), value);
        }
    }

    Ok(Value::Map(enforced))
}

/// Enforces a plain sequence against an array schema.
pub fn enforce_array(data: &Value, schema: &ArraySchema) -> EnforceResult<Value> {
    let items = match data {
        Value::List(items) => items,
        other => return Err(EnforcementError::type_mismatch("sequence", other)),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| enforce(item, schema.element()).map_err(|e| e.at_index(i)))
        .collect::<EnforceResult<Vec<_>>>()
        .map(Value::List)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Buffer, EnforcementErrorKind};

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn string_props() -> ObjectSchema {
        ObjectSchema::new(vec![
            Property::new("a", PrimitiveKind::String),
            Property::optional("b", PrimitiveKind::String),
        ])
        .unwrap()
    }

    #[test]
    fn test_enforce_primitive_returns_value() {
        let value = Value::Int(1);
        assert_eq!(enforce_primitive(&value, PrimitiveKind::Double).unwrap(), value);
    }

    #[test]
    fn test_enforce_primitive_rejects_narrowing() {
        let err = enforce_primitive(&Value::Double(1.5), PrimitiveKind::Float).unwrap_err();
        assert_eq!(err.kind(), EnforcementErrorKind::TypeCoercionFailure);
    }

    #[test]
    fn test_object_requires_mapping() {
        let err = enforce_object(&Value::list(vec!["some_sentence"]), &string_props()).unwrap_err();
        assert_eq!(
            err,
            EnforcementError::TypeMismatch {
                expected: "dictionary",
                actual: "sequence"
            }
        );
    }

    #[test]
    fn test_object_missing_required() {
        let err = enforce_object(&Value::map(Vec::<(&str, Value)>::new()), &string_props())
            .unwrap_err();
        assert_eq!(err, EnforcementError::MissingRequiredProperties(names(&["a"])));
    }

    #[test]
    fn test_object_unexpected() {
        let data = Value::map(vec![("a", Value::from("x")), ("c", Value::from("y"))]);
        let err = enforce_object(&data, &string_props()).unwrap_err();
        assert_eq!(err, EnforcementError::UnexpectedProperties(names(&["c"])));
    }

    #[test]
    fn test_object_missing_checked_before_extra() {
        let data = Value::map(vec![("c", Value::from("y"))]);
        let err = enforce_object(&data, &string_props()).unwrap_err();
        assert_eq!(err, EnforcementError::MissingRequiredProperties(names(&["a"])));
    }

    #[test]
    fn test_object_key_context() {
        let data = Value::map(vec![("a", Value::Int(1))]);
        let err = enforce_object(&data, &string_props()).unwrap_err();
        assert_eq!(err.path(), "a");
        assert_eq!(err.kind(), EnforcementErrorKind::TypeCoercionFailure);
        assert!(err.to_string().contains("Failed to enforce schema for key `a`"));
    }

    #[test]
    fn test_array_rejects_buffer() {
        let data = Value::Buffer(Buffer::Utf8(vec!["s1".into(), "s2".into()]));
        let err = enforce_array(&data, &ArraySchema::new(PrimitiveKind::String)).unwrap_err();
        assert_eq!(err.to_string(), "Expected data to be sequence, got buffer");
    }

    #[test]
    fn test_array_fails_at_first_bad_element() {
        let data = Value::list(vec![Value::Int(123), Value::Int(456)]);
        let err = enforce_array(&data, &ArraySchema::new(PrimitiveKind::String)).unwrap_err();
        assert_eq!(err.path(), "[0]");
        assert_eq!(
            err.root_cause().to_string(),
            "Failed to enforce schema of data `123` with dtype `string`"
        );
    }

    #[test]
    fn test_nested_arrays() {
        let schema = ArraySchema::new(ArraySchema::new(PrimitiveKind::Long));
        let data = Value::list(vec![
            Value::list(vec![Value::Long(1), Value::Int(2)]),
            Value::list(Vec::<Value>::new()),
        ]);
        assert_eq!(enforce_array(&data, &schema).unwrap(), data);

        let bad = Value::list(vec![Value::list(vec![Value::Long(1), Value::Double(2.0)])]);
        assert_eq!(enforce_array(&bad, &schema).unwrap_err().path(), "[0][1]");
    }

    #[test]
    fn test_dispatch_routes_by_node() {
        assert!(enforce(&Value::from("x"), &SchemaNode::Primitive(PrimitiveKind::String)).is_ok());
        assert!(enforce(&Value::from("x"), &SchemaNode::Object(string_props())).is_err());
        assert!(enforce(
            &Value::list(vec!["x"]),
            &SchemaNode::Array(ArraySchema::new(PrimitiveKind::String))
        )
        .is_ok());
    }

    #[test]
    fn test_input_not_mutated() {
        let data = Value::map(vec![("a", Value::from("x"))]);
        let before = data.clone();
        let _ = enforce_object(&data, &string_props()).unwrap();
        assert_eq!(data, before);
    }
}
