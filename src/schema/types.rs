//! Schema node definitions
//!
//! A schema is a tree of nodes:
//! - primitive: one of the [`PrimitiveKind`] tags
//! - object: ordered, uniquely named properties, each required or optional
//! - array: homogeneous element node
//!
//! JSON form, as stored in model signatures:
//!
//! ```json
//! {"type": "object", "properties": {
//!     "a": {"type": "string", "required": true},
//!     "c": {"type": "array", "items": {"type": "double"}, "required": false}
//! }}
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use super::errors::{EnforceResult, EnforcementError};
use super::primitive::PrimitiveKind;

/// A node of a schema tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum SchemaNode {
    /// A single primitive value
    Primitive(PrimitiveKind),
    /// A mapping with declared properties
    Object(ObjectSchema),
    /// A homogeneous sequence
    Array(ArraySchema),
}

impl SchemaNode {
    /// Returns the node kind name
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Primitive(kind) => kind.name(),
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
        }
    }

    /// Parses a node from its JSON form.
    ///
    /// Any `required` key at this level is ignored; it belongs to the
    /// enclosing property.
    pub fn from_json(json: &JsonValue) -> EnforceResult<SchemaNode> {
        let spec = json.as_object().ok_or_else(|| {
            invalid_schema(format!("Expected schema node to be an object, got {}", json))
        })?;
        let tag = spec
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid_schema(format!("Schema node is missing a `type`: {}", json)))?;

        match tag {
            "array" => {
                let items = spec.get("items").ok_or_else(|| {
                    invalid_schema("Array schema is missing `items`".to_string())
                })?;
                Ok(SchemaNode::Array(ArraySchema::new(SchemaNode::from_json(
                    items,
                )?)))
            }
            "object" => {
                let properties = spec
                    .get("properties")
                    .and_then(JsonValue::as_object)
                    .ok_or_else(|| {
                        invalid_schema("Object schema is missing `properties`".to_string())
                    })?;
                let properties = properties
                    .iter()
                    .map(|(name, prop)| Property::from_json(name, prop))
                    .collect::<EnforceResult<Vec<_>>>()?;
                Ok(SchemaNode::Object(ObjectSchema::new(properties)?))
            }
            other => other.parse::<PrimitiveKind>().map(SchemaNode::Primitive),
        }
    }

    /// Encodes the node to its JSON form
    pub fn to_json(&self) -> JsonValue {
        match self {
            SchemaNode::Primitive(kind) => json!({ "type": kind.name() }),
            SchemaNode::Array(array) => json!({
                "type": "array",
                "items": array.element().to_json(),
            }),
            SchemaNode::Object(object) => {
                let properties = object
                    .properties()
                    .iter()
                    .map(|p| (p.name().to_string(), p.to_json()))
                    .collect::<JsonMap<_, _>>();
                json!({ "type": "object", "properties": properties })
            }
        }
    }
}

impl TryFrom<JsonValue> for SchemaNode {
    type Error = EnforcementError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        SchemaNode::from_json(&json)
    }
}

impl From<SchemaNode> for JsonValue {
    fn from(node: SchemaNode) -> Self {
        node.to_json()
    }
}

impl From<PrimitiveKind> for SchemaNode {
    fn from(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive(kind)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(object: ObjectSchema) -> Self {
        SchemaNode::Object(object)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(array: ArraySchema) -> Self {
        SchemaNode::Array(array)
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Primitive(kind) => write!(f, "{}", kind),
            SchemaNode::Array(array) => write!(f, "array<{}>", array.element()),
            SchemaNode::Object(object) => {
                f.write_str("object{")?;
                for (i, prop) in object.properties().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let marker = if prop.is_required() { "" } else { "?" };
                    write!(f, "{}{}: {}", prop.name(), marker, prop.node())?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A named field of an object schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    node: SchemaNode,
    required: bool,
}

impl Property {
    /// Creates a required property
    pub fn new(name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        Self {
            name: name.into(),
            node: node.into(),
            required: true,
        }
    }

    /// Creates an optional property
    pub fn optional(name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        Self::new(name, node).required(false)
    }

    /// Sets whether the property must be present
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn from_json(name: &str, json: &JsonValue) -> EnforceResult<Property> {
        let required = match json.get("required") {
            None => true,
            Some(JsonValue::Bool(b)) => *b,
            Some(other) => {
                return Err(invalid_schema(format!(
                    "Expected `required` of property '{}' to be a boolean, got {}",
                    name, other
                )))
            }
        };
        Ok(Property::new(name, SchemaNode::from_json(json)?).required(required))
    }

    /// Encodes the property body (node fields plus `required`).
    fn to_json(&self) -> JsonValue {
        let mut json = self.node.to_json();
        if let JsonValue::Object(fields) = &mut json {
            fields.insert("required".into(), JsonValue::Bool(self.required));
        }
        json
    }
}

/// An object schema: an ordered set of uniquely named properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSchema {
    properties: Vec<Property>,
}

impl ObjectSchema {
    /// Creates an object schema.
    ///
    /// # Errors
    ///
    /// `InvalidSchemaArgument` if `properties` is empty or names repeat.
    pub fn new(properties: Vec<Property>) -> EnforceResult<Self> {
        if properties.is_empty() {
            return Err(invalid_schema(
                "Creating Object with empty properties is not allowed".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = properties
            .iter()
            .map(Property::name)
            .filter(|name| !seen.insert(*name))
            .collect();
        if !duplicates.is_empty() {
            duplicates.sort_unstable();
            duplicates.dedup();
            return Err(invalid_schema(format!(
                "Found duplicated property names: {}",
                duplicates.join(", ")
            )));
        }

        Ok(Self { properties })
    }

    /// Builds an object schema from a list of named column specs,
    /// e.g. `[{"name": "a", "type": "string", "required": false}]`.
    pub fn from_columns(json: &JsonValue) -> EnforceResult<Self> {
        let columns = json.as_array().ok_or_else(|| {
            invalid_schema(format!("Expected column list to be an array, got {}", json))
        })?;
        let properties = columns
            .iter()
            .map(|column| {
                let name = column
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .ok_or_else(|| invalid_schema(format!("Column is missing a `name`: {}", column)))?;
                Property::from_json(name, column)
            })
            .collect::<EnforceResult<Vec<_>>>()?;
        Self::new(properties)
    }

    /// Encodes the schema as a list of named column specs
    pub fn to_columns(&self) -> JsonValue {
        JsonValue::Array(
            self.properties
                .iter()
                .map(|p| {
                    let mut json = p.to_json();
                    if let JsonValue::Object(fields) = &mut json {
                        fields.insert("name".into(), JsonValue::String(p.name.clone()));
                    }
                    json
                })
                .collect(),
        )
    }

    /// Returns the properties in declaration order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Looks up a property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns the names of required properties
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|p| p.required)
            .map(Property::name)
    }
}

/// An array schema with a single element type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySchema {
    element: Box<SchemaNode>,
}

impl ArraySchema {
    pub fn new(element: impl Into<SchemaNode>) -> Self {
        Self {
            element: Box::new(element.into()),
        }
    }

    pub fn element(&self) -> &SchemaNode {
        &self.element
    }
}

fn invalid_schema(message: String) -> EnforcementError {
    EnforcementError::InvalidSchemaArgument(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_schema() -> ObjectSchema {
        ObjectSchema::new(vec![
            Property::new("a", PrimitiveKind::String),
            Property::optional("b", PrimitiveKind::Binary),
            Property::new("c", ArraySchema::new(PrimitiveKind::String)),
            Property::new(
                "d",
                ObjectSchema::new(vec![
                    Property::new("str", PrimitiveKind::String),
                    Property::optional("arr", ArraySchema::new(PrimitiveKind::Double)),
                ])
                .unwrap(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_property_defaults_to_required() {
        assert!(Property::new("a", PrimitiveKind::String).is_required());
        assert!(!Property::optional("a", PrimitiveKind::String).is_required());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ObjectSchema::new(vec![
            Property::new("a", PrimitiveKind::String),
            Property::new("a", PrimitiveKind::Long),
        ]);
        let err = result.unwrap_err();
        assert!(matches!(err, EnforcementError::InvalidSchemaArgument(_)));
        assert!(err.to_string().contains("duplicated"));
    }

    #[test]
    fn test_empty_object_rejected() {
        assert!(ObjectSchema::new(vec![]).is_err());
    }

    #[test]
    fn test_required_names_in_order() {
        let schema = nested_schema();
        let names: Vec<_> = schema.required_names().collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_json_round_trip() {
        let node = SchemaNode::Object(nested_schema());
        let json = node.to_json();
        assert_eq!(json["properties"]["b"]["required"], JsonValue::Bool(false));
        assert_eq!(json["properties"]["c"]["items"]["type"], "string");

        let parsed = SchemaNode::from_json(&json).unwrap();
        assert_eq!(parsed, node);
    }

    #[test]
    fn test_serde_uses_json_form() {
        let node: SchemaNode =
            serde_json::from_str(r#"{"type": "array", "items": {"type": "long"}}"#).unwrap();
        assert_eq!(node, SchemaNode::Array(ArraySchema::new(PrimitiveKind::Long)));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "array", "items": {"type": "long"}})
        );
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let err = SchemaNode::from_json(&json!({"type": "decimal"})).unwrap_err();
        assert_eq!(err.to_string(), "Expected dtype to be DataType, got decimal");
    }

    #[test]
    fn test_malformed_nodes_rejected() {
        assert!(SchemaNode::from_json(&json!("string")).is_err());
        assert!(SchemaNode::from_json(&json!({"type": "array"})).is_err());
        assert!(SchemaNode::from_json(&json!({"type": "object"})).is_err());
        assert!(SchemaNode::from_json(
            &json!({"type": "object", "properties": {"a": {"type": "string", "required": "yes"}}})
        )
        .is_err());
    }

    #[test]
    fn test_columns_round_trip() {
        let columns = json!([
            {"name": "prompt", "type": "string"},
            {"name": "max_tokens", "type": "long", "required": false}
        ]);
        let schema = ObjectSchema::from_columns(&columns).unwrap();
        assert!(schema.property("prompt").unwrap().is_required());
        assert!(!schema.property("max_tokens").unwrap().is_required());

        let again = ObjectSchema::from_columns(&schema.to_columns()).unwrap();
        assert_eq!(again, schema);
    }

    #[test]
    fn test_display() {
        let node = SchemaNode::Object(nested_schema());
        assert_eq!(
            node.to_string(),
            "object{a: string, b?: binary, c: array<string>, d: object{str: string, arr?: array<double>}}"
        );
    }
}
