//! Runtime values at the enforcement boundary
//!
//! Data entering the engine is converted once into [`Value`], a closed set
//! of the shapes enforcement understands. JSON payloads are decoded either
//! schema-less ([`Value::from_json`]) or guided by the declared schema
//! ([`Value::from_json_with_schema`]), which is how binary and datetime
//! fields travel as text.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use super::errors::{EnforceResult, EnforcementError};
use super::primitive::PrimitiveKind;
use super::types::SchemaNode;

/// Output format for datetimes
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepted datetime input formats, tried in order
const DATETIME_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A runtime data value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text
    Str(String),
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// Byte sequence
    Binary(Vec<u8>),
    /// Date/time without timezone
    DateTime(NaiveDateTime),
    /// Key/value mapping
    Map(BTreeMap<String, Value>),
    /// Plain ordered sequence
    List(Vec<Value>),
    /// Contiguous typed buffer; never accepted where a sequence is declared
    Buffer(Buffer),
}

/// A contiguous, homogeneously typed array
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

impl Buffer {
    /// Returns the element count
    pub fn len(&self) -> usize {
        match self {
            Buffer::Int32(v) => v.len(),
            Buffer::Int64(v) => v.len(),
            Buffer::Float32(v) => v.len(),
            Buffer::Float64(v) => v.len(),
            Buffer::Utf8(v) => v.len(),
        }
    }

    /// Returns true if the buffer has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type name
    pub fn dtype_name(&self) -> &'static str {
        match self {
            Buffer::Int32(_) => "int32",
            Buffer::Int64(_) => "int64",
            Buffer::Float32(_) => "float32",
            Buffer::Float64(_) => "float64",
            Buffer::Utf8(_) => "string",
        }
    }

    /// Converts the buffer into a plain sequence of scalar values.
    ///
    /// Callers use this before enforcement, since the array enforcer
    /// rejects buffers outright.
    pub fn to_list(&self) -> Value {
        let items = match self {
            Buffer::Int32(v) => v.iter().copied().map(Value::Int).collect(),
            Buffer::Int64(v) => v.iter().copied().map(Value::Long).collect(),
            Buffer::Float32(v) => v.iter().copied().map(Value::Float).collect(),
            Buffer::Float64(v) => v.iter().copied().map(Value::Double).collect(),
            Buffer::Utf8(v) => v.iter().cloned().map(Value::Str).collect(),
        };
        Value::List(items)
    }
}

impl Value {
    /// Builds a mapping from key/value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a plain sequence
    pub fn list<T, I>(items: I) -> Self
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a byte sequence value
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Binary(bytes.into())
    }

    /// Returns the runtime kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "int32",
            Value::Long(_) => "int64",
            Value::Float(_) => "float32",
            Value::Double(_) => "float64",
            Value::Binary(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::Map(_) => "dictionary",
            Value::List(_) => "sequence",
            Value::Buffer(_) => "buffer",
        }
    }

    /// Returns the mapping if this is one
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the sequence items if this is a plain sequence
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Decodes a JSON value without schema guidance.
    ///
    /// Integers that fit 32 bits become `Int`, other integers `Long`,
    /// remaining numbers `Double`. JSON null has no runtime representation.
    pub fn from_json(json: &JsonValue) -> EnforceResult<Value> {
        match json {
            JsonValue::Null => Err(EnforcementError::UnsupportedData(
                "null values are not supported".into(),
            )),
            JsonValue::Bool(b) => Ok(Value::Bool(*b)),
            JsonValue::Number(n) => decode_number(n),
            JsonValue::String(s) => Ok(Value::Str(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Value::from_json(item).map_err(|e| e.at_index(i)))
                .collect::<EnforceResult<Vec<_>>>()
                .map(Value::List),
            JsonValue::Object(entries) => entries
                .iter()
                .map(|(key, item)| {
                    Value::from_json(item)
                        .map(|v| (key.clone(), v))
                        .map_err(|e| e.at_key(key))
                })
                .collect::<EnforceResult<BTreeMap<_, _>>>()
                .map(Value::Map),
        }
    }

    /// Decodes a JSON value using the declared schema to pick
    /// representations JSON cannot carry natively.
    ///
    /// - `binary` positions decode base64 text
    /// - `datetime` positions parse ISO-8601 text
    /// - `float` positions narrow fractional numbers that fit 32 bits exactly
    /// - `long` positions keep integers as 64 bits
    ///
    /// Anything else, including shapes that disagree with the schema, falls
    /// back to [`Value::from_json`]; enforcement reports those afterwards.
    pub fn from_json_with_schema(json: &JsonValue, schema: &SchemaNode) -> EnforceResult<Value> {
        match (schema, json) {
            (SchemaNode::Primitive(kind), _) => decode_primitive(json, *kind),
            (SchemaNode::Object(object), JsonValue::Object(entries)) => entries
                .iter()
                .map(|(key, item)| {
                    let decoded = match object.property(key) {
                        Some(property) => Value::from_json_with_schema(item, property.node()),
                        None => Value::from_json(item),
                    };
                    decoded.map(|v| (key.clone(), v)).map_err(|e| e.at_key(key))
                })
                .collect::<EnforceResult<BTreeMap<_, _>>>()
                .map(Value::Map),
            (SchemaNode::Array(array), JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    Value::from_json_with_schema(item, array.element()).map_err(|e| e.at_index(i))
                })
                .collect::<EnforceResult<Vec<_>>>()
                .map(Value::List),
            _ => Value::from_json(json),
        }
    }

    /// Encodes the value as JSON.
    ///
    /// Binary becomes standard base64 text and datetimes ISO-8601 text.
    /// Non-finite floats encode as null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Long(i) => JsonValue::from(*i),
            Value::Float(x) => float32_to_json(*x),
            Value::Double(x) => float64_to_json(*x),
            Value::Binary(bytes) => JsonValue::String(STANDARD.encode(bytes)),
            Value::DateTime(ts) => JsonValue::String(ts.format(DATETIME_FORMAT).to_string()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<JsonMap<_, _>>(),
            ),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Buffer(buffer) => buffer.to_list().to_json(),
        }
    }
}

fn decode_number(n: &Number) -> EnforceResult<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(i32::try_from(i).map(Value::Int).unwrap_or(Value::Long(i)));
    }
    if n.is_u64() {
        return Err(EnforcementError::UnsupportedData(format!(
            "integer {} exceeds the 64-bit signed range",
            n
        )));
    }
    n.as_f64()
        .map(Value::Double)
        .ok_or_else(|| EnforcementError::UnsupportedData(format!("unrepresentable number {}", n)))
}

fn decode_primitive(json: &JsonValue, kind: PrimitiveKind) -> EnforceResult<Value> {
    match (kind, json) {
        (PrimitiveKind::Binary, JsonValue::String(text)) => {
            STANDARD.decode(text).map(Value::Binary).map_err(|e| {
                EnforcementError::UnsupportedData(format!("invalid base64 for binary: {}", e))
            })
        }
        (PrimitiveKind::Datetime, JsonValue::String(text)) => {
            parse_datetime(text).map(Value::DateTime)
        }
        // Only fractional numbers that survive the round trip through f32
        // narrow; everything else decodes as usual and is left to enforcement.
        (PrimitiveKind::Float, JsonValue::Number(n)) if n.is_f64() => match n.as_f64() {
            Some(x) if narrows_exactly(x) => Ok(Value::Float(x as f32)),
            _ => decode_number(n),
        },
        (PrimitiveKind::Long, JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => Ok(Value::Long(i)),
            None => decode_number(n),
        },
        _ => Value::from_json(json),
    }
}

fn parse_datetime(text: &str) -> EnforceResult<NaiveDateTime> {
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.naive_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            EnforcementError::UnsupportedData(format!("invalid datetime `{}`", text))
        })
}

fn narrows_exactly(x: f64) -> bool {
    (x as f32).to_string().parse::<f64>() == Ok(x)
}

fn float32_to_json(x: f32) -> JsonValue {
    // Go through the shortest decimal form so 0.1f32 stays 0.1.
    let widened = x.to_string().parse::<f64>().unwrap_or(f64::from(x));
    float64_to_json(widened)
}

fn float64_to_json(x: f64) -> JsonValue {
    Number::from_f64(x).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Binary(bytes) => write!(f, "b'{}'", bytes.escape_ascii()),
            Value::DateTime(ts) => write!(f, "{}", ts),
            Value::Map(_) | Value::List(_) | Value::Buffer(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::DateTime(ts)
    }
}

impl From<Buffer> for Value {
    fn from(buffer: Buffer) -> Self {
        Value::Buffer(buffer)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArraySchema, ObjectSchema, Property};
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::map(Vec::<(String, Value)>::new()).kind_name(), "dictionary");
        assert_eq!(Value::list(vec!["a"]).kind_name(), "sequence");
        assert_eq!(Value::Buffer(Buffer::Float64(vec![1.0])).kind_name(), "buffer");
    }

    #[test]
    fn test_from_json_integer_widths() {
        assert_eq!(Value::from_json(&json!(7)).unwrap(), Value::Int(7));
        assert_eq!(
            Value::from_json(&json!(5_000_000_000i64)).unwrap(),
            Value::Long(5_000_000_000)
        );
        assert_eq!(Value::from_json(&json!(0.5)).unwrap(), Value::Double(0.5));
    }

    #[test]
    fn test_from_json_null_rejected_with_path() {
        let err = Value::from_json(&json!({"a": [1, null]})).unwrap_err();
        assert_eq!(err.path(), "a[1]");
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_from_json_u64_overflow_rejected() {
        let err = Value::from_json(&json!(u64::MAX)).unwrap_err();
        assert!(matches!(err, EnforcementError::UnsupportedData(_)));
    }

    #[test]
    fn test_schema_guided_binary_and_datetime() {
        let schema = SchemaNode::Object(
            ObjectSchema::new(vec![
                Property::new("raw", PrimitiveKind::Binary),
                Property::new("at", PrimitiveKind::Datetime),
                Property::new("scores", ArraySchema::new(PrimitiveKind::Float)),
            ])
            .unwrap(),
        );
        let payload = json!({
            "raw": "aGVsbG8=",
            "at": "2023-10-13T00:00:00",
            "scores": [0.25, 1.5]
        });

        let value = Value::from_json_with_schema(&payload, &schema).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["raw"], Value::binary(b"hello".to_vec()));
        assert_eq!(
            map["at"],
            Value::DateTime(
                NaiveDate::from_ymd_opt(2023, 10, 13)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            map["scores"],
            Value::list(vec![Value::Float(0.25), Value::Float(1.5)])
        );
    }

    #[test]
    fn test_float_position_only_narrows_exact_fractions() {
        let schema = SchemaNode::Primitive(PrimitiveKind::Float);

        assert_eq!(
            Value::from_json_with_schema(&json!(0.1), &schema).unwrap(),
            Value::Float(0.1)
        );

        // Integers keep their integer kind and are rejected by enforcement.
        let one = Value::from_json_with_schema(&json!(1), &schema).unwrap();
        assert_eq!(one, Value::Int(1));
        assert!(crate::schema::enforce(&one, &schema).is_err());

        let wide = Value::from_json_with_schema(&json!(16777217), &schema).unwrap();
        assert_eq!(wide, Value::Int(16777217));
        assert!(crate::schema::enforce(&wide, &schema).is_err());

        // 0.1 + 2^-30 has no exact f32 form.
        let precise = 0.1_f64 + 2f64.powi(-30);
        let decoded = Value::from_json_with_schema(&json!(precise), &schema).unwrap();
        assert_eq!(decoded, Value::Double(precise));
        assert!(crate::schema::enforce(&decoded, &schema).is_err());
    }

    #[test]
    fn test_schema_guided_bad_base64() {
        let schema = SchemaNode::Primitive(PrimitiveKind::Binary);
        let err = Value::from_json_with_schema(&json!("not base64!"), &schema).unwrap_err();
        assert!(matches!(err, EnforcementError::UnsupportedData(_)));
    }

    #[test]
    fn test_datetime_accepts_date_only_and_rfc3339() {
        let schema = SchemaNode::Primitive(PrimitiveKind::Datetime);
        assert!(Value::from_json_with_schema(&json!("2023-10-13"), &schema).is_ok());
        assert!(Value::from_json_with_schema(&json!("2023-10-13T10:00:00+02:00"), &schema).is_ok());
        assert!(Value::from_json_with_schema(&json!("yesterday"), &schema).is_err());
    }

    #[test]
    fn test_to_json_encodings() {
        let value = Value::map(vec![
            ("raw", Value::binary(b"hello".to_vec())),
            ("f", Value::Float(0.1)),
            ("buf", Value::Buffer(Buffer::Int32(vec![1, 2]))),
        ]);
        assert_eq!(
            value.to_json(),
            json!({"raw": "aGVsbG8=", "f": 0.1, "buf": [1, 2]})
        );
    }

    #[test]
    fn test_buffer_to_list() {
        let buffer = Buffer::Utf8(vec!["a".into(), "b".into()]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.to_list(), Value::list(vec!["a", "b"]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(123).to_string(), "123");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::binary(b"ab".to_vec()).to_string(), "b'ab'");
    }
}
