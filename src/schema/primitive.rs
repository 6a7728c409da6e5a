//! Primitive data kinds and the widening table
//!
//! A runtime value of kind K is accepted for a declared kind D only when
//! the pair appears in the table below. Numeric widening is upward only;
//! there is no cross-family coercion.
//!
//! | Runtime kind | Accepted declared kinds   |
//! |--------------|---------------------------|
//! | string       | string                    |
//! | boolean      | boolean                   |
//! | int32        | integer, long, double     |
//! | int64        | long                      |
//! | float32      | float, double             |
//! | float64      | double                    |
//! | bytes        | binary                    |
//! | datetime     | datetime                  |

use std::fmt;
use std::str::FromStr;

use super::errors::EnforcementError;
use super::value::Value;

/// The closed set of primitive kinds a schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    /// UTF-8 text
    String,
    /// Raw bytes
    Binary,
    /// Boolean
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Naive date/time
    Datetime,
}

impl PrimitiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::String,
        PrimitiveKind::Binary,
        PrimitiveKind::Boolean,
        PrimitiveKind::Integer,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Datetime,
    ];

    /// Returns the tag used in schema documents and error messages
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Binary => "binary",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Datetime => "datetime",
        }
    }

    /// Returns true if a value of this runtime kind may be passed where
    /// `self` is declared.
    pub fn accepts(&self, value: &Value) -> bool {
        use PrimitiveKind::*;

        match value {
            Value::Str(_) => matches!(self, String),
            Value::Bool(_) => matches!(self, Boolean),
            Value::Int(_) => matches!(self, Integer | Long | Double),
            Value::Long(_) => matches!(self, Long),
            Value::Float(_) => matches!(self, Float | Double),
            Value::Double(_) => matches!(self, Double),
            Value::Binary(_) => matches!(self, Binary),
            Value::DateTime(_) => matches!(self, Datetime),
            Value::Map(_) | Value::List(_) | Value::Buffer(_) => false,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = EnforcementError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == tag)
            .ok_or_else(|| {
                EnforcementError::InvalidSchemaArgument(format!(
                    "Expected dtype to be DataType, got {}",
                    tag
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn accepted_kinds(value: &Value) -> Vec<PrimitiveKind> {
        PrimitiveKind::ALL
            .iter()
            .copied()
            .filter(|kind| kind.accepts(value))
            .collect()
    }

    #[test]
    fn test_int32_widens_to_long_and_double() {
        assert_eq!(
            accepted_kinds(&Value::Int(1)),
            vec![PrimitiveKind::Integer, PrimitiveKind::Long, PrimitiveKind::Double]
        );
    }

    #[test]
    fn test_int64_only_long() {
        assert_eq!(accepted_kinds(&Value::Long(100)), vec![PrimitiveKind::Long]);
    }

    #[test]
    fn test_float32_widens_to_double() {
        assert_eq!(
            accepted_kinds(&Value::Float(0.1)),
            vec![PrimitiveKind::Float, PrimitiveKind::Double]
        );
    }

    #[test]
    fn test_float64_never_narrows() {
        assert_eq!(accepted_kinds(&Value::Double(1.0)), vec![PrimitiveKind::Double]);
    }

    #[test]
    fn test_no_cross_family() {
        assert_eq!(
            accepted_kinds(&Value::from("123")),
            vec![PrimitiveKind::String]
        );
        assert_eq!(accepted_kinds(&Value::Bool(true)), vec![PrimitiveKind::Boolean]);
        assert_eq!(
            accepted_kinds(&Value::Binary(b"raw".to_vec())),
            vec![PrimitiveKind::Binary]
        );

        let ts = NaiveDate::from_ymd_opt(2023, 10, 13)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(accepted_kinds(&Value::DateTime(ts)), vec![PrimitiveKind::Datetime]);
    }

    #[test]
    fn test_containers_never_primitive() {
        assert!(accepted_kinds(&Value::List(vec![])).is_empty());
        assert!(accepted_kinds(&Value::Map(Default::default())).is_empty());
    }

    #[test]
    fn test_parse_tags() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.name().parse::<PrimitiveKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_tag_is_schema_error() {
        let err = "str".parse::<PrimitiveKind>().unwrap_err();
        assert!(matches!(err, EnforcementError::InvalidSchemaArgument(_)));
        assert_eq!(err.to_string(), "Expected dtype to be DataType, got str");
    }
}
