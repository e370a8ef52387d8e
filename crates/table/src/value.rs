// Cell values and declared field types

use std::fmt;

/// Scalar kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
}

impl ScalarType {
    /// Text is the only scalar whose absence is already representable (as a null reference);
    /// every other scalar is a plain value type.
    pub const fn is_value_type(self) -> bool {
        !matches!(self, ScalarType::Text)
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
        }
    }
}

/// Declared type of a record field, before or after unwrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Optional(ScalarType),
}

impl FieldType {
    pub const fn optional(self) -> Self {
        match self {
            FieldType::Scalar(s) | FieldType::Optional(s) => FieldType::Optional(s),
        }
    }

    pub const fn scalar(self) -> ScalarType {
        match self {
            FieldType::Scalar(s) | FieldType::Optional(s) => s,
        }
    }

    /// Strip the optional wrapper from value types.
    ///
    /// `Optional(Integer)` becomes `Scalar(Integer)`, while `Optional(Text)` keeps its
    /// wrapper since a missing text value is still a valid column value.
    pub const fn core_type(self) -> Self {
        match self {
            FieldType::Optional(s) if s.is_value_type() => FieldType::Scalar(s),
            other => other,
        }
    }

    pub const fn is_nullable(self) -> bool {
        match self {
            FieldType::Scalar(s) => !s.is_value_type(),
            FieldType::Optional(_) => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{}", s.name()),
            FieldType::Optional(s) => write!(f, "optional {}", s.name()),
        }
    }
}

/// A single cell value read out of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Scalar kind of this value, `None` for `Null`.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Text(_) => Some(ScalarType::Text),
            Value::Integer(_) => Some(ScalarType::Integer),
            Value::Float(_) => Some(ScalarType::Float),
            Value::Boolean(_) => Some(ScalarType::Boolean),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Textual form written by the table writer; null renders empty.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
        }
    }
}

/// Rust types that can back a record field.
pub trait FieldValue {
    const FIELD_TYPE: FieldType;

    fn to_value(&self) -> Value;
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Text);

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Integer);

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FieldValue for i32 {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Integer);

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FieldValue for u32 {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Integer);

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Float);

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Scalar(ScalarType::Boolean);

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE.optional();

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}
