// Record types and their field descriptors

use crate::value::{FieldType, Value};

/// Name, declared type and accessor for one field of a record type.
pub struct FieldDescriptor<R> {
    pub name: &'static str,
    pub field_type: FieldType,
    pub read: fn(&R) -> Value,
}

impl<R> FieldDescriptor<R> {
    pub fn value_of(&self, record: &R) -> Value {
        (self.read)(record)
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldDescriptor<R> {}

impl<R> std::fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .finish()
    }
}

/// A row-shaped type whose fields are known ahead of time.
///
/// Usually implemented through [`record!`](crate::record), which keeps `FIELDS`
/// in declaration order.
pub trait Record: Sized + 'static {
    const TYPE_NAME: &'static str;
    const FIELDS: &'static [FieldDescriptor<Self>];

    fn column_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.name).collect()
    }
}

/// Declare a struct together with its [`Record`] impl.
///
/// Attributes pass through to the struct and its fields. A field may carry
/// `as "name"` after its type to use a different column name.
///
/// ```
/// xlbench_table::record! {
///     #[derive(Debug, Clone)]
///     pub struct Reading {
///         pub sensor: String,
///         pub celsius: f64,
///         pub flagged: Option<bool> as "isFlagged",
///     }
/// }
///
/// use xlbench_table::Record;
/// assert_eq!(Reading::column_names(), ["sensor", "celsius", "isFlagged"]);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $fty:ty $(as $column:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $fty,
            )*
        }

        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const FIELDS: &'static [$crate::FieldDescriptor<Self>] = &[
                $(
                    $crate::FieldDescriptor {
                        name: $crate::__column_name!($field $(, $column)?),
                        field_type: <$fty as $crate::FieldValue>::FIELD_TYPE,
                        read: |record: &$name| $crate::FieldValue::to_value(&record.$field),
                    },
                )*
            ];
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __column_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident, $column:literal) => {
        $column
    };
}

#[cfg(test)]
mod tests {
    use crate::value::{FieldType, ScalarType, Value};
    use crate::Record;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Sample {
            name: String,
            count: i32,
            ratio: Option<f64> as "ratioPct",
            note: Option<String>,
        }
    }

    crate::record! {
        struct Empty {}
    }

    #[test]
    fn test_fields_follow_declaration_order() {
        assert_eq!(Sample::column_names(), ["name", "count", "ratioPct", "note"]);
        assert_eq!(Sample::TYPE_NAME, "Sample");
    }

    #[test]
    fn test_declared_types() {
        let types: Vec<FieldType> = Sample::FIELDS.iter().map(|f| f.field_type).collect();
        assert_eq!(
            types,
            [
                FieldType::Scalar(ScalarType::Text),
                FieldType::Scalar(ScalarType::Integer),
                FieldType::Optional(ScalarType::Float),
                FieldType::Optional(ScalarType::Text),
            ]
        );
    }

    #[test]
    fn test_accessors_read_fields() {
        let s = Sample {
            name: "a".into(),
            count: 3,
            ratio: None,
            note: Some("n".into()),
        };
        let values: Vec<Value> = Sample::FIELDS.iter().map(|f| f.value_of(&s)).collect();
        assert_eq!(
            values,
            [
                Value::Text("a".into()),
                Value::Integer(3),
                Value::Null,
                Value::Text("n".into()),
            ]
        );
    }

    #[test]
    fn test_zero_field_record() {
        assert!(Empty::FIELDS.is_empty());
        let _ = Empty {};
    }
}
