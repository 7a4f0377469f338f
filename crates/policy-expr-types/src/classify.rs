//! Type classification of runtime values and declared property types

use crate::type_class::DEFAULT_OPERATORS;
use crate::{OperatorType, TypeClass, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a facet property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeclaredType {
    Int32,
    Int64,
    Int16,
    Byte,
    Double,
    Single,
    Decimal,
    String,
    Char,
    Bool,
    DateTime,
    Guid,
    Enum {
        type_name: String,
        #[serde(default)]
        flags: bool,
    },
    Array {
        element: Box<DeclaredType>,
    },
    /// Any type the engine has no class for
    Other {
        name: String,
    },
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Int32 => f.write_str("Int32"),
            DeclaredType::Int64 => f.write_str("Int64"),
            DeclaredType::Int16 => f.write_str("Int16"),
            DeclaredType::Byte => f.write_str("Byte"),
            DeclaredType::Double => f.write_str("Double"),
            DeclaredType::Single => f.write_str("Single"),
            DeclaredType::Decimal => f.write_str("Decimal"),
            DeclaredType::String => f.write_str("String"),
            DeclaredType::Char => f.write_str("Char"),
            DeclaredType::Bool => f.write_str("Boolean"),
            DeclaredType::DateTime => f.write_str("DateTime"),
            DeclaredType::Guid => f.write_str("Guid"),
            DeclaredType::Enum { type_name, .. } => f.write_str(type_name),
            DeclaredType::Array { element } => write!(f, "{element}[]"),
            DeclaredType::Other { name } => f.write_str(name),
        }
    }
}

/// Classify a runtime value
pub fn classify(value: &Value) -> TypeClass {
    match value {
        Value::Int(_)
        | Value::Long(_)
        | Value::Short(_)
        | Value::Byte(_)
        | Value::Double(_)
        | Value::Single(_)
        | Value::Decimal(_) => TypeClass::Numeric,
        Value::Enum(e) if e.flags => TypeClass::BitmappedEnum,
        Value::Enum(_) => TypeClass::Numeric,
        Value::String(_) | Value::Char(_) | Value::Secure(_) => TypeClass::String,
        Value::Bool(_) => TypeClass::Bool,
        Value::DateTime(_) => TypeClass::DateTime,
        Value::Guid(_) => TypeClass::Guid,
        Value::Array(_) => TypeClass::Array,
        Value::Null | Value::Empty => TypeClass::Unsupported,
    }
}

/// Classify a declared property type
pub fn classify_declared(declared: &DeclaredType) -> TypeClass {
    match declared {
        DeclaredType::Int32
        | DeclaredType::Int64
        | DeclaredType::Int16
        | DeclaredType::Byte
        | DeclaredType::Double
        | DeclaredType::Single
        | DeclaredType::Decimal => TypeClass::Numeric,
        DeclaredType::Enum { flags: true, .. } => TypeClass::BitmappedEnum,
        DeclaredType::Enum { flags: false, .. } => TypeClass::Numeric,
        DeclaredType::String | DeclaredType::Char => TypeClass::String,
        DeclaredType::Bool => TypeClass::Bool,
        DeclaredType::DateTime => TypeClass::DateTime,
        DeclaredType::Guid => TypeClass::Guid,
        DeclaredType::Array { .. } => TypeClass::Array,
        DeclaredType::Other { .. } => TypeClass::Unsupported,
    }
}

/// Operators applicable to a concrete value.
///
/// Differs from the class table only for enums: a non-flags enum
/// classifies as numeric but only supports equality.
pub fn value_supported_operators(value: &Value) -> &'static [OperatorType] {
    match value {
        Value::Enum(e) if !e.flags => DEFAULT_OPERATORS,
        other => classify(other).supported_operators(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnumValue;

    #[test]
    fn test_enum_classes() {
        let plain = Value::Enum(EnumValue::new("RecoveryModel", "Full", 1, false));
        let flags = Value::Enum(EnumValue::new("Permissions", "Read", 1, true));
        assert_eq!(classify(&plain), TypeClass::Numeric);
        assert_eq!(classify(&flags), TypeClass::BitmappedEnum);
        assert!(!value_supported_operators(&plain).contains(&OperatorType::Gt));
        assert!(value_supported_operators(&flags).contains(&OperatorType::Beq));
    }

    #[test]
    fn test_declared_serde() {
        let json = r#"{"kind":"Enum","type_name":"Permissions","flags":true}"#;
        let declared: DeclaredType = serde_json::from_str(json).unwrap();
        assert_eq!(classify_declared(&declared), TypeClass::BitmappedEnum);

        let json = r#"{"kind":"Array","element":{"kind":"String"}}"#;
        let declared: DeclaredType = serde_json::from_str(json).unwrap();
        assert_eq!(classify_declared(&declared), TypeClass::Array);
        assert_eq!(declared.to_string(), "String[]");
    }
}
