//! Runtime values
//!
//! `Value` is what attributes resolve to, what constants hold and what
//! evaluation caches on every node. Numeric values keep their width so the
//! serializer can write them back with the same type name.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Format used when a date/time is turned into text
pub const DATETIME_TEXT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (unset property, null constant)
    Null,
    /// Marker returned by a script query that produced no row
    Empty,
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(u8),
    Double(f64),
    Single(f32),
    Decimal(Decimal),
    String(String),
    Char(char),
    Bool(bool),
    /// Naive wall-clock time
    DateTime(NaiveDateTime),
    Guid(Uuid),
    Enum(EnumValue),
    Array(Vec<Value>),
    /// Masked string; normalized to `String` before it is compared or stored
    Secure(SecureString),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this is the empty-row marker
    pub fn is_empty_marker(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Null or the empty-row marker
    pub fn is_null_or_empty(&self) -> bool {
        matches!(self, Self::Null | Self::Empty)
    }

    /// Check if this is a bitmapped (flags) enum value
    pub fn is_flags_enum(&self) -> bool {
        matches!(self, Self::Enum(e) if e.flags)
    }

    /// Check if this value is `true`
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Secure(s) => Some(s.expose()),
            _ => None,
        }
    }

    /// Replace masked strings by plain strings, recursively
    pub fn normalize(self) -> Self {
        match self {
            Self::Secure(s) => Self::String(s.into_inner()),
            Self::Array(items) => Self::Array(items.into_iter().map(Value::normalize).collect()),
            other => other,
        }
    }

    /// Short name of the runtime type, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Empty => "DBNull",
            Self::Int(_) => "Int32",
            Self::Long(_) => "Int64",
            Self::Short(_) => "Int16",
            Self::Byte(_) => "Byte",
            Self::Double(_) => "Double",
            Self::Single(_) => "Single",
            Self::Decimal(_) => "Decimal",
            Self::String(_) | Self::Secure(_) => "String",
            Self::Char(_) => "Char",
            Self::Bool(_) => "Boolean",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::Enum(_) => "Enum",
            Self::Array(_) => "Array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Empty => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Single(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Char(c) => write!(f, "{c}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_TEXT_FORMAT)),
            Self::Guid(g) => write!(f, "{g}"),
            Self::Enum(e) => f.write_str(&e.member),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Secure(s) => f.write_str(s.expose()),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Self::Enum(v)
    }
}

/// A resolved enumeration member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// Fully qualified enum type name
    pub type_name: String,
    /// Member text; for flags combinations a `", "` separated list
    pub member: String,
    /// Underlying numeric value
    pub value: i64,
    /// The enum is a bitmap of flags
    pub flags: bool,
}

impl EnumValue {
    pub fn new(
        type_name: impl Into<String>,
        member: impl Into<String>,
        value: i64,
        flags: bool,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
            value,
            flags,
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.member)
    }
}

/// Masked string (passwords and similar properties)
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Read the clear text
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_secure() {
        let v = Value::Secure(SecureString::new("p@ss"));
        assert_eq!(v.normalize(), Value::string("p@ss"));

        let arr = Value::Array(vec![Value::Secure(SecureString::new("a")), Value::Int(1)]);
        assert_eq!(
            arr.normalize(),
            Value::Array(vec![Value::string("a"), Value::Int(1)])
        );
    }

    #[test]
    fn test_secure_debug_is_masked() {
        let s = SecureString::new("hunter2");
        assert!(!format!("{s:?}").contains("hunter2"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Double(3.0).to_string(), "3");
        assert_eq!(Value::Null.to_string(), "");
        let dt = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2020-01-02T03:04:05");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::string("b")]).to_string(),
            "1,b"
        );
    }

    #[test]
    fn test_flags_enum() {
        let e = EnumValue::new("Perm", "Read, Write", 3, true);
        assert!(Value::Enum(e).is_flags_enum());
        let e = EnumValue::new("Model", "Full", 1, false);
        assert!(!Value::Enum(e).is_flags_enum());
    }
}
