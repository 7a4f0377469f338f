//! Type classes used for operator and function type checking

use crate::OperatorType;
use policy_expr_diagnostics::{ExprError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse classification of values and declared property types.
///
/// `Variant` means the class is only known at runtime; `VarArgs` only
/// appears in function signatures and is never the class of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeClass {
    Unsupported,
    Numeric,
    String,
    Bool,
    DateTime,
    Guid,
    Array,
    BitmappedEnum,
    Variant,
    VarArgs,
}

const NUMERIC_OPERATORS: &[OperatorType] = &[
    OperatorType::Eq,
    OperatorType::Ge,
    OperatorType::Gt,
    OperatorType::Le,
    OperatorType::Lt,
    OperatorType::Ne,
    OperatorType::In,
    OperatorType::NotIn,
];

const STRING_OPERATORS: &[OperatorType] = &[
    OperatorType::Eq,
    OperatorType::Ne,
    OperatorType::Like,
    OperatorType::In,
    OperatorType::NotLike,
    OperatorType::NotIn,
];

// AND/OR are left out so constant bool operands cannot be combined
// logically at construction, they still evaluate at runtime.
const BOOL_OPERATORS: &[OperatorType] = &[OperatorType::Eq, OperatorType::Ne];

const DATETIME_OPERATORS: &[OperatorType] = &[
    OperatorType::Eq,
    OperatorType::Ge,
    OperatorType::Gt,
    OperatorType::Le,
    OperatorType::Lt,
    OperatorType::Ne,
];

const ARRAY_OPERATORS: &[OperatorType] = &[
    OperatorType::Eq,
    OperatorType::Ne,
    OperatorType::In,
    OperatorType::NotIn,
];

const BITMAPPED_ENUM_OPERATORS: &[OperatorType] = &[
    OperatorType::Eq,
    OperatorType::Ne,
    OperatorType::Beq,
    OperatorType::Bne,
];

pub(crate) const DEFAULT_OPERATORS: &[OperatorType] = &[OperatorType::Eq, OperatorType::Ne];

impl TypeClass {
    /// All type classes in declaration order
    pub const ALL: [TypeClass; 10] = [
        TypeClass::Unsupported,
        TypeClass::Numeric,
        TypeClass::String,
        TypeClass::Bool,
        TypeClass::DateTime,
        TypeClass::Guid,
        TypeClass::Array,
        TypeClass::BitmappedEnum,
        TypeClass::Variant,
        TypeClass::VarArgs,
    ];

    /// Textual form, identical to the variant name
    pub const fn name(&self) -> &'static str {
        match self {
            TypeClass::Unsupported => "Unsupported",
            TypeClass::Numeric => "Numeric",
            TypeClass::String => "String",
            TypeClass::Bool => "Bool",
            TypeClass::DateTime => "DateTime",
            TypeClass::Guid => "Guid",
            TypeClass::Array => "Array",
            TypeClass::BitmappedEnum => "BitmappedEnum",
            TypeClass::Variant => "Variant",
            TypeClass::VarArgs => "VarArgs",
        }
    }

    /// Parse a type class name ignoring ASCII case
    pub fn parse_ignore_case(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tc| tc.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExprError::invalid_argument(format!("'{s}' is not a type class")))
    }

    /// Operators a value of this class may be used with
    pub fn supported_operators(&self) -> &'static [OperatorType] {
        match self {
            TypeClass::Numeric => NUMERIC_OPERATORS,
            TypeClass::String => STRING_OPERATORS,
            TypeClass::Bool => BOOL_OPERATORS,
            TypeClass::DateTime => DATETIME_OPERATORS,
            TypeClass::Guid => DEFAULT_OPERATORS,
            TypeClass::Array => ARRAY_OPERATORS,
            TypeClass::BitmappedEnum => BITMAPPED_ENUM_OPERATORS,
            TypeClass::Unsupported => DEFAULT_OPERATORS,
            TypeClass::Variant | TypeClass::VarArgs => &[],
        }
    }

    /// Check whether `op` is supported for this class
    pub fn supports(&self, op: OperatorType) -> bool {
        self.supported_operators().contains(&op)
    }

    /// Two classes may be compared with each other.
    ///
    /// Identical classes are compatible; numeric and bitmapped enum values
    /// are compatible with each other.
    pub fn is_compatible_with(&self, other: TypeClass) -> bool {
        *self == other
            || matches!(
                (self, other),
                (TypeClass::Numeric, TypeClass::BitmappedEnum)
                    | (TypeClass::BitmappedEnum, TypeClass::Numeric)
            )
    }

    /// The class is known at construction time
    pub fn is_known(&self) -> bool {
        !matches!(
            self,
            TypeClass::Unsupported | TypeClass::Variant | TypeClass::VarArgs
        )
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeClass {
    type Err = ExprError;

    /// Case-sensitive parse, as used by the serializer
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tc| tc.name() == s)
            .ok_or_else(|| ExprError::serialization(s, "TypeClass"))
    }
}
