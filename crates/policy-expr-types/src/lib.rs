//! Policy expression type system
//!
//! This crate defines the runtime side of the expression engine:
//! - Runtime values (`Value`) and their text conversions
//! - Type classes and the operators each class supports
//! - The runtime comparator, including the LIKE to regex translation
//! - Enum registration for named and bitmapped enumerations
//! - Escaping helpers shared by the serializer and the filter bridge

pub mod classify;
pub mod coercion;
pub mod compare;
pub mod enums;
pub mod escape;
pub mod like;
pub mod operator;
pub mod type_class;
pub mod value;

pub use classify::{DeclaredType, classify, classify_declared, value_supported_operators};
pub use coercion::*;
pub use compare::{CompareOptions, StringComparison, compare, sort_values};
pub use enums::{EnumDefinition, EnumProvider, EnumRegistry, StaticEnumProvider};
pub use like::{like_match, like_to_regex};
pub use operator::OperatorType;
pub use type_class::TypeClass;
pub use value::{EnumValue, SecureString, Value};
