//! Type names and value text
//!
//! Every serialized value is written as a pair: its `System.*` type name
//! (or the qualified enum type name) and its text. Date/times are written as
//! binary tick counts; everything else uses its display text with restricted
//! characters escaped.

use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::escape::{xml_escape_restricted, xml_unescape_restricted};
use policy_expr_types::{EnumRegistry, Value, datetime_from_ticks, datetime_to_ticks, parse_guid};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;

/// Type name written for a null value
pub const NULL_TYPE: &str = "NULL";

/// Type name written for an array result
pub const ARRAY_TYPE: &str = "System.Object[]";

/// Type name of a value
pub fn type_name(value: &Value) -> Cow<'_, str> {
    let name = match value {
        Value::Null => NULL_TYPE,
        Value::Empty => "System.DBNull",
        Value::Int(_) => "System.Int32",
        Value::Long(_) => "System.Int64",
        Value::Short(_) => "System.Int16",
        Value::Byte(_) => "System.Byte",
        Value::Double(_) => "System.Double",
        Value::Single(_) => "System.Single",
        Value::Decimal(_) => "System.Decimal",
        Value::String(_) | Value::Secure(_) => "System.String",
        Value::Char(_) => "System.Char",
        Value::Bool(_) => "System.Boolean",
        Value::DateTime(_) => "System.DateTime",
        Value::Guid(_) => "System.Guid",
        Value::Array(_) => ARRAY_TYPE,
        Value::Enum(e) => return Cow::Borrowed(e.type_name.as_str()),
    };
    Cow::Borrowed(name)
}

/// Text of a scalar value
pub fn value_to_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(NULL_TYPE.to_string()),
        Value::DateTime(dt) => datetime_to_ticks(dt).map(|ticks| ticks.to_string()),
        Value::Array(_) => Err(ExprError::unsupported_type(ARRAY_TYPE)),
        other => Ok(xml_escape_restricted(&other.to_string())),
    }
}

fn conversion_error(text: &str, type_name: &str) -> ExprError {
    ExprError::type_conversion(text, type_name)
}

fn parse_number<T: FromStr>(text: &str, type_name: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| conversion_error(text, type_name))
}

/// Rebuild a scalar value from its type name and text.
///
/// Names outside the `System.*` set are looked up in `enums`; a name that
/// resolves nowhere is `UnsupportedType`.
pub fn value_from_text(type_name: &str, text: &str, enums: &EnumRegistry) -> Result<Value> {
    let text = xml_unescape_restricted(text);
    match type_name {
        NULL_TYPE => Ok(Value::Null),
        "System.String" => Ok(Value::String(text)),
        "System.Int32" => parse_number(&text, type_name).map(Value::Int),
        "System.Int64" => parse_number(&text, type_name).map(Value::Long),
        "System.Int16" => parse_number(&text, type_name).map(Value::Short),
        "System.Byte" => parse_number(&text, type_name).map(Value::Byte),
        "System.Double" => parse_number(&text, type_name).map(Value::Double),
        "System.Single" => parse_number(&text, type_name).map(Value::Single),
        "System.Decimal" => Decimal::from_str(text.trim())
            .map(Value::Decimal)
            .map_err(|_| conversion_error(&text, type_name)),
        "System.Boolean" => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(conversion_error(&text, type_name)),
        },
        "System.Char" => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(conversion_error(&text, type_name)),
            }
        }
        "System.DateTime" => {
            let binary: i64 = parse_number(&text, type_name)?;
            datetime_from_ticks(binary)
                .map(Value::DateTime)
                .map_err(|_| conversion_error(&text, type_name))
        }
        "System.Guid" => parse_guid(&text)
            .map(Value::Guid)
            .map_err(|_| conversion_error(&text, type_name)),
        "System.DBNull" => Ok(Value::Empty),
        other => {
            let Some(definition) = enums.resolve(other) else {
                log::debug!("no enum provider knows type {other}");
                return Err(ExprError::unsupported_type(other));
            };
            definition
                .parse(&text)
                .map(Value::Enum)
                .map_err(|_| conversion_error(&text, other))
        }
    }
}
