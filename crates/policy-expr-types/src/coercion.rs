//! Value conversions
//!
//! Functions and comparators work on a handful of target representations
//! (f64, i64, text, bool, date/time, guid). These helpers convert any
//! runtime value into one of them, failing with `TypeConversion` when the
//! value has no such representation.

use crate::{TypeClass, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use policy_expr_diagnostics::{ExprError, Result};
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

/// 100ns ticks per second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

const TICKS_MASK: i64 = 0x3FFF_FFFF_FFFF_FFFF;

fn ticks_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// The smallest representable date/time (0001-01-01T00:00:00)
pub fn min_datetime() -> NaiveDateTime {
    ticks_epoch()
}

/// The largest representable date/time (9999-12-31T23:59:59.9999999)
pub fn max_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_900))
        .unwrap_or_default()
}

/// Ticks of [`max_datetime`]
pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;

/// Whether `dt` lies in 0001-01-01..=9999-12-31T23:59:59.9999999
pub fn datetime_in_range(dt: &NaiveDateTime) -> bool {
    (min_datetime()..=max_datetime()).contains(dt)
}

/// Pass `dt` through when it is representable, else `TypeConversion`
pub fn check_datetime_range(dt: NaiveDateTime) -> Result<NaiveDateTime> {
    if datetime_in_range(&dt) {
        Ok(dt)
    } else {
        Err(ExprError::type_conversion(dt.to_string(), "DateTime"))
    }
}

/// Convert to f64
pub fn to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(0.0),
        Value::Int(v) => Ok(f64::from(*v)),
        Value::Long(v) => Ok(*v as f64),
        Value::Short(v) => Ok(f64::from(*v)),
        Value::Byte(v) => Ok(f64::from(*v)),
        Value::Double(v) => Ok(*v),
        Value::Single(v) => Ok(f64::from(*v)),
        Value::Decimal(d) => d
            .to_f64()
            .ok_or_else(|| ExprError::type_conversion(d.to_string(), "Double")),
        Value::Enum(e) => Ok(e.value as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(_) | Value::Secure(_) => {
            let text = value.to_string();
            text.trim()
                .parse::<f64>()
                .map_err(|_| ExprError::type_conversion(text, "Double"))
        }
        other => Err(ExprError::type_conversion(other.to_string(), "Double")),
    }
}

/// Convert to i64; fractional values round half to even
pub fn to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Null => Ok(0),
        Value::Int(v) => Ok(i64::from(*v)),
        Value::Long(v) => Ok(*v),
        Value::Short(v) => Ok(i64::from(*v)),
        Value::Byte(v) => Ok(i64::from(*v)),
        Value::Enum(e) => Ok(e.value),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Decimal(d) => d
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or_else(|| ExprError::type_conversion(d.to_string(), "Int64")),
        Value::Double(_) | Value::Single(_) => {
            let f = to_f64(value)?;
            let rounded = f.round_ties_even();
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
                Ok(rounded as i64)
            } else {
                Err(ExprError::type_conversion(f.to_string(), "Int64"))
            }
        }
        Value::String(_) | Value::Secure(_) => {
            let text = value.to_string();
            text.trim()
                .parse::<i64>()
                .map_err(|_| ExprError::type_conversion(text, "Int64"))
        }
        other => Err(ExprError::type_conversion(other.to_string(), "Int64")),
    }
}

/// Convert to i32, failing on overflow
pub fn to_i32(value: &Value) -> Result<i32> {
    let wide = to_i64(value)?;
    i32::try_from(wide).map_err(|_| ExprError::type_conversion(wide.to_string(), "Int32"))
}

/// Text form of a value; null becomes the empty string
pub fn to_text(value: &Value) -> String {
    value.to_string()
}

/// Convert to bool
pub fn to_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::String(_) | Value::Secure(_) => {
            let text = value.to_string();
            match text.trim() {
                t if t.eq_ignore_ascii_case("true") => Ok(true),
                t if t.eq_ignore_ascii_case("false") => Ok(false),
                _ => Err(ExprError::type_conversion(text, "Boolean")),
            }
        }
        Value::Int(_)
        | Value::Long(_)
        | Value::Short(_)
        | Value::Byte(_)
        | Value::Double(_)
        | Value::Single(_)
        | Value::Decimal(_)
        | Value::Enum(_) => Ok(to_f64(value)? != 0.0),
        other => Err(ExprError::type_conversion(other.to_string(), "Boolean")),
    }
}

/// Convert to a date/time
pub fn to_datetime(value: &Value) -> Result<NaiveDateTime> {
    match value {
        Value::Null => Ok(min_datetime()),
        Value::DateTime(dt) => Ok(*dt),
        Value::String(_) | Value::Secure(_) => parse_datetime(&value.to_string()),
        other => Err(ExprError::type_conversion(other.to_string(), "DateTime")),
    }
}

/// Convert to a guid
pub fn to_guid(value: &Value) -> Result<Uuid> {
    match value {
        Value::Guid(g) => Ok(*g),
        Value::String(_) | Value::Secure(_) => parse_guid(&value.to_string()),
        other => Err(ExprError::type_conversion(other.to_string(), "Guid")),
    }
}

/// Convert to the representation of `class`
pub fn convert_to_class(value: Value, class: TypeClass) -> Result<Value> {
    match class {
        TypeClass::Numeric => to_f64(&value).map(Value::Double),
        TypeClass::String => Ok(Value::String(to_text(&value))),
        TypeClass::Bool => to_bool(&value).map(Value::Bool),
        TypeClass::DateTime => to_datetime(&value).map(Value::DateTime),
        TypeClass::Guid => to_guid(&value).map(Value::Guid),
        TypeClass::Array => match value {
            Value::Array(items) => Ok(Value::Array(items)),
            other => Err(ExprError::type_conversion(other.to_string(), "Array")),
        },
        other => Err(ExprError::invalid_argument(format!(
            "cannot convert a value to type class {other}"
        ))),
    }
}

/// Parse date/time text.
///
/// Accepts ISO 8601 with or without a time part and fractional seconds,
/// a space instead of `T`, and RFC 3339 text with an offset (the wall-clock
/// time at that offset is kept).
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    parse_datetime_unchecked(text).and_then(check_datetime_range)
}

fn parse_datetime_unchecked(text: &str) -> Result<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
    ];
    let trimmed = text.trim();
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }
    Err(ExprError::type_conversion(text, "DateTime"))
}

/// Parse guid text (hyphenated, simple, braced or URN form)
pub fn parse_guid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text.trim()).map_err(|_| ExprError::type_conversion(text, "Guid"))
}

/// Round-trip text of a date/time, seven fractional digits
pub fn datetime_to_iso(dt: &NaiveDateTime) -> String {
    format!(
        "{}.{:07}",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        dt.nanosecond() % 1_000_000_000 / 100
    )
}

/// Number of 100ns ticks since 0001-01-01.
///
/// Dates outside [`min_datetime`]..=[`max_datetime`] have no tick count.
pub fn datetime_to_ticks(dt: &NaiveDateTime) -> Result<i64> {
    let dt = check_datetime_range(*dt)?;
    let delta = dt - ticks_epoch();
    let sub_ticks = i64::from(delta.subsec_nanos()) / 100;
    delta
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(sub_ticks))
        .ok_or_else(|| ExprError::type_conversion(dt.to_string(), "System.DateTime"))
}

/// Inverse of [`datetime_to_ticks`]; the two kind bits are ignored
pub fn datetime_from_ticks(binary: i64) -> Result<NaiveDateTime> {
    let ticks = binary & TICKS_MASK;
    if ticks > MAX_TICKS {
        return Err(ExprError::type_conversion(binary.to_string(), "System.DateTime"));
    }
    let seconds = ticks / TICKS_PER_SECOND;
    let nanos = (ticks % TICKS_PER_SECOND) * 100;
    chrono::TimeDelta::try_seconds(seconds)
        .and_then(|d| d.checked_add(&chrono::TimeDelta::nanoseconds(nanos)))
        .and_then(|d| ticks_epoch().checked_add_signed(d))
        .ok_or_else(|| ExprError::type_conversion(binary.to_string(), "System.DateTime"))
}
