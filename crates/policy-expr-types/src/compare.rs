//! Runtime comparator
//!
//! `compare` applies one operator to two evaluated values. Null handling
//! comes first, then the empty-row marker, membership, bitwise flags, and
//! finally a per-class comparison once both classes are known compatible.

use crate::{
    OperatorType, TypeClass, Value, classify, like_match, to_bool, to_datetime, to_f64, to_guid,
    to_i64, to_text, value_supported_operators,
};
use policy_expr_diagnostics::{ExprError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How strings are compared for equality and LIKE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StringComparison {
    #[default]
    Ordinal,
    OrdinalIgnoreCase,
}

/// Options for a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompareOptions {
    pub string_comparison: StringComparison,
}

impl CompareOptions {
    pub fn new(string_comparison: StringComparison) -> Self {
        Self { string_comparison }
    }

    pub fn ignore_case() -> Self {
        Self::new(StringComparison::OrdinalIgnoreCase)
    }

    pub fn case_insensitive(&self) -> bool {
        self.string_comparison == StringComparison::OrdinalIgnoreCase
    }
}

/// Apply `op` to `left` and `right`
pub fn compare(left: &Value, right: &Value, op: OperatorType, options: CompareOptions) -> Result<bool> {
    if left.is_null() || right.is_null() {
        let both = left.is_null() && right.is_null();
        return Ok(match op {
            OperatorType::Eq => both,
            OperatorType::Ne => !both,
            _ => false,
        });
    }
    if left.is_empty_marker() || right.is_empty_marker() {
        return Ok(false);
    }

    let left_class = classify(left);
    let right_class = classify(right);

    match op {
        OperatorType::In | OperatorType::NotIn => {
            if !value_supported_operators(left).contains(&op) {
                return Err(ExprError::operator_not_applicable(
                    op.symbol(),
                    left_class.name(),
                ));
            }
            if left_class == TypeClass::Array {
                return Err(ExprError::invalid_in(op.symbol()));
            }
            let Value::Array(items) = right else {
                return Err(ExprError::type_mismatch(left_class.name(), right_class.name()));
            };
            let found = match left_class {
                TypeClass::Numeric => contains_numeric(left, items)?,
                TypeClass::String => contains_string(left, items, options)?,
                _ => {
                    return Err(ExprError::type_mismatch(
                        left_class.name(),
                        right_class.name(),
                    ));
                }
            };
            Ok(found == (op == OperatorType::In))
        }
        OperatorType::Beq | OperatorType::Bne => {
            let l = to_i64(left)
                .map_err(|_| ExprError::type_mismatch("BitmappedEnum", left.kind_name()))?;
            let r = to_i64(right)
                .map_err(|_| ExprError::type_mismatch("BitmappedEnum", right.kind_name()))?;
            let equal = (l == 0 && r == 0) || (l & r) == r;
            Ok(equal == (op == OperatorType::Beq))
        }
        OperatorType::None => Err(ExprError::invalid_argument("operator NONE cannot be evaluated")),
        _ => {
            if !left_class.is_compatible_with(right_class) {
                return Err(ExprError::type_mismatch(left_class.name(), right_class.name()));
            }
            match left_class {
                TypeClass::Numeric | TypeClass::BitmappedEnum => compare_numeric(left, right, op),
                TypeClass::String => compare_string(left, right, op, options),
                TypeClass::Bool => compare_bool(left, right, op),
                TypeClass::DateTime => compare_datetime(left, right, op),
                TypeClass::Guid => compare_guid(left, right, op),
                TypeClass::Array => compare_array(left, right, op, options),
                other => Err(ExprError::operator_not_applicable(op.symbol(), other.name())),
            }
        }
    }
}

fn numeric(value: &Value) -> Result<f64> {
    to_f64(value).map_err(|_| ExprError::type_mismatch("Numeric", value.kind_name()))
}

fn compare_numeric(left: &Value, right: &Value, op: OperatorType) -> Result<bool> {
    let has_enum = matches!(left, Value::Enum(_)) || matches!(right, Value::Enum(_));
    if has_enum && !matches!(op, OperatorType::Eq | OperatorType::Ne) {
        return Err(ExprError::operator_not_applicable(op.symbol(), "Enum"));
    }
    let l = numeric(left)?;
    let r = numeric(right)?;
    match op {
        OperatorType::Eq => Ok(l == r),
        OperatorType::Ne => Ok(l != r),
        OperatorType::Ge => Ok(l >= r),
        OperatorType::Gt => Ok(l > r),
        OperatorType::Le => Ok(l <= r),
        OperatorType::Lt => Ok(l < r),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::Numeric.name(),
        )),
    }
}

fn strings_equal(left: &str, right: &str, options: CompareOptions) -> bool {
    if options.case_insensitive() {
        left.to_lowercase() == right.to_lowercase()
    } else {
        left == right
    }
}

fn compare_string(left: &Value, right: &Value, op: OperatorType, options: CompareOptions) -> Result<bool> {
    let l = to_text(left);
    let r = to_text(right);
    match op {
        OperatorType::Eq => Ok(strings_equal(&l, &r, options)),
        OperatorType::Ne => Ok(!strings_equal(&l, &r, options)),
        OperatorType::Like => Ok(evaluate_like(&l, &r, options)),
        OperatorType::NotLike => Ok(!evaluate_like(&l, &r, options)),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::String.name(),
        )),
    }
}

// A pattern that does not translate or compile never matches.
fn evaluate_like(input: &str, pattern: &str, options: CompareOptions) -> bool {
    match like_match(input, pattern, options.case_insensitive()) {
        Ok(matched) => matched,
        Err(err) => {
            log::warn!("LIKE pattern '{pattern}' ignored: {err}");
            false
        }
    }
}

fn compare_bool(left: &Value, right: &Value, op: OperatorType) -> Result<bool> {
    let l = to_bool(left)?;
    let r = to_bool(right)?;
    match op {
        OperatorType::And => Ok(l && r),
        OperatorType::Or => Ok(l || r),
        OperatorType::Eq => Ok(l == r),
        OperatorType::Ne => Ok(l != r),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::Bool.name(),
        )),
    }
}

fn compare_datetime(left: &Value, right: &Value, op: OperatorType) -> Result<bool> {
    let l = to_datetime(left)?;
    let r = to_datetime(right)?;
    match op {
        OperatorType::Eq => Ok(l == r),
        OperatorType::Ne => Ok(l != r),
        OperatorType::Ge => Ok(l >= r),
        OperatorType::Gt => Ok(l > r),
        OperatorType::Le => Ok(l <= r),
        OperatorType::Lt => Ok(l < r),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::DateTime.name(),
        )),
    }
}

fn compare_guid(left: &Value, right: &Value, op: OperatorType) -> Result<bool> {
    let l = to_guid(left)?;
    let r = to_guid(right)?;
    match op {
        OperatorType::Eq => Ok(l == r),
        OperatorType::Ne => Ok(l != r),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::Guid.name(),
        )),
    }
}

fn compare_array(left: &Value, right: &Value, op: OperatorType, options: CompareOptions) -> Result<bool> {
    let (Value::Array(l), Value::Array(r)) = (left, right) else {
        return Err(ExprError::type_mismatch(
            TypeClass::Array.name(),
            right.kind_name(),
        ));
    };
    match op {
        OperatorType::Eq => arrays_equal(l, r, options),
        OperatorType::Ne => arrays_equal(l, r, options).map(|eq| !eq),
        _ => Err(ExprError::operator_not_applicable(
            op.symbol(),
            TypeClass::Array.name(),
        )),
    }
}

fn arrays_equal(left: &[Value], right: &[Value], options: CompareOptions) -> Result<bool> {
    if left.len() != right.len() {
        return Ok(false);
    }
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    sort_values(&mut left);
    sort_values(&mut right);

    // Elements are compared the way the first non-null element compares.
    let element_class = left.iter().find(|v| !v.is_null()).map(classify);
    for (l, r) in left.iter().zip(right.iter()) {
        let equal = match element_class {
            Some(TypeClass::Numeric) if !l.is_null() && !r.is_null() => numeric(l)? == numeric(r)?,
            Some(TypeClass::String) if !l.is_null() && !r.is_null() => {
                strings_equal(&to_text(l), &to_text(r), options)
            }
            _ => compare(l, r, OperatorType::Eq, options)?,
        };
        if !equal {
            return Ok(false);
        }
    }
    Ok(true)
}

fn contains_numeric(needle: &Value, items: &[Value]) -> Result<bool> {
    let n = numeric(needle)?;
    for item in items.iter().filter(|v| !v.is_null_or_empty()) {
        if numeric(item)? == n {
            return Ok(true);
        }
    }
    Ok(false)
}

fn contains_string(needle: &Value, items: &[Value], options: CompareOptions) -> Result<bool> {
    let n = to_text(needle);
    Ok(items
        .iter()
        .filter(|v| !v.is_null_or_empty())
        .any(|item| strings_equal(&n, &to_text(item), options)))
}

fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Empty => 1,
        Value::Bool(_) => 2,
        Value::Int(_)
        | Value::Long(_)
        | Value::Short(_)
        | Value::Byte(_)
        | Value::Double(_)
        | Value::Single(_)
        | Value::Decimal(_)
        | Value::Enum(_) => 3,
        Value::String(_) | Value::Char(_) | Value::Secure(_) => 4,
        Value::DateTime(_) => 5,
        Value::Guid(_) => 6,
        Value::Array(_) => 7,
    }
}

fn total_cmp(a: &Value, b: &Value) -> Ordering {
    let rank = sort_rank(a).cmp(&sort_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::Guid(x), Value::Guid(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
        _ if sort_rank(a) == 3 => {
            let x = to_f64(a).unwrap_or(f64::NAN);
            let y = to_f64(b).unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        _ if sort_rank(a) == 4 => to_text(a).cmp(&to_text(b)),
        _ => Ordering::Equal,
    }
}

/// Sort values in place with a total order (nulls first, numbers by value,
/// strings ordinally)
pub fn sort_values(values: &mut [Value]) {
    values.sort_by(total_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnumValue;

    fn eq(l: Value, r: Value) -> bool {
        compare(&l, &r, OperatorType::Eq, CompareOptions::default()).unwrap()
    }

    #[test]
    fn test_mixed_numeric_widths() {
        assert!(eq(Value::Int(5), Value::Double(5.0)));
        assert!(eq(Value::Byte(1), Value::Long(1)));
    }

    #[test]
    fn test_enum_only_equality() {
        let e = Value::Enum(EnumValue::new("RecoveryModel", "Full", 1, false));
        assert!(eq(e.clone(), Value::Int(1)));
        let err = compare(&e, &Value::Int(0), OperatorType::Gt, CompareOptions::default());
        assert!(matches!(err, Err(ExprError::OperatorNotApplicable { .. })));
    }

    #[test]
    fn test_sort_values() {
        let mut v = vec![Value::Int(3), Value::Null, Value::Double(1.5), Value::Long(2)];
        sort_values(&mut v);
        assert_eq!(
            v,
            vec![Value::Null, Value::Double(1.5), Value::Long(2), Value::Int(3)]
        );
    }
}
