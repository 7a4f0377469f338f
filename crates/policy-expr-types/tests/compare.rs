//! Runtime comparator tests
//!
//! Covers:
//! - Null and empty-row handling
//! - Membership (IN / NOT IN)
//! - Bitwise flag comparison
//! - Per-class comparisons and type mismatches

use chrono::NaiveDate;
use policy_expr_diagnostics::ExprError;
use policy_expr_types::*;
use rstest::rstest;
use uuid::Uuid;

fn cmp(left: Value, right: Value, op: OperatorType) -> Result<bool, ExprError> {
    compare(&left, &right, op, CompareOptions::default())
}

fn s(text: &str) -> Value {
    Value::string(text)
}

fn flags(value: i64) -> Value {
    Value::Enum(EnumValue::new("Demo.Permissions", value.to_string(), value, true))
}

// === Null and empty marker ===

#[rstest]
#[case(Value::Null, Value::Null, OperatorType::Eq, true)]
#[case(Value::Null, Value::Null, OperatorType::Ne, false)]
#[case(Value::Null, Value::Int(1), OperatorType::Eq, false)]
#[case(Value::Int(1), Value::Null, OperatorType::Ne, true)]
#[case(Value::Null, Value::Int(1), OperatorType::Gt, false)]
#[case(Value::Null, Value::Null, OperatorType::Like, false)]
fn test_null_rules(
    #[case] left: Value,
    #[case] right: Value,
    #[case] op: OperatorType,
    #[case] expected: bool,
) {
    assert_eq!(cmp(left, right, op).unwrap(), expected);
}

#[rstest]
#[case(OperatorType::Eq)]
#[case(OperatorType::Ne)]
#[case(OperatorType::Gt)]
#[case(OperatorType::In)]
fn test_empty_marker_is_always_false(#[case] op: OperatorType) {
    assert!(!cmp(Value::Empty, Value::Int(1), op).unwrap());
    assert!(!cmp(s("x"), Value::Empty, op).unwrap());
}

// === Membership ===

#[test]
fn test_numeric_membership() {
    let list = Value::Array(vec![Value::Int(1), Value::Double(2.0), Value::Long(3)]);
    assert!(cmp(Value::Int(2), list.clone(), OperatorType::In).unwrap());
    assert!(!cmp(Value::Int(5), list.clone(), OperatorType::In).unwrap());
    assert!(cmp(Value::Int(5), list, OperatorType::NotIn).unwrap());
}

#[test]
fn test_string_membership_honors_case() {
    let list = Value::Array(vec![s("master"), s("model")]);
    assert!(!cmp(s("MASTER"), list.clone(), OperatorType::In).unwrap());
    assert!(
        compare(&s("MASTER"), &list, OperatorType::In, CompareOptions::ignore_case()).unwrap()
    );
}

#[test]
fn test_membership_errors() {
    let list = Value::Array(vec![Value::Int(1)]);
    assert!(matches!(
        cmp(list.clone(), list.clone(), OperatorType::In),
        Err(ExprError::InvalidInOperator { .. })
    ));
    assert!(matches!(
        cmp(Value::Bool(true), list.clone(), OperatorType::In),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
    assert!(matches!(
        cmp(Value::Int(1), Value::Int(1), OperatorType::In),
        Err(ExprError::TypeMismatch { .. })
    ));
    let plain_enum = Value::Enum(EnumValue::new("Demo.Model", "Full", 1, false));
    assert!(matches!(
        cmp(plain_enum, list, OperatorType::In),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

// === Bitwise flags ===

#[rstest]
#[case(0b0111, 0b0011, true)]
#[case(0b0100, 0b0011, false)]
#[case(0, 0, true)]
#[case(0b0001, 0, true)]
#[case(0, 0b0001, false)]
fn test_bitwise_equality(#[case] left: i64, #[case] right: i64, #[case] equal: bool) {
    assert_eq!(cmp(flags(left), flags(right), OperatorType::Beq).unwrap(), equal);
    assert_eq!(cmp(flags(left), flags(right), OperatorType::Bne).unwrap(), !equal);
}

#[test]
fn test_flags_compatible_with_numbers() {
    assert!(cmp(flags(4), Value::Int(4), OperatorType::Eq).unwrap());
    assert!(matches!(
        cmp(flags(4), Value::Int(4), OperatorType::Gt),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

// === Per-class comparisons ===

#[rstest]
#[case(Value::Int(3), Value::Double(2.5), OperatorType::Gt, true)]
#[case(Value::Short(3), Value::Byte(3), OperatorType::Ge, true)]
#[case(Value::Single(1.5), Value::Int(2), OperatorType::Lt, true)]
#[case(Value::Long(7), Value::Int(7), OperatorType::Le, true)]
#[case(Value::Int(7), Value::Int(8), OperatorType::Ne, true)]
fn test_numeric(
    #[case] left: Value,
    #[case] right: Value,
    #[case] op: OperatorType,
    #[case] expected: bool,
) {
    assert_eq!(cmp(left, right, op).unwrap(), expected);
}

#[rstest]
#[case("AdventureWorks", "Adventure%", OperatorType::Like, true)]
#[case("AdventureWorks", "adventure%", OperatorType::Like, false)]
#[case("AdventureWorks", "Adventure%", OperatorType::NotLike, false)]
#[case("abc", "a_c", OperatorType::Like, true)]
#[case("abc", "[abc", OperatorType::Like, false)]
#[case("abc", "[abc", OperatorType::NotLike, true)]
fn test_string_like(
    #[case] left: &str,
    #[case] pattern: &str,
    #[case] op: OperatorType,
    #[case] expected: bool,
) {
    assert_eq!(cmp(s(left), s(pattern), op).unwrap(), expected);
}

#[test]
fn test_string_case_insensitive() {
    assert!(!cmp(s("Master"), s("master"), OperatorType::Eq).unwrap());
    assert!(
        compare(&s("Master"), &s("master"), OperatorType::Eq, CompareOptions::ignore_case())
            .unwrap()
    );
    assert!(
        compare(&s("Master"), &s("mas%"), OperatorType::Like, CompareOptions::ignore_case())
            .unwrap()
    );
}

#[test]
fn test_char_is_string() {
    assert!(cmp(Value::Char('a'), s("a"), OperatorType::Eq).unwrap());
}

#[test]
fn test_bool_logic() {
    assert!(cmp(Value::Bool(true), Value::Bool(true), OperatorType::And).unwrap());
    assert!(!cmp(Value::Bool(true), Value::Bool(false), OperatorType::And).unwrap());
    assert!(cmp(Value::Bool(true), Value::Bool(false), OperatorType::Or).unwrap());
    assert!(matches!(
        cmp(Value::Bool(true), Value::Bool(false), OperatorType::Gt),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_datetime() {
    let early = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let late = NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert!(cmp(Value::DateTime(early), Value::DateTime(late), OperatorType::Lt).unwrap());
    assert!(matches!(
        cmp(Value::DateTime(early), Value::DateTime(late), OperatorType::Like),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_guid() {
    let a = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
    assert!(cmp(Value::Guid(a), Value::Guid(a), OperatorType::Eq).unwrap());
    assert!(matches!(
        cmp(Value::Guid(a), Value::Guid(a), OperatorType::Lt),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_arrays_compare_sorted() {
    let a = Value::Array(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    let b = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let c = Value::Array(vec![Value::Int(1), Value::Int(2)]);
    assert!(cmp(a.clone(), b, OperatorType::Eq).unwrap());
    assert!(cmp(a.clone(), c, OperatorType::Ne).unwrap());

    let words = Value::Array(vec![s("b"), s("a")]);
    let sorted = Value::Array(vec![s("a"), s("b")]);
    assert!(cmp(words, sorted, OperatorType::Eq).unwrap());
    assert!(matches!(
        cmp(a.clone(), a, OperatorType::Gt),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_type_mismatch() {
    assert!(matches!(
        cmp(Value::Int(1), s("1"), OperatorType::Eq),
        Err(ExprError::TypeMismatch { .. })
    ));
    assert!(matches!(
        cmp(Value::Bool(true), Value::Int(1), OperatorType::Eq),
        Err(ExprError::TypeMismatch { .. })
    ));
}
