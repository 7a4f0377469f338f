//! Tree construction tests
//!
//! Tests the checks applied when nodes are built:
//! - Operator operand shapes and type classes
//! - Membership (IN / NOT IN) operands
//! - Function argument counts and classes
//! - Return class inference for variant functions

use policy_expr_ast::*;
use policy_expr_diagnostics::ExprError;
use policy_expr_types::{DeclaredType, OperatorType, TypeClass, Value};
use rstest::rstest;

fn attr(name: &str) -> ExpressionNode {
    ExpressionNode::attribute(name).unwrap()
}

fn typed(name: &str, class: TypeClass) -> ExpressionNode {
    ExpressionNode::attribute_with_class(name, class).unwrap()
}

fn constant(value: impl Into<Value>) -> ExpressionNode {
    ExpressionNode::constant(value).unwrap()
}

fn call(kind: FunctionKind, args: Vec<ExpressionNode>) -> Result<ExpressionNode, ExprError> {
    ExpressionNode::function(kind, args)
}

fn eq(left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
    ExpressionNode::operator(OperatorType::Eq, left, right).unwrap()
}

// === Operators ===

#[test]
fn test_operator_is_bool() {
    let node = eq(attr("Name"), constant("x"));
    assert_eq!(node.type_class(), TypeClass::Bool);
    assert_eq!(node.kind(), NodeKind::Operator);
}

#[test]
fn test_none_rejected() {
    let err = ExpressionNode::operator(OperatorType::None, attr("A"), constant(1)).unwrap_err();
    assert!(matches!(err, ExprError::InvalidArgument { .. }));
}

#[rstest]
#[case(OperatorType::And)]
#[case(OperatorType::Or)]
fn test_logical_needs_conditions(#[case] op: OperatorType) {
    let cond = || eq(attr("A"), constant(1));
    assert!(ExpressionNode::operator(op, cond(), ExpressionNode::group(cond())).is_ok());
    assert!(matches!(
        ExpressionNode::operator(op, cond(), attr("B")),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
    assert!(matches!(
        ExpressionNode::operator(op, constant(true), cond()),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_comparison_operands() {
    let cond = eq(attr("A"), constant(1));
    assert!(matches!(
        ExpressionNode::operator(OperatorType::Eq, cond, constant(1)),
        Err(ExprError::InvalidOperand { .. })
    ));
    assert!(matches!(
        ExpressionNode::operator(OperatorType::Eq, attr("A"), ExpressionNode::group(constant(1))),
        Err(ExprError::InvalidOperand { .. })
    ));
}

#[rstest]
#[case(typed("Size", TypeClass::Numeric), constant("big"))]
#[case(constant(1), constant("1"))]
#[case(typed("Online", TypeClass::Bool), constant(1))]
fn test_comparison_type_mismatch(#[case] left: ExpressionNode, #[case] right: ExpressionNode) {
    assert!(matches!(
        ExpressionNode::operator(OperatorType::Eq, left, right),
        Err(ExprError::TypeMismatch { .. })
    ));
}

#[rstest]
#[case(OperatorType::Like, typed("Size", TypeClass::Numeric), constant(1))]
#[case(OperatorType::Gt, typed("Name", TypeClass::String), constant("a"))]
#[case(OperatorType::Lt, typed("Id", TypeClass::Guid), attr("Other"))]
#[case(OperatorType::Gt, attr("Online"), call(FunctionKind::True, vec![]).unwrap())]
fn test_operator_not_applicable(
    #[case] op: OperatorType,
    #[case] left: ExpressionNode,
    #[case] right: ExpressionNode,
) {
    assert!(matches!(
        ExpressionNode::operator(op, left, right),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

#[test]
fn test_unknown_classes_are_accepted() {
    assert!(ExpressionNode::operator(OperatorType::Gt, attr("A"), attr("B")).is_ok());
    let isnull = call(FunctionKind::IsNull, vec![attr("A"), attr("B")]).unwrap();
    assert_eq!(isnull.type_class(), TypeClass::Variant);
    assert!(ExpressionNode::operator(OperatorType::Eq, isnull, constant(5)).is_ok());
}

#[test]
fn test_flags_and_numbers_are_compatible() {
    let flags = typed("Permissions", TypeClass::BitmappedEnum);
    let read = call(
        FunctionKind::Enum,
        vec![constant("Demo.Permissions"), constant("Read")],
    )
    .unwrap();
    assert!(ExpressionNode::operator(OperatorType::Eq, flags.clone(), read).is_ok());
    assert!(matches!(
        ExpressionNode::operator(OperatorType::Gt, flags, constant(1)),
        Err(ExprError::OperatorNotApplicable { .. })
    ));
}

// === Membership ===

fn list(items: Vec<ExpressionNode>) -> ExpressionNode {
    call(FunctionKind::Array, items).unwrap()
}

#[test]
fn test_membership_ok() {
    let node = ExpressionNode::operator(
        OperatorType::In,
        attr("Name"),
        list(vec![constant("master"), constant("model")]),
    )
    .unwrap();
    assert_eq!(node.to_string(), "@Name IN Array('master', 'model')");

    let files = typed("Files", TypeClass::Array);
    assert!(ExpressionNode::operator(OperatorType::NotIn, constant("a"), files).is_ok());
}

#[test]
fn test_membership_errors() {
    assert!(matches!(
        ExpressionNode::operator(OperatorType::In, attr("Name"), constant("x")),
        Err(ExprError::InvalidInOperator { .. })
    ));
    assert!(matches!(
        ExpressionNode::operator(OperatorType::In, attr("Name"), attr("Other")),
        Err(ExprError::InvalidInOperator { .. })
    ));
    let upper = call(FunctionKind::Upper, vec![attr("x")]).unwrap();
    assert!(matches!(
        ExpressionNode::operator(OperatorType::In, attr("Name"), upper),
        Err(ExprError::InvalidInOperator { .. })
    ));
    assert!(matches!(
        ExpressionNode::operator(
            OperatorType::In,
            ExpressionNode::group(attr("Name")),
            list(vec![constant("a")])
        ),
        Err(ExprError::InvalidOperand { .. })
    ));
    assert!(matches!(
        ExpressionNode::operator(OperatorType::In, constant(1), list(vec![constant("a")])),
        Err(ExprError::TypeMismatch { .. })
    ));
}

// === Functions ===

#[rstest]
#[case(FunctionKind::GetDate, 1)]
#[case(FunctionKind::Len, 0)]
#[case(FunctionKind::Len, 2)]
#[case(FunctionKind::DateAdd, 2)]
#[case(FunctionKind::True, 1)]
fn test_wrong_argument_count(#[case] kind: FunctionKind, #[case] count: usize) {
    let args = (0..count).map(|_| attr("A")).collect();
    match call(kind, args) {
        Err(ExprError::WrongArgumentsNumber { found, .. }) => assert_eq!(found, count),
        other => panic!("expected WrongArgumentsNumber, got {other:?}"),
    }
}

#[test]
fn test_wrong_argument_type() {
    match call(FunctionKind::Len, vec![constant(5)]) {
        Err(ExprError::WrongArgumentType {
            position, expected, ..
        }) => {
            assert_eq!(position, 1);
            assert_eq!(expected, "String");
        }
        other => panic!("expected WrongArgumentType, got {other:?}"),
    }
    assert!(call(
        FunctionKind::DateAdd,
        vec![constant("day"), constant("1"), attr("When")]
    )
    .is_err());
}

#[test]
fn test_var_args_share_one_class() {
    assert!(call(FunctionKind::Sum, vec![]).is_ok());
    assert!(call(FunctionKind::Sum, vec![constant(1), attr("A"), constant(2.5)]).is_ok());
    assert!(matches!(
        call(FunctionKind::Array, vec![constant(1), constant("a")]),
        Err(ExprError::WrongArgumentType { .. })
    ));
}

#[test]
fn test_variant_return_inferred() {
    let node = call(FunctionKind::IsNull, vec![attr("A"), constant("x")]).unwrap();
    assert_eq!(node.type_class(), TypeClass::String);
    assert!(call(FunctionKind::IsNull, vec![constant(1), constant("x")]).is_err());

    let s = call(FunctionKind::String, vec![constant(1)]).unwrap();
    assert_eq!(s.type_class(), TypeClass::String);
}

#[test]
fn test_script_return_named_by_first_argument() {
    let sql = call(
        FunctionKind::ExecuteSql,
        vec![constant("numeric"), constant("SELECT 1")],
    )
    .unwrap();
    assert_eq!(sql.type_class(), TypeClass::Numeric);
    assert_eq!(sql.as_function().unwrap().return_type(), TypeClass::Numeric);

    assert!(matches!(
        call(FunctionKind::ExecuteSql, vec![attr("T"), constant("SELECT 1")]),
        Err(ExprError::WrongArgumentType { .. })
    ));
    assert!(matches!(
        call(
            FunctionKind::ExecuteSql,
            vec![constant("Widget"), constant("SELECT 1")]
        ),
        Err(ExprError::InvalidArgument { .. })
    ));

    let wql = call(
        FunctionKind::ExecuteWql,
        vec![
            constant("String"),
            constant("root\\CIMV2"),
            constant("SELECT Name FROM Win32_OperatingSystem"),
        ],
    )
    .unwrap();
    assert_eq!(wql.type_class(), TypeClass::String);
}

// === Facets ===

#[test]
fn test_facet_attributes_drive_checks() {
    let facet = Facet::new("Database")
        .with_property("Name", DeclaredType::String)
        .with_property("Size", DeclaredType::Double);
    let size = ExpressionNode::attribute_in_facet("Size", &facet).unwrap();
    assert!(matches!(
        ExpressionNode::operator(OperatorType::Like, size, constant("1%")),
        Err(ExprError::TypeMismatch { .. })
    ));
}
