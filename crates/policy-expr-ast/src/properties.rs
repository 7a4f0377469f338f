//! Derived node flags
//!
//! Every node carries three flags derived from its shape: whether evaluating
//! it runs a script against the target, whether it is a condition on the
//! object name, and whether it can be expressed in the filter grammar.

use crate::{ExpressionNode, FunctionKind, NodeKind};
use policy_expr_types::{OperatorType, Value};
use serde::{Deserialize, Serialize};

/// Operators the filter grammar can express
pub const FILTER_OPERATORS: [OperatorType; 10] = [
    OperatorType::And,
    OperatorType::Or,
    OperatorType::Eq,
    OperatorType::Ne,
    OperatorType::Gt,
    OperatorType::Ge,
    OperatorType::Lt,
    OperatorType::Le,
    OperatorType::Like,
    OperatorType::NotLike,
];

/// Property used for object name conditions
pub const NAME_PROPERTY: &str = "Name";

/// Shape of a condition on the object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameConditionType {
    #[default]
    None,
    Equal,
    Like,
    NotEqual,
    NotLike,
}

/// `@Name <op> 'literal'` captured from an operator node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameCondition {
    pub kind: NameConditionType,
    pub object_name: Option<String>,
}

impl NameCondition {
    pub fn is_none(&self) -> bool {
        self.kind == NameConditionType::None
    }
}

/// Flags derived by `set_properties`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeFlags {
    pub has_script: bool,
    pub name_condition: NameCondition,
    pub filter_compatible: bool,
}

fn is_composite(node: &ExpressionNode) -> bool {
    matches!(
        node.kind(),
        NodeKind::Group | NodeKind::Operator | NodeKind::Function
    )
}

pub(super) fn operator_flags(
    op: OperatorType,
    left: &ExpressionNode,
    right: &ExpressionNode,
) -> NodeFlags {
    let mut filter_compatible = FILTER_OPERATORS.contains(&op);
    if filter_compatible && is_composite(left) {
        filter_compatible = left.filter_compatible();
    }
    if filter_compatible && is_composite(right) {
        filter_compatible = right.filter_compatible();
    }

    let kind = match op {
        OperatorType::Eq => NameConditionType::Equal,
        OperatorType::Like => NameConditionType::Like,
        OperatorType::Ne => NameConditionType::NotEqual,
        OperatorType::NotLike => NameConditionType::NotLike,
        _ => NameConditionType::None,
    };
    let name_condition = match (left, right) {
        (ExpressionNode::Attribute(attr), ExpressionNode::Constant(constant))
            if kind != NameConditionType::None && attr.name() == NAME_PROPERTY =>
        {
            match constant.value() {
                Value::String(name) => NameCondition {
                    kind,
                    object_name: Some(name.clone()),
                },
                _ => NameCondition::default(),
            }
        }
        _ => NameCondition::default(),
    };

    NodeFlags {
        has_script: left.has_script() || right.has_script(),
        name_condition,
        filter_compatible,
    }
}

pub(super) fn function_flags(kind: FunctionKind, args: &[ExpressionNode]) -> NodeFlags {
    // string() is only expressible over a plain operand
    let string_over_operand = kind == FunctionKind::String
        && args
            .first()
            .is_some_and(|a| matches!(a.kind(), NodeKind::Constant | NodeKind::Attribute));

    NodeFlags {
        has_script: kind.is_script() || args.iter().any(ExpressionNode::has_script),
        name_condition: NameCondition::default(),
        filter_compatible: matches!(
            kind,
            FunctionKind::True | FunctionKind::False | FunctionKind::Enum
        ) || string_over_operand,
    }
}

pub(super) fn group_flags(child: &ExpressionNode) -> NodeFlags {
    child.flags().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_eq(op: OperatorType, text: &str) -> ExpressionNode {
        ExpressionNode::operator(
            op,
            ExpressionNode::attribute("Name").unwrap(),
            ExpressionNode::constant(Value::string(text)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_name_condition() {
        let node = name_eq(OperatorType::Like, "Adventure%");
        assert_eq!(node.name_condition().kind, NameConditionType::Like);
        assert_eq!(
            node.name_condition().object_name.as_deref(),
            Some("Adventure%")
        );

        let grouped = ExpressionNode::group(name_eq(OperatorType::Ne, "master"));
        assert_eq!(grouped.name_condition().kind, NameConditionType::NotEqual);

        let other = ExpressionNode::operator(
            OperatorType::Eq,
            ExpressionNode::attribute("Owner").unwrap(),
            ExpressionNode::constant(Value::string("sa")).unwrap(),
        )
        .unwrap();
        assert!(other.name_condition().is_none());
    }

    #[test]
    fn test_logical_operator_has_no_name_condition() {
        let node = ExpressionNode::operator(
            OperatorType::And,
            name_eq(OperatorType::Eq, "a"),
            name_eq(OperatorType::Eq, "b"),
        )
        .unwrap();
        assert!(node.name_condition().is_none());
        assert!(node.filter_compatible());
    }

    #[test]
    fn test_script_propagates() {
        let sql = ExpressionNode::function(
            FunctionKind::ExecuteSql,
            vec![
                ExpressionNode::constant(Value::string("Numeric")).unwrap(),
                ExpressionNode::constant(Value::string("SELECT 1")).unwrap(),
            ],
        )
        .unwrap();
        assert!(sql.has_script());
        assert!(!sql.filter_compatible());

        let node = ExpressionNode::operator(
            OperatorType::Eq,
            sql,
            ExpressionNode::constant(Value::Int(1)).unwrap(),
        )
        .unwrap();
        assert!(node.has_script());
        assert!(!node.filter_compatible());
    }

    #[test]
    fn test_filter_compatible_functions() {
        let t = ExpressionNode::function(FunctionKind::True, vec![]).unwrap();
        assert!(t.filter_compatible());

        let s = ExpressionNode::function(
            FunctionKind::String,
            vec![ExpressionNode::attribute("Name").unwrap()],
        )
        .unwrap();
        assert!(s.filter_compatible());

        let upper = ExpressionNode::function(
            FunctionKind::String,
            vec![
                ExpressionNode::function(
                    FunctionKind::Upper,
                    vec![ExpressionNode::attribute("Name").unwrap()],
                )
                .unwrap(),
            ],
        )
        .unwrap();
        assert!(!upper.filter_compatible());
    }

    #[test]
    fn test_membership_not_filter_compatible() {
        let node = ExpressionNode::operator(
            OperatorType::In,
            ExpressionNode::attribute("Id").unwrap(),
            ExpressionNode::function(
                FunctionKind::Array,
                vec![ExpressionNode::constant(Value::Int(1)).unwrap()],
            )
            .unwrap(),
        )
        .unwrap();
        assert!(!node.filter_compatible());
    }
}
