//! Configuration inference
//!
//! Given a condition that evaluated to false, work out which properties
//! would have to be written, and with which values, for it to hold. Only
//! conjunctions of `@Property = value` comparisons can be inverted.

use policy_expr_ast::{ExpressionNode, OperatorNode};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{OperatorType, Value};
use serde::Serialize;

/// One property write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationItem {
    pub property: String,
    #[serde(serialize_with = "serialize_value")]
    pub value: Value,
}

impl ConfigurationItem {
    pub fn new(property: impl Into<String>, value: Value) -> Self {
        Self {
            property: property.into(),
            value,
        }
    }
}

fn serialize_value<S: serde::Serializer>(value: &Value, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

/// Property writes that would satisfy an evaluated condition.
///
/// Subtrees that were never evaluated or already hold contribute nothing.
/// OR, comparisons other than EQ on an attribute, and comparisons whose
/// left side is not an attribute cannot be inverted.
pub fn infer_configuration(node: &ExpressionNode) -> Result<Vec<ConfigurationItem>> {
    let mut items = Vec::new();
    collect(node, &mut items)?;
    log::debug!("inferred {} configuration item(s) from {node}", items.len());
    Ok(items)
}

fn collect(node: &ExpressionNode, items: &mut Vec<ConfigurationItem>) -> Result<()> {
    match node {
        ExpressionNode::Operator(op) => collect_operator(node, op, items),
        ExpressionNode::Group(g) => collect(g.child(), items),
        _ => Ok(()),
    }
}

fn collect_operator(
    node: &ExpressionNode,
    op: &OperatorNode,
    items: &mut Vec<ConfigurationItem>,
) -> Result<()> {
    match node.last_result() {
        Value::Null | Value::Bool(true) => return Ok(()),
        _ => {}
    }
    if op.op() == OperatorType::Or {
        return Err(ExprError::not_configurable(node.to_string()));
    }

    match op.left() {
        ExpressionNode::Attribute(attr) => {
            if op.op() != OperatorType::Eq {
                return Err(ExprError::NotConfigurableOperator {
                    property: attr.name().to_string(),
                    expression: node.to_string(),
                });
            }
            items.push(ConfigurationItem::new(
                attr.name(),
                op.right().last_result().clone(),
            ));
            Ok(())
        }
        ExpressionNode::Operator(_) | ExpressionNode::Group(_) => {
            collect(op.left(), items)?;
            collect(op.right(), items)
        }
        _ => Err(ExprError::not_configurable(node.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExprEngine, PropertyBag};

    fn attr(name: &str) -> ExpressionNode {
        ExpressionNode::attribute(name).unwrap()
    }

    fn constant(value: impl Into<Value>) -> ExpressionNode {
        ExpressionNode::constant(value).unwrap()
    }

    #[test]
    fn test_unevaluated_tree_needs_nothing() {
        let node = ExpressionNode::operator(OperatorType::Eq, attr("Name"), constant("x")).unwrap();
        assert!(infer_configuration(&node).unwrap().is_empty());
    }

    #[test]
    fn test_or_is_not_configurable() {
        let eq = |v: &str| ExpressionNode::operator(OperatorType::Eq, attr("Name"), constant(v)).unwrap();
        let mut node = ExpressionNode::operator(OperatorType::Or, eq("a"), eq("b")).unwrap();
        ExprEngine::new()
            .evaluate(&mut node, &PropertyBag::new().with("Name", "c"))
            .unwrap();
        assert!(matches!(
            infer_configuration(&node),
            Err(ExprError::NotConfigurable { .. })
        ));
    }

    #[test]
    fn test_item_serializes_value_text() {
        let item = ConfigurationItem::new("Online", Value::Bool(true));
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"property":"Online","value":"True"}"#);
    }
}
