//! Attribute usage queries over a tree

use crate::ExpressionNode;
use policy_expr_types::OperatorType;

/// An attribute used directly as an operand, with its operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeOperatorPair {
    pub attribute: String,
    pub op: OperatorType,
}

impl ExpressionNode {
    /// Every attribute name in the tree, depth-first, duplicates kept
    pub fn enum_attributes(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_attributes(self, &mut names);
        names
    }

    /// Attributes that are direct operands of an operator
    pub fn enum_attribute_operator_pairs(&self) -> Vec<AttributeOperatorPair> {
        let mut pairs = Vec::new();
        collect_pairs(self, &mut pairs);
        pairs
    }
}

fn collect_attributes(node: &ExpressionNode, names: &mut Vec<String>) {
    match node {
        ExpressionNode::Attribute(a) => names.push(a.name().to_string()),
        ExpressionNode::Constant(_) => {}
        _ => {
            for child in node.children() {
                collect_attributes(child, names);
            }
        }
    }
}

fn collect_pairs(node: &ExpressionNode, pairs: &mut Vec<AttributeOperatorPair>) {
    let op = node.as_operator().map(|o| o.op());
    for child in node.children() {
        match (child, op) {
            (ExpressionNode::Attribute(a), Some(op)) => pairs.push(AttributeOperatorPair {
                attribute: a.name().to_string(),
                op,
            }),
            (ExpressionNode::Attribute(_) | ExpressionNode::Constant(_), _) => {}
            _ => collect_pairs(child, pairs),
        }
    }
}
