//! Expression tree nodes
//!
//! A tree is built bottom-up through the checked constructors on
//! [`ExpressionNode`]. After construction the shape is fixed, except for the
//! operand swap and opcode rewrite performed when a bitmapped enum
//! comparison is canonicalized, and the per-node result cache written by
//! evaluation.

use crate::properties::{function_flags, group_flags, operator_flags};
use crate::{BoxNode, Facet, FunctionKind, NameCondition, NodeFlags};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{
    CompareOptions, OperatorType, TypeClass, Value, check_datetime_range, classify,
    classify_declared, compare,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Constant,
    Attribute,
    Operator,
    Group,
    Function,
}

impl NodeKind {
    /// Element name used in documents
    pub const fn name(&self) -> &'static str {
        match self {
            NodeKind::Constant => "Constant",
            NodeKind::Attribute => "Attribute",
            NodeKind::Operator => "Operator",
            NodeKind::Group => "Group",
            NodeKind::Function => "Function",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Constant" => Some(NodeKind::Constant),
            "Attribute" => Some(NodeKind::Attribute),
            "Operator" => Some(NodeKind::Operator),
            "Group" => Some(NodeKind::Group),
            "Function" => Some(NodeKind::Function),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State shared by all node variants
#[derive(Debug, Clone)]
struct NodeState {
    type_class: TypeClass,
    tag: Option<String>,
    /// `Null` until evaluated
    result: Value,
    flags: NodeFlags,
}

impl NodeState {
    fn new(type_class: TypeClass, flags: NodeFlags) -> Self {
        Self {
            type_class,
            tag: None,
            result: Value::Null,
            flags,
        }
    }
}

/// Literal value
#[derive(Debug, Clone)]
pub struct ConstantNode {
    state: NodeState,
    value: Value,
}

impl ConstantNode {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Reference to a property of the target object
#[derive(Debug, Clone)]
pub struct AttributeNode {
    state: NodeState,
    name: String,
}

impl AttributeNode {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Binary operator
#[derive(Debug, Clone)]
pub struct OperatorNode {
    state: NodeState,
    op: OperatorType,
    left: BoxNode,
    right: BoxNode,
}

impl OperatorNode {
    pub fn op(&self) -> OperatorType {
        self.op
    }

    pub fn left(&self) -> &ExpressionNode {
        &self.left
    }

    pub fn right(&self) -> &ExpressionNode {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut ExpressionNode {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut ExpressionNode {
        &mut self.right
    }

    /// Swap left and right operands
    pub fn swap_operands(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
        self.state.flags = operator_flags(self.op, &self.left, &self.right);
    }

    /// Replace the opcode, used to turn EQ/NE into their bitwise forms
    pub fn set_op(&mut self, op: OperatorType) {
        self.op = op;
        self.state.flags = operator_flags(self.op, &self.left, &self.right);
    }
}

/// Parenthesized sub-expression
#[derive(Debug, Clone)]
pub struct GroupNode {
    state: NodeState,
    child: BoxNode,
}

impl GroupNode {
    pub fn child(&self) -> &ExpressionNode {
        &self.child
    }

    pub fn child_mut(&mut self) -> &mut ExpressionNode {
        &mut self.child
    }
}

/// Call into the built-in function library
#[derive(Debug, Clone)]
pub struct FunctionNode {
    state: NodeState,
    kind: FunctionKind,
    return_type: TypeClass,
    args: Vec<ExpressionNode>,
}

impl FunctionNode {
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Declared or inferred return class
    pub fn return_type(&self) -> TypeClass {
        self.return_type
    }

    pub fn args(&self) -> &[ExpressionNode] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut [ExpressionNode] {
        &mut self.args
    }
}

/// A node of a condition expression tree
#[derive(Debug, Clone)]
pub enum ExpressionNode {
    Constant(ConstantNode),
    Attribute(AttributeNode),
    Operator(OperatorNode),
    Group(GroupNode),
    Function(FunctionNode),
}

impl ExpressionNode {
    // === Construction ===

    /// Create a constant.
    ///
    /// Masked strings become plain strings. Arrays and the empty-row marker
    /// cannot be constants.
    pub fn constant(value: impl Into<Value>) -> Result<Self> {
        let value = value.into().normalize();
        if matches!(value, Value::Array(_) | Value::Empty) {
            log::debug!("rejected constant of type {}", value.kind_name());
            return Err(ExprError::unsupported_type(value.kind_name()));
        }
        if let Value::DateTime(dt) = &value {
            check_datetime_range(*dt)?;
        }
        let mut state = NodeState::new(classify(&value), NodeFlags::default());
        state.result = value.clone();
        Ok(ExpressionNode::Constant(ConstantNode { state, value }))
    }

    /// Create an attribute whose class is not known until evaluation
    pub fn attribute(name: impl Into<String>) -> Result<Self> {
        Self::attribute_with_class(name, TypeClass::Unsupported)
    }

    /// Create an attribute checked against a facet's declared properties
    pub fn attribute_in_facet(name: impl Into<String>, facet: &Facet) -> Result<Self> {
        let name = name.into();
        let declared = facet.property(&name).ok_or_else(|| {
            log::debug!("facet {} has no property {}", facet.name, name);
            ExprError::MissingProperty {
                facet: facet.name.clone(),
                property: name.clone(),
            }
        })?;
        let class = classify_declared(declared);
        Self::attribute_with_class(name, class)
    }

    /// Create an attribute with a class recorded elsewhere, e.g. in a
    /// stored document
    pub fn attribute_with_class(name: impl Into<String>, class: TypeClass) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ExprError::invalid_argument("attribute name cannot be empty"));
        }
        Ok(ExpressionNode::Attribute(AttributeNode {
            state: NodeState::new(class, NodeFlags::default()),
            name,
        }))
    }

    /// Create an operator after checking operand shapes and classes
    pub fn operator(op: OperatorType, left: ExpressionNode, right: ExpressionNode) -> Result<Self> {
        validate_operator(op, &left, &right)
            .inspect_err(|e| log::debug!("cannot build {left} {op} {right}: {e}"))?;
        Ok(Self::operator_from_parts(op, left, right))
    }

    /// Assemble an operator without construction checks.
    ///
    /// Used when reading back a tree that was valid when it was written.
    pub fn operator_from_parts(op: OperatorType, left: ExpressionNode, right: ExpressionNode) -> Self {
        let flags = operator_flags(op, &left, &right);
        ExpressionNode::Operator(OperatorNode {
            state: NodeState::new(TypeClass::Bool, flags),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Wrap a node in a group
    pub fn group(child: ExpressionNode) -> Self {
        let state = NodeState::new(child.type_class(), group_flags(&child));
        ExpressionNode::Group(GroupNode {
            state,
            child: Box::new(child),
        })
    }

    /// Create a function call after checking arguments against its signature
    pub fn function(kind: FunctionKind, args: Vec<ExpressionNode>) -> Result<Self> {
        let return_type = validate_function(kind, &args)
            .inspect_err(|e| log::debug!("cannot build call to {kind}: {e}"))?;
        Ok(Self::function_from_parts(kind, return_type, args))
    }

    /// Assemble a function call without construction checks
    pub fn function_from_parts(
        kind: FunctionKind,
        return_type: TypeClass,
        args: Vec<ExpressionNode>,
    ) -> Self {
        let flags = function_flags(kind, &args);
        ExpressionNode::Function(FunctionNode {
            state: NodeState::new(return_type, flags),
            kind,
            return_type,
            args,
        })
    }

    /// Override the node's type class
    pub fn with_type_class(mut self, class: TypeClass) -> Self {
        self.state_mut().type_class = class;
        self
    }

    // === Accessors ===

    fn state(&self) -> &NodeState {
        match self {
            ExpressionNode::Constant(n) => &n.state,
            ExpressionNode::Attribute(n) => &n.state,
            ExpressionNode::Operator(n) => &n.state,
            ExpressionNode::Group(n) => &n.state,
            ExpressionNode::Function(n) => &n.state,
        }
    }

    fn state_mut(&mut self) -> &mut NodeState {
        match self {
            ExpressionNode::Constant(n) => &mut n.state,
            ExpressionNode::Attribute(n) => &mut n.state,
            ExpressionNode::Operator(n) => &mut n.state,
            ExpressionNode::Group(n) => &mut n.state,
            ExpressionNode::Function(n) => &mut n.state,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ExpressionNode::Constant(_) => NodeKind::Constant,
            ExpressionNode::Attribute(_) => NodeKind::Attribute,
            ExpressionNode::Operator(_) => NodeKind::Operator,
            ExpressionNode::Group(_) => NodeKind::Group,
            ExpressionNode::Function(_) => NodeKind::Function,
        }
    }

    pub fn type_class(&self) -> TypeClass {
        self.state().type_class
    }

    pub fn tag(&self) -> Option<&str> {
        self.state().tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.state_mut().tag = tag;
    }

    /// Result cached by the last evaluation; `Null` when unset
    pub fn last_result(&self) -> &Value {
        &self.state().result
    }

    pub fn set_result(&mut self, value: Value) {
        self.state_mut().result = value;
    }

    /// Clear cached results in the whole subtree. Constants keep their value.
    pub fn reset(&mut self) {
        match self {
            ExpressionNode::Constant(_) => {}
            ExpressionNode::Attribute(n) => n.state.result = Value::Null,
            ExpressionNode::Operator(n) => {
                n.state.result = Value::Null;
                n.left.reset();
                n.right.reset();
            }
            ExpressionNode::Group(n) => {
                n.state.result = Value::Null;
                n.child.reset();
            }
            ExpressionNode::Function(n) => {
                n.state.result = Value::Null;
                n.args.iter_mut().for_each(ExpressionNode::reset);
            }
        }
    }

    pub fn flags(&self) -> &NodeFlags {
        &self.state().flags
    }

    pub fn has_script(&self) -> bool {
        self.state().flags.has_script
    }

    pub fn name_condition(&self) -> &NameCondition {
        &self.state().flags.name_condition
    }

    pub fn filter_compatible(&self) -> bool {
        self.state().flags.filter_compatible
    }

    /// Direct children in order
    pub fn children(&self) -> Vec<&ExpressionNode> {
        match self {
            ExpressionNode::Constant(_) | ExpressionNode::Attribute(_) => Vec::new(),
            ExpressionNode::Operator(n) => vec![n.left.as_ref(), n.right.as_ref()],
            ExpressionNode::Group(n) => vec![n.child.as_ref()],
            ExpressionNode::Function(n) => n.args.iter().collect(),
        }
    }

    /// Independent copy including cached results and tags
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }

    /// Constant, attribute and function nodes may be comparison operands
    pub fn is_operand(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Constant | NodeKind::Attribute | NodeKind::Function
        )
    }

    pub fn as_constant(&self) -> Option<&ConstantNode> {
        match self {
            ExpressionNode::Constant(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&AttributeNode> {
        match self {
            ExpressionNode::Attribute(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            ExpressionNode::Operator(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionNode> {
        match self {
            ExpressionNode::Function(n) => Some(n),
            _ => None,
        }
    }
}

fn validate_operator(op: OperatorType, left: &ExpressionNode, right: &ExpressionNode) -> Result<()> {
    match op {
        OperatorType::None => Err(ExprError::invalid_argument(
            "operator NONE cannot appear in an expression",
        )),
        OperatorType::And | OperatorType::Or => {
            for side in [left, right] {
                if !matches!(side.kind(), NodeKind::Operator | NodeKind::Group) {
                    return Err(ExprError::operator_not_applicable(
                        op.name(),
                        side.kind().name(),
                    ));
                }
            }
            Ok(())
        }
        OperatorType::In | OperatorType::NotIn => validate_membership(op, left, right),
        _ => validate_comparison(op, left, right),
    }
}

fn validate_membership(
    op: OperatorType,
    left: &ExpressionNode,
    right: &ExpressionNode,
) -> Result<()> {
    let right_is_list = match right {
        ExpressionNode::Attribute(_) => right.type_class() == TypeClass::Array,
        ExpressionNode::Function(_) => true,
        _ => false,
    };
    if !right_is_list {
        return Err(ExprError::invalid_in(format!(
            "right operand of {} must be an array",
            op.symbol()
        )));
    }
    if !left.is_operand() {
        return Err(ExprError::invalid_operand(
            op.name(),
            format!("left {}", left.kind()),
        ));
    }

    if let ExpressionNode::Function(f) = right {
        if f.kind != FunctionKind::Array {
            return Err(ExprError::invalid_in(format!(
                "right operand of {} must be an Array() call, found {}()",
                op.symbol(),
                f.kind
            )));
        }
        // only the first element is checked
        if let Some(first) = f.args.first() {
            let (l, r) = (left.type_class(), first.type_class());
            if l.is_known() && r.is_known() && !l.is_compatible_with(r) {
                return Err(ExprError::type_mismatch(l.name(), r.name()));
            }
        }
    }
    Ok(())
}

fn validate_comparison(
    op: OperatorType,
    left: &ExpressionNode,
    right: &ExpressionNode,
) -> Result<()> {
    for (side, which) in [(left, "left"), (right, "right")] {
        if !side.is_operand() {
            return Err(ExprError::invalid_operand(
                op.name(),
                format!("{which} {}", side.kind()),
            ));
        }
    }

    let (l, r) = (left.type_class(), right.type_class());
    if l.is_known() {
        if r.is_known() && !l.is_compatible_with(r) {
            return Err(ExprError::type_mismatch(l.name(), r.name()));
        }
        if !l.supports(op) {
            return Err(ExprError::operator_not_applicable(op.name(), l.name()));
        }
    } else if r.is_known() && !r.supports(op) {
        return Err(ExprError::operator_not_applicable(op.name(), r.name()));
    }
    Ok(())
}

fn wrong_type(kind: FunctionKind, position: usize, expected: TypeClass, found: TypeClass) -> ExprError {
    ExprError::WrongArgumentType {
        function: kind.name().to_string(),
        position,
        expected: expected.name().to_string(),
        found: found.name().to_string(),
    }
}

/// Check arguments against the signature and work out the return class
fn validate_function(kind: FunctionKind, args: &[ExpressionNode]) -> Result<TypeClass> {
    let sig = kind.signature();
    let mut return_type = sig.return_type;

    match sig.arity() {
        Some(arity) if arity != args.len() => {
            return Err(ExprError::WrongArgumentsNumber {
                function: kind.name().to_string(),
                expected: arity,
                found: args.len(),
            });
        }
        _ => {}
    }

    if let Some(first) = args.first().filter(|_| sig.returns_named_class()) {
        let class_name = first
            .as_constant()
            .and_then(|c| c.value().as_str())
            .ok_or_else(|| wrong_type(kind, 1, TypeClass::String, first.type_class()))?;
        return_type = TypeClass::parse_ignore_case(class_name)?;
    }

    let mut shared: Option<TypeClass> = None;
    for (i, arg) in args.iter().enumerate() {
        let class = arg.type_class();
        if !class.is_known() {
            continue;
        }
        let slot = if sig.is_var_args() {
            TypeClass::VarArgs
        } else {
            sig.params[i]
        };

        if matches!(slot, TypeClass::VarArgs | TypeClass::Variant) {
            match shared {
                None => {
                    shared = Some(class);
                    if return_type == TypeClass::Variant {
                        return_type = class;
                    }
                }
                Some(expected) if !expected.is_compatible_with(class) => {
                    return Err(wrong_type(kind, i + 1, expected, class));
                }
                Some(_) => {}
            }
        } else if !slot.is_compatible_with(class) {
            return Err(wrong_type(kind, i + 1, slot, class));
        }
    }
    Ok(return_type)
}

/// Constants compare through the runtime comparator. A type mismatch means
/// "not equal" rather than an error.
fn constants_equal(left: &Value, right: &Value) -> bool {
    match compare(left, right, OperatorType::Eq, CompareOptions::default()) {
        Ok(equal) => equal,
        Err(e) if e.is_type_mismatch() => false,
        Err(e) => {
            log::warn!("constant comparison failed: {e}");
            false
        }
    }
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExpressionNode::Constant(a), ExpressionNode::Constant(b)) => {
                constants_equal(&a.value, &b.value)
            }
            (ExpressionNode::Attribute(a), ExpressionNode::Attribute(b)) => {
                a.name == b.name && a.state.type_class == b.state.type_class
            }
            (ExpressionNode::Operator(a), ExpressionNode::Operator(b)) => {
                a.op == b.op && a.left == b.left && a.right == b.right
            }
            (ExpressionNode::Group(a), ExpressionNode::Group(b)) => a.child == b.child,
            (ExpressionNode::Function(a), ExpressionNode::Function(b)) => {
                a.kind == b.kind && a.state.type_class == b.state.type_class && a.args == b.args
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_expr_types::{DeclaredType, SecureString};

    fn attr(name: &str) -> ExpressionNode {
        ExpressionNode::attribute(name).unwrap()
    }

    fn constant(value: impl Into<Value>) -> ExpressionNode {
        ExpressionNode::constant(value).unwrap()
    }

    #[test]
    fn test_constant_classes() {
        assert_eq!(constant(5).type_class(), TypeClass::Numeric);
        assert_eq!(constant("x").type_class(), TypeClass::String);
        assert_eq!(constant(Value::Null).type_class(), TypeClass::Unsupported);
        assert_eq!(constant(5).last_result(), &Value::Int(5));
    }

    #[test]
    fn test_constant_rejects_arrays() {
        let err = ExpressionNode::constant(Value::Array(vec![])).unwrap_err();
        assert!(matches!(err, ExprError::UnsupportedType { .. }));
        assert!(ExpressionNode::constant(Value::Empty).is_err());
    }

    #[test]
    fn test_constant_datetime_range() {
        let year = |y| {
            chrono::NaiveDate::from_ymd_opt(y, 6, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap()
        };
        assert!(ExpressionNode::constant(year(1)).is_ok());
        assert!(ExpressionNode::constant(year(9999)).is_ok());
        for y in [0, -44, 10_000] {
            assert!(matches!(
                ExpressionNode::constant(year(y)),
                Err(ExprError::TypeConversion { .. })
            ));
        }
    }

    #[test]
    fn test_constant_normalizes_secure_string() {
        let node = constant(Value::Secure(SecureString::new("p@ss")));
        assert_eq!(node.as_constant().unwrap().value(), &Value::string("p@ss"));
    }

    #[test]
    fn test_attribute() {
        assert!(ExpressionNode::attribute("").is_err());
        assert_eq!(attr("Name").type_class(), TypeClass::Unsupported);

        let facet = Facet::new("Database").with_property("Size", DeclaredType::Double);
        let size = ExpressionNode::attribute_in_facet("Size", &facet).unwrap();
        assert_eq!(size.type_class(), TypeClass::Numeric);
        assert!(matches!(
            ExpressionNode::attribute_in_facet("Owner", &facet),
            Err(ExprError::MissingProperty { .. })
        ));
    }

    #[test]
    fn test_reset_keeps_constant_value() {
        let mut node = ExpressionNode::operator(OperatorType::Eq, attr("A"), constant(1)).unwrap();
        node.set_result(Value::Bool(true));
        node.reset();
        assert_eq!(node.last_result(), &Value::Null);
        let op = node.as_operator().unwrap();
        assert_eq!(op.right().last_result(), &Value::Int(1));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let mut node = ExpressionNode::operator(OperatorType::Eq, attr("A"), constant(1)).unwrap();
        node.set_tag(Some("t1".to_string()));
        node.set_result(Value::Bool(false));
        let mut copy = node.deep_clone();
        assert_eq!(copy.tag(), Some("t1"));
        assert_eq!(copy.last_result(), &Value::Bool(false));

        copy.set_result(Value::Bool(true));
        copy.set_tag(None);
        assert_eq!(node.last_result(), &Value::Bool(false));
        assert_eq!(node.tag(), Some("t1"));
    }

    #[test]
    fn test_swap_operands() {
        let mut node = ExpressionNode::operator(OperatorType::Eq, constant("x"), attr("Name")).unwrap();
        assert!(node.name_condition().is_none());
        if let ExpressionNode::Operator(op) = &mut node {
            op.swap_operands();
            assert_eq!(op.left().kind(), NodeKind::Attribute);
        }
        assert_eq!(node.name_condition().object_name.as_deref(), Some("x"));
    }

    #[test]
    fn test_constant_equality() {
        assert_eq!(constant(5), constant(5.0));
        assert_ne!(constant(5), constant(6));
        // mismatched classes are simply unequal
        assert_ne!(constant(5), constant("5"));
        assert_eq!(constant(Value::Null), constant(Value::Null));
        assert_ne!(constant(Value::Null), constant(0));
    }

    #[test]
    fn test_attribute_equality_includes_class() {
        let typed = ExpressionNode::attribute_with_class("A", TypeClass::Numeric).unwrap();
        assert_ne!(attr("A"), typed);
        assert_eq!(attr("A"), attr("A"));
    }
}
