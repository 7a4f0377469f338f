//! Condition Evaluation Engine
//!
//! This module provides the `ExprEngine` struct which evaluates expression
//! trees against an evaluation context. Every node's result is cached on the
//! node so that callers can inspect partial results afterwards, e.g. to infer
//! a configuration from a failed condition.

use crate::context::EvaluationContext;
use crate::settings::EngineSettings;
use policy_expr_ast::{ExpressionNode, FunctionKind, OperatorNode};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{CompareOptions, EnumRegistry, OperatorType, Value, compare};
use std::sync::Arc;

/// The condition evaluation engine
///
/// The engine is immutable while evaluating; all per-run state lives in the
/// tree being evaluated.
#[derive(Debug, Clone)]
pub struct ExprEngine {
    settings: EngineSettings,
    /// Enum definitions used by the `Enum` function
    enums: Arc<EnumRegistry>,
}

impl Default for ExprEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprEngine {
    /// Create an engine with default settings and no enum definitions
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            settings,
            enums: Arc::new(EnumRegistry::new()),
        }
    }

    /// Share an enum registry with the engine
    pub fn with_enums(mut self, enums: Arc<EnumRegistry>) -> Self {
        self.enums = enums;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn enums(&self) -> &Arc<EnumRegistry> {
        &self.enums
    }

    /// Clear cached results, then evaluate the tree
    pub fn evaluate(&self, node: &mut ExpressionNode, ctx: &dyn EvaluationContext) -> Result<Value> {
        node.reset();
        self.evaluate_preserving(node, ctx)
    }

    /// Evaluate without clearing results cached by an earlier run
    pub fn evaluate_preserving(
        &self,
        node: &mut ExpressionNode,
        ctx: &dyn EvaluationContext,
    ) -> Result<Value> {
        if !self.settings.allow_scripts && node.has_script() {
            let function = first_script_call(node)
                .map_or("script", |kind| kind.name())
                .to_string();
            log::debug!("refusing to evaluate {node}: scripts are disabled");
            return Err(ExprError::ScriptsDisabled { function });
        }
        self.eval_node(node, ctx)
    }

    /// Evaluate a condition and report whether it holds
    pub fn check(&self, node: &mut ExpressionNode, ctx: &dyn EvaluationContext) -> Result<bool> {
        Ok(self.evaluate(node, ctx)?.is_true())
    }

    /// Main node dispatcher; caches the result on the node
    pub(crate) fn eval_node(
        &self,
        node: &mut ExpressionNode,
        ctx: &dyn EvaluationContext,
    ) -> Result<Value> {
        let value = match node {
            ExpressionNode::Constant(c) => c.value().clone(),
            ExpressionNode::Attribute(a) => ctx.get_property(a.name())?.normalize(),
            ExpressionNode::Group(g) => self.eval_node(g.child_mut(), ctx)?,
            ExpressionNode::Operator(op) => self.eval_operator(op, ctx)?,
            ExpressionNode::Function(func) => self.eval_function(func, ctx)?,
        };
        log::trace!("{} node evaluated to {value:?}", node.kind());
        node.set_result(value.clone());
        Ok(value)
    }

    /// Evaluate an operator node.
    ///
    /// A flags enum compared with exactly one constant operand (a literal or
    /// an `Enum()` call) is a bit test, so EQ/NE become BEQ/BNE and the
    /// constant moves to the right. The rewrite sticks to the tree.
    pub fn eval_operator(&self, node: &mut OperatorNode, ctx: &dyn EvaluationContext) -> Result<Value> {
        let mut op = node.op();
        if op == OperatorType::None {
            return Err(ExprError::BadExpressionTree {
                message: "cannot evaluate operator NONE".to_string(),
            });
        }

        let mut left = self.eval_node(node.left_mut(), ctx)?;
        let mut right = self.eval_node(node.right_mut(), ctx)?;

        if left.is_flags_enum() || right.is_flags_enum() {
            let left_constant = is_enum_constant(node.left());
            let right_constant = is_enum_constant(node.right());
            if left_constant != right_constant {
                if let Some(bitwise) = op.bitwise() {
                    log::debug!("rewriting {} as bitwise {}", op.name(), bitwise.name());
                    node.set_op(bitwise);
                    op = bitwise;
                }
                if left_constant {
                    node.swap_operands();
                    std::mem::swap(&mut left, &mut right);
                }
            }
        }

        let result = compare(&left, &right, op, self.compare_options(ctx))?;
        Ok(Value::Bool(result))
    }

    /// String comparison for this run; the settings override the context
    pub(crate) fn compare_options(&self, ctx: &dyn EvaluationContext) -> CompareOptions {
        if self.settings.case_insensitive_strings {
            CompareOptions::ignore_case()
        } else {
            CompareOptions::new(ctx.string_comparison())
        }
    }

    /// Culture for case mapping; the context wins over the settings
    pub(crate) fn culture<'a>(&'a self, ctx: &'a dyn EvaluationContext) -> Option<&'a str> {
        ctx.culture().or(self.settings.culture.as_deref())
    }
}

/// A literal or an `Enum()` call
fn is_enum_constant(node: &ExpressionNode) -> bool {
    match node {
        ExpressionNode::Constant(_) => true,
        ExpressionNode::Function(f) => f.kind() == FunctionKind::Enum,
        _ => false,
    }
}

fn first_script_call(node: &ExpressionNode) -> Option<FunctionKind> {
    if let ExpressionNode::Function(f) = node {
        if f.kind().is_script() {
            return Some(f.kind());
        }
    }
    node.children().into_iter().find_map(first_script_call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyBag;
    use policy_expr_types::{EnumDefinition, StaticEnumProvider, StringComparison};

    fn attr(name: &str) -> ExpressionNode {
        ExpressionNode::attribute(name).unwrap()
    }

    fn constant(value: impl Into<Value>) -> ExpressionNode {
        ExpressionNode::constant(value).unwrap()
    }

    fn op(op: OperatorType, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
        ExpressionNode::operator(op, left, right).unwrap()
    }

    fn flags_engine() -> ExprEngine {
        let provider = StaticEnumProvider::new().with_definition(
            EnumDefinition::new("Demo.Permissions", true)
                .with_member("None", 0)
                .with_member("Read", 1)
                .with_member("Write", 2),
        );
        ExprEngine::new().with_enums(EnumRegistry::shared(provider))
    }

    #[test]
    fn test_results_are_cached() {
        let engine = ExprEngine::new();
        let ctx = PropertyBag::new().with("Name", "master");
        let mut node = op(OperatorType::Eq, attr("Name"), constant("master"));
        assert_eq!(engine.evaluate(&mut node, &ctx).unwrap(), Value::Bool(true));
        assert_eq!(node.last_result(), &Value::Bool(true));
        let left = node.as_operator().unwrap().left();
        assert_eq!(left.last_result(), &Value::string("master"));
    }

    #[test]
    fn test_missing_property_propagates() {
        let engine = ExprEngine::new();
        let mut node = op(OperatorType::Eq, attr("Owner"), constant("sa"));
        assert!(matches!(
            engine.evaluate(&mut node, &PropertyBag::new()),
            Err(ExprError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn test_flags_rewrite_moves_constant_right() {
        let engine = flags_engine();
        let granted = engine.enums().parse("Demo.Permissions", "Read, Write").unwrap();
        let ctx = PropertyBag::new().with("Granted", granted);
        let enum_call = ExpressionNode::function(
            FunctionKind::Enum,
            vec![constant("Demo.Permissions"), constant("Read")],
        )
        .unwrap();
        let mut node = op(OperatorType::Eq, enum_call, attr("Granted"));

        assert!(engine.check(&mut node, &ctx).unwrap());
        let rewritten = node.as_operator().unwrap();
        assert_eq!(rewritten.op(), OperatorType::Beq);
        assert_eq!(rewritten.left().as_attribute().unwrap().name(), "Granted");

        // second run keeps the rewritten shape
        assert!(engine.check(&mut node, &ctx).unwrap());
        assert_eq!(node.as_operator().unwrap().op(), OperatorType::Beq);
    }

    #[test]
    fn test_scripts_disabled() {
        let engine = ExprEngine::with_settings(EngineSettings {
            allow_scripts: false,
            ..EngineSettings::default()
        });
        let sql = ExpressionNode::function(
            FunctionKind::ExecuteSql,
            vec![constant("Numeric"), constant("SELECT 1")],
        )
        .unwrap();
        let mut node = op(OperatorType::Eq, sql, constant(1));
        match engine.evaluate(&mut node, &PropertyBag::new()) {
            Err(ExprError::ScriptsDisabled { function }) => assert_eq!(function, "ExecuteSql"),
            other => panic!("expected ScriptsDisabled, got {other:?}"),
        }
    }

    #[test]
    fn test_case_insensitive_setting_overrides_context() {
        let ctx = PropertyBag::new()
            .with("Name", "MASTER")
            .with_string_comparison(StringComparison::Ordinal);
        let mut node = op(OperatorType::Eq, attr("Name"), constant("master"));

        assert!(!ExprEngine::new().check(&mut node, &ctx).unwrap());
        let engine = ExprEngine::with_settings(EngineSettings {
            case_insensitive_strings: true,
            ..EngineSettings::default()
        });
        assert!(engine.check(&mut node, &ctx).unwrap());
    }

    #[test]
    fn test_operator_none_is_bad_tree() {
        let mut node =
            ExpressionNode::operator_from_parts(OperatorType::None, attr("A"), constant(1));
        assert!(matches!(
            ExprEngine::new().evaluate(&mut node, &PropertyBag::new().with("A", 1)),
            Err(ExprError::BadExpressionTree { .. })
        ));
    }
}
