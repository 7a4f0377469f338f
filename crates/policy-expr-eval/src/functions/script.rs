//! Script Functions
//!
//! Implements: ExecuteSql, ExecuteWql
//!
//! Both run through the context's physical target and reduce the result set
//! to a single scalar: the first column of the first row. A result with no
//! row is the empty marker, which compares false against anything.

use super::arg;
use crate::context::{EvaluationContext, ScriptRows, ScriptRunner};
use crate::engine::ExprEngine;
use policy_expr_ast::FunctionKind;
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{TypeClass, Value, convert_to_class, to_text};

impl ExprEngine {
    /// Evaluate ExecuteSql(class, script)
    pub fn eval_execute_sql(&self, args: &[Value], ctx: &dyn EvaluationContext) -> Result<Value> {
        let runner = script_target(ctx, FunctionKind::ExecuteSql)?;
        let script = unquote(&to_text(arg(args, 1)));
        log::debug!("running SQL script: {script}");
        let rows = runner.execute_sql(&script).map_err(script_failed)?;
        scalar_result(rows, arg(args, 0))
    }

    /// Evaluate ExecuteWql(class, namespace, query)
    pub fn eval_execute_wql(&self, args: &[Value], ctx: &dyn EvaluationContext) -> Result<Value> {
        let runner = script_target(ctx, FunctionKind::ExecuteWql)?;
        let namespace = to_text(arg(args, 1));
        let query = unquote(&to_text(arg(args, 2)));
        log::debug!("running WQL query in {namespace}: {query}");
        let rows = runner.execute_wql(&namespace, &query).map_err(script_failed)?;
        scalar_result(rows, arg(args, 0))
    }
}

fn script_target(ctx: &dyn EvaluationContext, kind: FunctionKind) -> Result<&dyn ScriptRunner> {
    ctx.physical_target().ok_or_else(|| ExprError::NoScriptTarget {
        function: kind.name().to_string(),
    })
}

/// Quotes arrive doubled from the condition text
fn unquote(script: &str) -> String {
    script.replace("''", "'")
}

fn script_failed(e: ExprError) -> ExprError {
    match e {
        ExprError::ScriptFailed { .. } | ExprError::TooManyColumns { .. } => e,
        other => ExprError::ScriptFailed {
            message: other.to_string(),
        },
    }
}

/// Reduce rows to one value of the class named by `class_arg`
fn scalar_result(rows: ScriptRows, class_arg: &Value) -> Result<Value> {
    let Some(row) = rows.into_iter().next() else {
        return Ok(Value::Empty);
    };
    if row.len() > 1 {
        return Err(ExprError::TooManyColumns { count: row.len() });
    }
    let value = match row.into_iter().next() {
        Some(v) if !v.is_null_or_empty() => v.normalize(),
        _ => return Ok(Value::Empty),
    };
    let class = TypeClass::parse_ignore_case(&to_text(class_arg))?;
    if class == TypeClass::Unsupported {
        return Ok(value);
    }
    convert_to_class(value, class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_result() {
        let rows = vec![vec![Value::Int(3)], vec![Value::Int(4)]];
        assert_eq!(
            scalar_result(rows, &Value::string("numeric")).unwrap(),
            Value::Double(3.0)
        );
        assert_eq!(
            scalar_result(vec![], &Value::string("Numeric")).unwrap(),
            Value::Empty
        );
        assert_eq!(
            scalar_result(vec![vec![Value::Null]], &Value::string("String")).unwrap(),
            Value::Empty
        );
        assert_eq!(
            scalar_result(vec![vec![Value::Int(7)]], &Value::string("Unsupported")).unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn test_too_many_columns() {
        let rows = vec![vec![Value::Int(1), Value::Int(2)]];
        assert!(matches!(
            scalar_result(rows, &Value::string("Numeric")),
            Err(ExprError::TooManyColumns { count: 2 })
        ));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("SELECT ''a''"), "SELECT 'a'");
    }
}
