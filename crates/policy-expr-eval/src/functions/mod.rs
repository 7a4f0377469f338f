//! Built-in Function Implementations
//!
//! This module contains the function library organized by family:
//! - Arithmetic functions (Add, Subtract, Round, BitwiseAnd, etc.)
//! - String functions (Len, Upper, Lower, Concatenate, Escape, String)
//! - Date/time functions (GetDate, DateAdd, DatePart, DateTime)
//! - Aggregate functions (Sum, Avg, Count, Array, IsNull)
//! - Conversion functions (Enum, Guid, True, False)
//! - Script functions (ExecuteSql, ExecuteWql)
//!
//! Arguments are evaluated first and checked against the signature, then the
//! family method computes the result from the argument values.

pub mod aggregate;
pub mod arithmetic;
pub mod conversion;
pub mod datetime;
pub mod script;
pub mod string;

pub use datetime::DatePart;

use crate::context::EvaluationContext;
use crate::engine::ExprEngine;
use policy_expr_ast::{FunctionKind, FunctionNode};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{TypeClass, Value, classify};

impl ExprEngine {
    /// Evaluate a function call
    pub fn eval_function(&self, node: &mut FunctionNode, ctx: &dyn EvaluationContext) -> Result<Value> {
        let kind = node.kind();
        let args = self.eval_arguments(node, ctx)?;
        log::trace!("calling {kind} with {args:?}");

        match kind {
            // === Scripts ===
            FunctionKind::ExecuteSql => self.eval_execute_sql(&args, ctx),
            FunctionKind::ExecuteWql => self.eval_execute_wql(&args, ctx),

            // === Date/Time ===
            FunctionKind::GetDate => Ok(self.eval_get_date()),
            FunctionKind::DateAdd => self.eval_date_add(&args),
            FunctionKind::DatePart => self.eval_date_part(&args),
            FunctionKind::DateTime => self.eval_datetime(&args),

            // === Aggregates ===
            FunctionKind::Sum => self.eval_sum(&args),
            FunctionKind::Avg => self.eval_avg(&args),
            FunctionKind::Count => Ok(self.eval_count(&args)),
            FunctionKind::Array => Ok(self.eval_array(args)),
            FunctionKind::IsNull => Ok(self.eval_is_null(args)),

            // === Arithmetic ===
            FunctionKind::Add
            | FunctionKind::Subtract
            | FunctionKind::Multiply
            | FunctionKind::Divide
            | FunctionKind::Power
            | FunctionKind::Mod => self.eval_arithmetic(kind, &args),
            FunctionKind::Round => self.eval_round(&args),
            FunctionKind::BitwiseAnd | FunctionKind::BitwiseOr => self.eval_bitwise(kind, &args),

            // === Conversion ===
            FunctionKind::Enum => self.eval_enum(&args),
            FunctionKind::Guid => self.eval_guid(&args),
            FunctionKind::True => Ok(Value::Bool(true)),
            FunctionKind::False => Ok(Value::Bool(false)),

            // === Strings ===
            FunctionKind::Len => self.eval_len(&args),
            FunctionKind::String => Ok(self.eval_string(&args)),
            FunctionKind::Upper => Ok(self.eval_upper(&args, ctx)),
            FunctionKind::Lower => Ok(self.eval_lower(&args, ctx)),
            FunctionKind::Concatenate => Ok(self.eval_concatenate(&args)),
            FunctionKind::Escape => self.eval_escape(&args),
        }
    }

    /// Evaluate the arguments and check their runtime classes.
    ///
    /// Null arguments are not checked. A fixed slot must match the value's
    /// class unless the slot is Variant; var-args values must all share the
    /// class of the first classifiable one.
    fn eval_arguments(&self, node: &mut FunctionNode, ctx: &dyn EvaluationContext) -> Result<Vec<Value>> {
        let kind = node.kind();
        let signature = kind.signature();

        if let Some(arity) = signature.arity() {
            if arity != node.args().len() {
                return Err(ExprError::WrongArgumentsNumber {
                    function: kind.name().to_string(),
                    expected: arity,
                    found: node.args().len(),
                });
            }
        }

        let mut values = Vec::with_capacity(node.args().len());
        let mut shared = TypeClass::Unsupported;
        for (i, arg) in node.args_mut().iter_mut().enumerate() {
            let value = self.eval_node(arg, ctx)?;
            if !value.is_null() {
                let class = classify(&value);
                let expected = if signature.is_var_args() {
                    if shared == TypeClass::Unsupported {
                        shared = class;
                    }
                    shared
                } else {
                    signature.params[i]
                };
                let checked = !matches!(expected, TypeClass::Variant | TypeClass::Unsupported);
                if checked && !expected.is_compatible_with(class) {
                    return Err(ExprError::WrongArgumentType {
                        function: kind.name().to_string(),
                        position: i + 1,
                        expected: expected.name().to_string(),
                        found: class.name().to_string(),
                    });
                }
            }
            values.push(value);
        }
        Ok(values)
    }
}

/// Argument at `index`; callers have checked the count
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Null)
}
