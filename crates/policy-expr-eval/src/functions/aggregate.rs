//! Aggregate Functions
//!
//! Implements: Sum, Avg, Count, Array, IsNull

use super::arg;
use crate::engine::ExprEngine;
use policy_expr_diagnostics::Result;
use policy_expr_types::{Value, to_f64};

impl ExprEngine {
    /// Evaluate Sum; null arguments count as zero
    pub fn eval_sum(&self, args: &[Value]) -> Result<Value> {
        let total = args.iter().map(to_f64).sum::<Result<f64>>()?;
        Ok(Value::Double(total))
    }

    /// Evaluate Avg; no arguments gives NaN
    pub fn eval_avg(&self, args: &[Value]) -> Result<Value> {
        let total = args.iter().map(to_f64).sum::<Result<f64>>()?;
        Ok(Value::Double(total / args.len() as f64))
    }

    /// Evaluate Count: the number of arguments, nulls included
    pub fn eval_count(&self, args: &[Value]) -> Value {
        Value::Double(args.len() as f64)
    }

    /// Evaluate Array: pack the arguments
    pub fn eval_array(&self, args: Vec<Value>) -> Value {
        Value::Array(args)
    }

    /// Evaluate IsNull(value, fallback)
    pub fn eval_is_null(&self, mut args: Vec<Value>) -> Value {
        if arg(&args, 0).is_null_or_empty() {
            args.into_iter().nth(1).unwrap_or(Value::Null)
        } else {
            args.swap_remove(0)
        }
    }
}
