//! Arithmetic Functions
//!
//! Implements: Add, Subtract, Multiply, Divide, Power, Mod, Round,
//! BitwiseAnd, BitwiseOr
//!
//! Everything except the bitwise functions computes in f64, so division by
//! zero yields an infinity or NaN rather than an error.

use super::arg;
use crate::engine::ExprEngine;
use policy_expr_ast::FunctionKind;
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{Value, to_f64, to_i64};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest digit count `Round` honors
const MAX_ROUND_DIGITS: i64 = 15;

impl ExprEngine {
    /// Evaluate a binary f64 function
    pub fn eval_arithmetic(&self, kind: FunctionKind, args: &[Value]) -> Result<Value> {
        let a = to_f64(arg(args, 0))?;
        let b = to_f64(arg(args, 1))?;
        let result = match kind {
            FunctionKind::Add => a + b,
            FunctionKind::Subtract => a - b,
            FunctionKind::Multiply => a * b,
            FunctionKind::Divide => a / b,
            FunctionKind::Power => a.powf(b),
            FunctionKind::Mod => a % b,
            other => {
                return Err(ExprError::invalid_argument(format!(
                    "{other} is not an arithmetic function"
                )));
            }
        };
        Ok(Value::Double(result))
    }

    /// Evaluate Round(value, digits)
    ///
    /// Rounds half to even; `digits` is clamped to 0..=15.
    pub fn eval_round(&self, args: &[Value]) -> Result<Value> {
        let value = to_f64(arg(args, 0))?;
        let digits = to_f64(arg(args, 1))?.round_ties_even() as i64;
        let digits = digits.clamp(0, MAX_ROUND_DIGITS) as u32;
        Ok(Value::Double(round_half_even(value, digits)))
    }

    /// Evaluate BitwiseAnd / BitwiseOr on i64
    pub fn eval_bitwise(&self, kind: FunctionKind, args: &[Value]) -> Result<Value> {
        let a = to_i64(arg(args, 0))?;
        let b = to_i64(arg(args, 1))?;
        match kind {
            FunctionKind::BitwiseAnd => Ok(Value::Long(a & b)),
            FunctionKind::BitwiseOr => Ok(Value::Long(a | b)),
            other => Err(ExprError::invalid_argument(format!(
                "{other} is not a bitwise function"
            ))),
        }
    }
}

/// Half-even rounding through `Decimal`; values outside its range come
/// back unchanged
fn round_half_even(value: f64, digits: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
