//! Policy condition expressions for Rust
//!
//! This crate ties together the expression tree workspace:
//! - Building condition trees, directly or from filter text
//! - Evaluating them against a property source
//! - Reading and writing their XML document form
//! - Converting them to and from the boolean filter grammar
//! - Inferring the property writes that would make a failed condition hold
//!
//! # Example
//!
//! ```ignore
//! use policy_expr::{ExprEngine, PropertyBag, parse_condition, infer_configuration};
//!
//! let mut condition = parse_condition("@Online = true() and @Size > 100", None)?;
//! let props = PropertyBag::new().with("Online", false).with("Size", 200);
//!
//! let engine = ExprEngine::new();
//! assert!(!engine.check(&mut condition, &props)?);
//! let fixes = infer_configuration(&condition)?;
//! ```

// Re-export all public APIs from internal crates
pub use policy_expr_ast as ast;
pub use policy_expr_diagnostics as diagnostics;
pub use policy_expr_eval as eval;
pub use policy_expr_filter as filter;
pub use policy_expr_types as types;
pub use policy_expr_xml as xml;

// Convenience re-exports
pub use policy_expr_ast::{ExpressionNode, Facet, FunctionKind, NodeKind};
pub use policy_expr_diagnostics::{ExprError, Result};
pub use policy_expr_eval::{
    ConfigurationItem, EngineSettings, EvaluationContext, ExprEngine, PropertyBag,
    infer_configuration,
};
pub use policy_expr_filter::{parse_condition, to_filter, to_filter_string};
pub use policy_expr_types::{EnumRegistry, OperatorType, TypeClass, Value};
pub use policy_expr_xml::{deserialize, deserialize_with_results, serialize, serialize_with_results};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
