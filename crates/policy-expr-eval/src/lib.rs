//! Policy Condition Evaluation Engine
//!
//! This crate evaluates expression trees built with `policy-expr-ast`
//! against a caller-supplied property source. It provides:
//!
//! - **Operators**: comparisons, LIKE, membership and logical AND/OR through
//!   the runtime comparator, with the bitmapped enum rewrite for flag tests
//! - **Functions**: the closed built-in library (arithmetic, string,
//!   date/time, aggregate, conversion and script functions)
//! - **Configuration inference**: the property writes that would make a
//!   failed equality-shaped condition pass
//!
//! # Example
//!
//! ```ignore
//! use policy_expr_ast::ExpressionNode;
//! use policy_expr_eval::{ExprEngine, PropertyBag};
//! use policy_expr_types::{OperatorType, Value};
//!
//! let mut condition = ExpressionNode::operator(
//!     OperatorType::Eq,
//!     ExpressionNode::attribute("Name")?,
//!     ExpressionNode::constant("master")?,
//! )?;
//!
//! let engine = ExprEngine::new();
//! let ctx = PropertyBag::new().with("Name", "master");
//! assert_eq!(engine.evaluate(&mut condition, &ctx)?, Value::Bool(true));
//! ```
//!
//! # Architecture
//!
//! - `ExprEngine`: walks the tree, caching each node's result on the node
//! - `EvaluationContext`: property lookup, culture, string comparison and
//!   the script runner used by `ExecuteSql` / `ExecuteWql`
//! - `functions`: one `impl ExprEngine` block per function family
//! - `configuration`: the inverse walk over an evaluated tree

pub mod configuration;
pub mod context;
pub mod engine;
pub mod functions;
pub mod settings;

pub use configuration::{ConfigurationItem, infer_configuration};
pub use context::{EvaluationContext, PropertyBag, ScriptRows, ScriptRunner, value_from_json};
pub use engine::ExprEngine;
pub use functions::DatePart;
pub use settings::EngineSettings;
