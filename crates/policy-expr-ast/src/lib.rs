//! Policy expression tree
//!
//! This crate defines the expression tree evaluated by the engine: constants,
//! attribute references, operators, groups and calls into the closed function
//! library. Construction validates operand shapes and type classes so that
//! a tree that exists is a tree the evaluator can run.

mod analysis;
mod construct;
mod display;
mod facet;
mod function;
mod node;
mod properties;

pub use analysis::*;
pub use construct::*;
pub use facet::*;
pub use function::*;
pub use node::*;
pub use properties::*;

/// Type alias for boxed child nodes
pub type BoxNode = Box<ExpressionNode>;
