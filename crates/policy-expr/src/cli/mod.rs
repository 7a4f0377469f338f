//! CLI functionality for the pexpr tool
//!
//! This module contains all CLI-related functionality including:
//! - Loading conditions, facets, properties and enum definitions
//! - Evaluation and configuration inference
//! - Document and filter text output
//! - Tree inspection
//! - Output formatting

pub mod configure;
pub mod evaluate;
pub mod input;
pub mod inspect;
pub mod output;
pub mod serialize;
pub mod to_filter;
