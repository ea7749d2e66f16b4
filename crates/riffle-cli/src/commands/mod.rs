//! CLI command implementations.

pub mod fields;
pub mod search;
