//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser
//! - `types`: column types and cell values
//! - `schema`: Table and column schema definitions
//! - `executor`: Statement execution
//! - `engine`: Catalog abstraction and sessions

pub mod engine;
pub mod executor;
pub mod parser;
pub mod schema;
pub mod types;
