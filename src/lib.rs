//! minisql - an interpreter for a small SQL dialect
//!
//! This crate provides a three stage pipeline:
//! - tokenizing script text into positioned tokens
//! - parsing tokens into a flat list of statements
//! - executing statements against an in-memory catalog

use std::path::Path;

pub mod error;
pub mod sql;

pub use error::{Error, Result};
pub use sql::engine::{Catalog, ScriptOutput, Session, SessionOptions, memory::MemoryCatalog};
pub use sql::executor::{Outcome, ResultSet};

/// Reads a script file into memory
pub fn load_script(path: impl AsRef<Path>) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
