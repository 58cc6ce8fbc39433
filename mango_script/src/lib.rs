//! The Mango shell scripting language.
//!
//! A three-stage pipeline: [`lexer::Lexer`] turns source text into tokens,
//! [`parser::Parser`] builds a statement/expression AST, and
//! [`eval::Interpreter`] walks the tree with lexically scoped environments.
//! Terminal output and shell access go through the [`ScriptHost`] trait, so
//! the crate runs identically under the kernel and under `cargo test`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod ast;
pub mod env;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use alloc::string::String;

use thiserror::Error;

pub use crate::eval::{Interpreter, ScriptHost};
pub use crate::lexer::Lexer;
pub use crate::parser::Parser;
pub use crate::value::Value;

/// A lex, parse, or runtime error. Rendering matches the interpreter's
/// terminal diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error: {message} (line: {line})")]
pub struct ScriptError {
    pub line: u32,
    pub message: String,
}

/// Runs a whole script: lex, parse, evaluate. The first error abandons the
/// rest of the script.
pub fn run_source(source: &str, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
    let tokens = Lexer::tokenize(source)?;
    let program = Parser::new(tokens).parse_program()?;
    Interpreter::new(host).run(&program)
}
