//! Parser and feature evaluator for CSS `@supports` conditions.
//!
//! A condition string is tokenized, parsed into a [`SupportsAst`] and then
//! queried with [`evaluate`] (or through the [`SupportsCondition`] wrapper)
//! to find out whether a single feature would pass it.

pub mod ast;
pub mod config;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod supports;
pub mod token;

pub use ast::SupportsAst;
pub use config::{ConfigError, QueryConfig};
pub use evaluator::{evaluate, Outcomes};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, ParseError, Parser};
pub use supports::{SupportsCondition, SupportsError};
