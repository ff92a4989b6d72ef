//! Quickmatch: structural pattern matching for a JavaScript-like language
//!
//! Quickmatch parses `match (expr) { pattern if guard: body, ... }`
//! expressions embedded in host source, compiles each one into a flat
//! dispatch of tests and bindings, and evaluates the result with a small
//! reference interpreter.
//!
//! # Quick Start
//!
//! ```no_run
//! use quickmatch::{Runtime, Value};
//!
//! fn main() -> quickmatch::Result<()> {
//!     let mut runtime = Runtime::new();
//!     let result = runtime.eval("match ([1, 2]) { [a, b]: a + b, else: 0 }")?;
//!     assert_eq!(result, Value::Number(3.0));
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! The pipeline flows: Source → [`lexer`] → [`parser`] → [`ast`] →
//! [`compiler`] → [`ir`] → [`runtime`] → Result
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Front end** | [`lexer`], [`parser`], [`ast`] |
//! | **Lowering** | [`compiler`], [`ir`] |
//! | **Execution** | [`runtime`], [`error`](Error) |
//! | **Tooling** | [`repl`] |
#![allow(clippy::new_without_default)]
#![allow(clippy::enum_variant_names)]

pub mod ast;
pub mod compiler;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;

mod error;

pub use compiler::{lower_program, LowerOptions};
pub use error::{messages, Error, ErrorKind, Result, SourceLocation};
pub use runtime::{Runtime, RuntimeConfig, Value};

/// Quickmatch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
