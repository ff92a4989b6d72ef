//! Runtime environment for Quickmatch
//!
//! This module provides the execution environment: value types, the
//! tree-walking interpreter, and built-in globals. [`Runtime::eval`] parses
//! host source, lowers every match expression, and evaluates the result.

mod builtins;
mod interp;
mod value;

pub use interp::{error_to_value, Completion, Env, Interpreter, Scope};
pub use value::{number_to_string, Closure, NativeFn, Object, ObjectKind, PropertyMap, Value};

use crate::ast::Program;
use crate::compiler::{lower_program_with, LowerOptions};
use crate::error::Result;
use std::path::Path;

/// Default limit on nested calls before a RangeError is raised
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Nested call limit
    pub max_call_depth: usize,
    /// Options used when lowering evaluated source
    pub lower: LowerOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            lower: LowerOptions::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_lower_options(mut self, options: LowerOptions) -> Self {
        self.lower = options;
        self
    }
}

/// The Quickmatch runtime
pub struct Runtime {
    interpreter: Interpreter,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a new runtime
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with explicit configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            interpreter: Interpreter::new(config.max_call_depth),
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Parse and lower `source` without running it
    pub fn lower(&self, source: &str) -> Result<Program> {
        let program = crate::parser::parse(source)?;
        lower_program_with(program, &self.config.lower)
    }

    /// Evaluate host source code. Globals persist across calls.
    pub fn eval(&mut self, source: &str) -> Result<Value> {
        let program = self.lower(source)?;
        self.interpreter.run_program(&program)
    }

    /// Evaluate the host source file at `path`
    pub fn eval_file(&mut self, path: &Path) -> Result<Value> {
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "evaluating file");
        self.eval(&source)
    }

    /// Get a global value
    pub fn get_global(&self, name: &str) -> Option<Value> {
        Scope::lookup(self.interpreter.global(), name)
    }

    /// Set a global value
    pub fn set_global(&mut self, name: &str, value: Value) {
        Scope::define(self.interpreter.global(), name, value);
    }

    /// Register a native function
    pub fn register_function<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        let native = Value::new_native(name, move |_, _, args| func(args));
        self.set_global(name, native);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
