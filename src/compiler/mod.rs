//! Match compiler
//!
//! Lowers `match` expressions into the dispatch IR of [`crate::ir`].
//! The work is split the same way at every level:
//!
//! - [`pattern`]: one pattern tree to a `(test, bindings)` pair
//! - [`clause`]: one clause to an isolated [`ClauseScope`](crate::ir::ClauseScope)
//! - [`lower`]: a whole match to a [`LoweredMatch`](crate::ir::LoweredMatch),
//!   and a whole program with every match replaced

mod clause;
mod lower;
mod names;
mod pattern;

pub use clause::compile_clause;
pub use lower::{lower_match, lower_match_with, lower_program, lower_program_with};
pub use names::NameGenerator;
pub use pattern::{CompiledPattern, PatternCompiler};

use crate::error::messages;

/// Options controlling generated code
#[derive(Debug, Clone)]
pub struct LowerOptions {
    /// Hint for the temporary holding a non-identifier scrutinee
    pub scrutinee_hint: String,
    /// Hint for the loop key of filtered object-rest copies
    pub key_hint: String,
    /// Hint for the temporaries holding computed pattern keys
    pub computed_key_hint: String,
    /// Message carried by the match failure
    pub failure_message: String,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            scrutinee_hint: "match_expr".to_string(),
            key_hint: "key".to_string(),
            computed_key_hint: "key_expr".to_string(),
            failure_message: messages::NO_PATTERN_MATCHED.to_string(),
        }
    }
}

impl LowerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scrutinee temporary hint
    pub fn with_scrutinee_hint(mut self, hint: impl Into<String>) -> Self {
        self.scrutinee_hint = hint.into();
        self
    }

    /// Set the rest-filter loop key hint
    pub fn with_key_hint(mut self, hint: impl Into<String>) -> Self {
        self.key_hint = hint.into();
        self
    }

    /// Set the computed-key temporary hint
    pub fn with_computed_key_hint(mut self, hint: impl Into<String>) -> Self {
        self.computed_key_hint = hint.into();
        self
    }

    /// Set the match failure message
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }
}
