//! Shared test helpers for integration tests

use quickmatch::{Runtime, Value};

/// Run host code and return the value of its last expression statement
pub fn run(code: &str) -> quickmatch::Result<Value> {
    let mut runtime = Runtime::new();
    runtime.eval(code)
}

/// Run host code and render the result the way the REPL does
#[allow(dead_code)]
pub fn run_display(code: &str) -> String {
    run(code)
        .map(|v| v.to_display_string())
        .unwrap_or_else(|e| format!("Error: {}", e))
}

/// Shorthand for a string value
#[allow(dead_code)]
pub fn string(s: &str) -> Value {
    Value::String(s.to_string())
}
