//! Clause compiler

use super::PatternCompiler;
use crate::ast::MatchClause;
use crate::error::Result;
use crate::ir::{Branch, ClauseScope, Place};

/// Compile one clause tested against `scrutinee` into a branch whose scope
/// holds the pattern's bindings, the guard, and the body.
pub fn compile_clause(
    compiler: &mut PatternCompiler<'_>,
    scrutinee: &Place,
    clause: &MatchClause,
) -> Result<Branch> {
    let compiled = compiler.compile_test(scrutinee, &clause.pattern, true)?;
    Ok(Branch {
        test: compiled.test,
        scope: ClauseScope {
            bindings: compiled.bindings,
            guard: clause.guard.clone(),
            body: clause.body.clone(),
        },
    })
}
