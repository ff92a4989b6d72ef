//! Match lowering and dispatch
//!
//! Each match becomes a [`LoweredMatch`]: the scrutinee is bound once, then
//! clauses are compiled in source order into a [`DispatchChain`]. The first
//! unguarded `else` ends the chain; without one the chain ends in a failure.

use super::{compile_clause, LowerOptions, NameGenerator, PatternCompiler};
use crate::ast::*;
use crate::error::Result;
use crate::ir::{DispatchChain, Fallback, LoweredMatch, Place, ScrutineeBinding, Test};
use tracing::debug;

/// Lower one match expression, including any matches nested inside it
pub fn lower_match(m: &MatchExpression, names: &mut NameGenerator) -> Result<LoweredMatch> {
    lower_match_with(m, names, &LowerOptions::default())
}

/// [`lower_match`] with explicit options
pub fn lower_match_with(
    m: &MatchExpression,
    names: &mut NameGenerator,
    options: &LowerOptions,
) -> Result<LoweredMatch> {
    let mut m = m.clone();
    Lowerer {
        names: &mut *names,
        options,
    }
    .lower_match_children(&mut m)?;
    build_dispatch(&m, names, options)
}

/// Replace every match expression in `program` with its lowered form
pub fn lower_program(program: Program) -> Result<Program> {
    lower_program_with(program, &LowerOptions::default())
}

/// [`lower_program`] with explicit options
#[tracing::instrument(level = "debug", skip_all)]
pub fn lower_program_with(mut program: Program, options: &LowerOptions) -> Result<Program> {
    let mut names = NameGenerator::seed_from_program(&program);
    let mut lowerer = Lowerer {
        names: &mut names,
        options,
    };
    lowerer.lower_stmts(&mut program.body)?;
    Ok(program)
}

fn build_dispatch(
    m: &MatchExpression,
    names: &mut NameGenerator,
    options: &LowerOptions,
) -> Result<LoweredMatch> {
    let scrutinee = match m.scrutinee.as_ident() {
        Some(name) => ScrutineeBinding::Reuse(Identifier::new(name, m.scrutinee.span)),
        None => ScrutineeBinding::Temp {
            name: names.fresh(&options.scrutinee_hint),
            init: m.scrutinee.clone(),
        },
    };
    let place = Place::Local(scrutinee.name().clone());

    let mut compiler = PatternCompiler::new(names, options);
    let mut branches = Vec::with_capacity(m.clauses.len());
    let mut fallback = None;

    for (index, clause) in m.clauses.iter().enumerate() {
        let branch = compile_clause(&mut compiler, &place, clause)?;
        debug!(
            clause = index,
            tests = branch.test.as_ref().map_or(0, Test::size),
            bindings = branch.scope.bindings.len(),
            guarded = branch.scope.guard.is_some(),
            "compiled clause"
        );

        if branch.test.is_none() && branch.scope.guard.is_none() {
            let unreachable = m.clauses.len() - index - 1;
            if unreachable > 0 {
                debug!(unreachable, "clauses after 'else' are never tried");
            }
            fallback = Some(Fallback::Clause(branch.scope));
            break;
        }
        branches.push(branch);
    }

    let fallback = fallback.unwrap_or_else(|| Fallback::Fail {
        message: options.failure_message.clone(),
        location: m.span.start,
    });

    debug!(
        scrutinee = %scrutinee.name().name,
        branches = branches.len(),
        has_else = matches!(fallback, Fallback::Clause(_)),
        "lowered match"
    );

    Ok(LoweredMatch {
        scrutinee,
        chain: DispatchChain { branches, fallback },
        span: m.span,
    })
}

/// Mutable walk that lowers matches innermost first
struct Lowerer<'a> {
    names: &'a mut NameGenerator,
    options: &'a LowerOptions,
}

impl Lowerer<'_> {
    fn lower_stmts(&mut self, stmts: &mut [Stmt]) -> Result<()> {
        stmts.iter_mut().try_for_each(|stmt| self.lower_stmt(stmt))
    }

    fn lower_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match &mut stmt.kind {
            StmtKind::Expr(e) | StmtKind::Throw(e) | StmtKind::Return(Some(e)) => self.lower_expr(e),
            StmtKind::Decl { declarators, .. } => declarators
                .iter_mut()
                .filter_map(|d| d.init.as_mut())
                .try_for_each(|init| self.lower_expr(init)),
            StmtKind::Function(f) => self.lower_function(f),
            StmtKind::Block(b) => self.lower_stmts(&mut b.stmts),
            StmtKind::If { cond, then, otherwise } => {
                self.lower_expr(cond)?;
                self.lower_stmt(then)?;
                match otherwise {
                    Some(otherwise) => self.lower_stmt(otherwise),
                    None => Ok(()),
                }
            }
            StmtKind::While { cond, body } => {
                self.lower_expr(cond)?;
                self.lower_stmt(body)
            }
            StmtKind::Try { body, catch, finally } => {
                self.lower_stmts(&mut body.stmts)?;
                if let Some(catch) = catch {
                    self.lower_stmts(&mut catch.body.stmts)?;
                }
                match finally {
                    Some(finally) => self.lower_stmts(&mut finally.stmts),
                    None => Ok(()),
                }
            }
            StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue | StmtKind::Empty => Ok(()),
        }
    }

    fn lower_function(&mut self, func: &mut Function) -> Result<()> {
        match &mut func.body {
            FunctionBody::Block(b) => self.lower_stmts(&mut b.stmts),
            FunctionBody::Expr(e) => self.lower_expr(e),
        }
    }

    fn lower_exprs(&mut self, exprs: &mut [Expr]) -> Result<()> {
        exprs.iter_mut().try_for_each(|e| self.lower_expr(e))
    }

    fn lower_expr(&mut self, expr: &mut Expr) -> Result<()> {
        match &mut expr.kind {
            ExprKind::Ident(_) | ExprKind::Literal(_) | ExprKind::This | ExprKind::Lowered(_) => {}
            ExprKind::Array(items) => self.lower_exprs(items)?,
            ExprKind::Object(members) => {
                for member in members {
                    match member {
                        ObjectMember::Property { key, value, .. } => {
                            self.lower_key(key)?;
                            self.lower_expr(value)?;
                        }
                        ObjectMember::Spread(e) => self.lower_expr(e)?,
                    }
                }
            }
            ExprKind::Function(f) => self.lower_function(f)?,
            ExprKind::Member { object, .. } => self.lower_expr(object)?,
            ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
                self.lower_expr(callee)?;
                self.lower_exprs(args)?;
            }
            ExprKind::Index { object: left, index: right }
            | ExprKind::Binary { left, right, .. }
            | ExprKind::Assign { target: left, value: right, .. } => {
                self.lower_expr(left)?;
                self.lower_expr(right)?;
            }
            ExprKind::Unary { operand: e, .. } | ExprKind::Spread(e) | ExprKind::Paren(e) => {
                self.lower_expr(e)?
            }
            ExprKind::Conditional { cond, then, otherwise } => {
                self.lower_expr(cond)?;
                self.lower_expr(then)?;
                self.lower_expr(otherwise)?;
            }
            ExprKind::Match(m) => {
                self.lower_match_children(m)?;
                let lowered = build_dispatch(m, self.names, self.options)?;
                expr.kind = ExprKind::Lowered(Box::new(lowered));
            }
        }
        Ok(())
    }

    fn lower_key(&mut self, key: &mut PropertyKey) -> Result<()> {
        match key {
            PropertyKey::Computed(e) => self.lower_expr(e),
            _ => Ok(()),
        }
    }

    /// Lower matches in the scrutinee, computed pattern keys, guards, and bodies
    fn lower_match_children(&mut self, m: &mut MatchExpression) -> Result<()> {
        self.lower_expr(&mut m.scrutinee)?;
        for clause in &mut m.clauses {
            self.lower_pattern(&mut clause.pattern)?;
            if let Some(guard) = &mut clause.guard {
                self.lower_expr(guard)?;
            }
            match &mut clause.body {
                ClauseBody::Expr(e) => self.lower_expr(e)?,
                ClauseBody::Block(b) => self.lower_stmts(&mut b.stmts)?,
            }
        }
        Ok(())
    }

    fn lower_pattern(&mut self, pattern: &mut MatchPattern) -> Result<()> {
        match pattern {
            MatchPattern::Array(arr) => {
                for elem in &mut arr.elements {
                    self.lower_pattern(elem)?;
                }
            }
            MatchPattern::Object(obj) => {
                for prop in &mut obj.properties {
                    self.lower_key(&mut prop.key)?;
                    self.lower_pattern(&mut prop.value)?;
                }
            }
            MatchPattern::Literal { .. } | MatchPattern::Capture(_) | MatchPattern::Wildcard(_) => {}
        }
        Ok(())
    }
}
