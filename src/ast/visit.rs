//! Read-only tree walk
//!
//! Override the [`Visitor`] hooks you need; the `walk_*` functions visit
//! children in source order. Lowered matches are leaves.

use super::*;

pub trait Visitor {
    /// Every name in the tree: references, declarations, parameters,
    /// property names, and pattern captures
    fn visit_name(&mut self, _name: &str) {}

    /// Each expression, before its children
    fn visit_expr(&mut self, _expr: &Expr) {}
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) {
    walk_stmts(v, &program.body);
}

pub fn walk_stmts<V: Visitor + ?Sized>(v: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        walk_stmt(v, stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::Throw(e) | StmtKind::Return(Some(e)) => walk_expr(v, e),
        StmtKind::Decl { declarators, .. } => {
            for d in declarators {
                v.visit_name(&d.name.name);
                if let Some(init) = &d.init {
                    walk_expr(v, init);
                }
            }
        }
        StmtKind::Function(f) => walk_function(v, f),
        StmtKind::Block(b) => walk_stmts(v, &b.stmts),
        StmtKind::If { cond, then, otherwise } => {
            walk_expr(v, cond);
            walk_stmt(v, then);
            if let Some(otherwise) = otherwise {
                walk_stmt(v, otherwise);
            }
        }
        StmtKind::While { cond, body } => {
            walk_expr(v, cond);
            walk_stmt(v, body);
        }
        StmtKind::Try { body, catch, finally } => {
            walk_stmts(v, &body.stmts);
            if let Some(catch) = catch {
                if let Some(param) = &catch.param {
                    v.visit_name(&param.name);
                }
                walk_stmts(v, &catch.body.stmts);
            }
            if let Some(finally) = finally {
                walk_stmts(v, &finally.stmts);
            }
        }
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue | StmtKind::Empty => {}
    }
}

pub fn walk_function<V: Visitor + ?Sized>(v: &mut V, func: &Function) {
    let names = func.name.iter().chain(&func.params).chain(&func.rest);
    for id in names {
        v.visit_name(&id.name);
    }
    match &func.body {
        FunctionBody::Block(b) => walk_stmts(v, &b.stmts),
        FunctionBody::Expr(e) => walk_expr(v, e),
    }
}

fn walk_key<V: Visitor + ?Sized>(v: &mut V, key: &PropertyKey) {
    match key {
        PropertyKey::Identifier(id) => v.visit_name(&id.name),
        PropertyKey::Computed(e) => walk_expr(v, e),
        PropertyKey::String(_) | PropertyKey::Number(_) => {}
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    v.visit_expr(expr);
    match &expr.kind {
        ExprKind::Ident(name) => v.visit_name(name),
        ExprKind::Literal(_) | ExprKind::This | ExprKind::Lowered(_) => {}
        ExprKind::Array(items) => items.iter().for_each(|e| walk_expr(v, e)),
        ExprKind::Object(members) => {
            for member in members {
                match member {
                    ObjectMember::Property { key, value, .. } => {
                        walk_key(v, key);
                        walk_expr(v, value);
                    }
                    ObjectMember::Spread(e) => walk_expr(v, e),
                }
            }
        }
        ExprKind::Function(f) => walk_function(v, f),
        ExprKind::Member { object, property } => {
            walk_expr(v, object);
            v.visit_name(&property.name);
        }
        ExprKind::Index { object, index } => {
            walk_expr(v, object);
            walk_expr(v, index);
        }
        ExprKind::Call { callee, args } | ExprKind::New { callee, args } => {
            walk_expr(v, callee);
            args.iter().for_each(|e| walk_expr(v, e));
        }
        ExprKind::Unary { operand, .. } => walk_expr(v, operand),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(v, left);
            walk_expr(v, right);
        }
        ExprKind::Assign { target, value, .. } => {
            walk_expr(v, target);
            walk_expr(v, value);
        }
        ExprKind::Conditional { cond, then, otherwise } => {
            walk_expr(v, cond);
            walk_expr(v, then);
            walk_expr(v, otherwise);
        }
        ExprKind::Spread(e) | ExprKind::Paren(e) => walk_expr(v, e),
        ExprKind::Match(m) => walk_match(v, m),
    }
}

/// Scrutinee, then each clause's pattern, guard, and body
pub fn walk_match<V: Visitor + ?Sized>(v: &mut V, m: &MatchExpression) {
    walk_expr(v, &m.scrutinee);
    for clause in &m.clauses {
        walk_pattern(v, &clause.pattern);
        if let Some(guard) = &clause.guard {
            walk_expr(v, guard);
        }
        match &clause.body {
            ClauseBody::Expr(e) => walk_expr(v, e),
            ClauseBody::Block(b) => walk_stmts(v, &b.stmts),
        }
    }
}

pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pattern: &MatchPattern) {
    match pattern {
        MatchPattern::Literal { .. } | MatchPattern::Wildcard(_) => {}
        MatchPattern::Capture(id) => v.visit_name(&id.name),
        MatchPattern::Array(arr) => {
            arr.elements.iter().for_each(|p| walk_pattern(v, p));
            if let Some(id) = arr.rest.as_ref().and_then(|r| r.binding.as_ref()) {
                v.visit_name(&id.name);
            }
        }
        MatchPattern::Object(obj) => {
            for prop in &obj.properties {
                walk_key(v, &prop.key);
                walk_pattern(v, &prop.value);
            }
            if let Some(id) = &obj.rest {
                v.visit_name(&id.name);
            }
        }
    }
}
