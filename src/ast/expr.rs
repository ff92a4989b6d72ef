//! Expression nodes

use super::{AssignOp, BinaryOp, Function, Identifier, MatchExpression, PropertyKey, Span, UnaryOp};
use crate::ir::LoweredMatch;
use serde::Serialize;
use std::fmt;

/// Expression node
#[derive(Debug, Clone, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// The expression with any number of enclosing parentheses removed
    pub fn unparenthesized(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparenthesized(),
            _ => self,
        }
    }

    /// Name of a plain variable reference, looking through parentheses
    pub fn as_ident(&self) -> Option<&str> {
        match &self.unparenthesized().kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Whether `=`, `+=` or `-=` may store into this expression
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.unparenthesized().kind,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }
}

/// Expression variants
#[derive(Debug, Clone, Serialize)]
pub enum ExprKind {
    /// Variable reference
    Ident(String),

    Literal(Literal),

    This,

    /// `[a, ...b]`; spreads appear as [`ExprKind::Spread`]
    Array(Vec<Expr>),

    /// `{a: 1, b, [k]: v, m() {}, ...o}`
    Object(Vec<ObjectMember>),

    /// `function` expression or arrow
    Function(Box<Function>),

    /// `object.property`
    Member { object: Box<Expr>, property: Identifier },

    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },

    Call { callee: Box<Expr>, args: Vec<Expr> },

    New { callee: Box<Expr>, args: Vec<Expr> },

    Unary { op: UnaryOp, operand: Box<Expr> },

    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },

    Assign { op: AssignOp, target: Box<Expr>, value: Box<Expr> },

    /// `cond ? then : otherwise`
    Conditional { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },

    /// `...expr` inside array literals and argument lists
    Spread(Box<Expr>),

    Paren(Box<Expr>),

    /// `match (scrutinee) { clauses }` as parsed
    Match(Box<MatchExpression>),

    /// A match after lowering
    Lowered(Box<LoweredMatch>),
}

/// Entry of an object literal
#[derive(Debug, Clone, Serialize)]
pub enum ObjectMember {
    Property { key: PropertyKey, value: Expr, shorthand: bool },
    Spread(Expr),
}

/// Literal constant, in expressions and in literal patterns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    /// Decimal digits, with a leading `-` when negative
    BigInt(String),
    String(String),
}

impl Literal {
    /// The literal written with a leading `-`; only numeric literals have one
    pub fn negated(&self) -> Option<Literal> {
        match self {
            Literal::Number(n) => Some(Literal::Number(-n)),
            Literal::BigInt(digits) if digits == "0" => Some(self.clone()),
            Literal::BigInt(digits) => Some(Literal::BigInt(match digits.strip_prefix('-') {
                Some(positive) => positive.to_string(),
                None => format!("-{}", digits),
            })),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => f.write_str(&crate::runtime::number_to_string(*n)),
            Literal::BigInt(digits) => write!(f, "{}n", digits),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}
