//! Host syntax tree
//!
//! Nodes are a `kind` enum paired with the [`Span`] it was parsed from:
//! [`Expr`]/[`ExprKind`] and [`Stmt`]/[`StmtKind`]. Match expressions and
//! their patterns live in [`pattern`]; operators in [`operators`].

mod expr;
mod operators;
mod pattern;
mod stmt;
pub mod visit;

pub use expr::*;
pub use operators::{AssignOp, BinaryOp, UnaryOp};
pub use pattern::*;
pub use stmt::*;

use crate::error::SourceLocation;
use serde::Serialize;

/// Source range of a node, start inclusive and end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Span {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        let start = if other.start.offset < self.start.offset { other.start } else { self.start };
        let end = if other.end.offset > self.end.offset { other.end } else { self.end };
        Span { start, end }
    }
}

/// A name as written in the source: bindings, parameters, captures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Identifier { name: name.into(), span }
    }
}

/// A parsed source file
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Declared function, function expression, object method, or arrow
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: Option<Identifier>,
    pub params: Vec<Identifier>,
    /// Trailing `...name` parameter
    pub rest: Option<Identifier>,
    pub body: FunctionBody,
    /// Arrows see the enclosing `this` and cannot be constructed
    pub is_arrow: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub enum FunctionBody {
    Block(Block),
    /// Concise arrow body
    Expr(Box<Expr>),
}

/// Key of an object literal entry or an object pattern entry
#[derive(Debug, Clone, Serialize)]
pub enum PropertyKey {
    Identifier(Identifier),
    String(String),
    Number(f64),
    /// `[expr]`
    Computed(Box<Expr>),
}

impl PropertyKey {
    /// The property name, unless it has to be computed at runtime
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name.clone()),
            PropertyKey::String(s) => Some(s.clone()),
            PropertyKey::Number(n) => Some(crate::runtime::number_to_string(*n)),
            PropertyKey::Computed(_) => None,
        }
    }
}
