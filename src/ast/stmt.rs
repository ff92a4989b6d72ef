//! Statement nodes

use super::{Expr, Function, Identifier, Span};
use serde::Serialize;

/// Statement node
#[derive(Debug, Clone, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement variants
#[derive(Debug, Clone, Serialize)]
pub enum StmtKind {
    /// Expression evaluated for its effect
    Expr(Expr),

    /// `var`/`let`/`const` with one or more declarators
    Decl { kind: DeclKind, declarators: Vec<Declarator> },

    /// `function name() {}`, hoisted to the top of its block
    Function(Box<Function>),

    Block(Block),

    If { cond: Expr, then: Box<Stmt>, otherwise: Option<Box<Stmt>> },

    While { cond: Expr, body: Box<Stmt> },

    Break,

    Continue,

    Return(Option<Expr>),

    Throw(Expr),

    Try { body: Block, catch: Option<CatchClause>, finally: Option<Block> },

    /// A lone `;`
    Empty,
}

/// Braced statement list with its own scope
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// `name` or `name = init`
#[derive(Debug, Clone, Serialize)]
pub struct Declarator {
    pub name: Identifier,
    pub init: Option<Expr>,
}

/// `catch (param) { ... }`; the parameter is optional
#[derive(Debug, Clone, Serialize)]
pub struct CatchClause {
    pub param: Option<Identifier>,
    pub body: Block,
}
