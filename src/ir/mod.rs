//! Dispatch IR produced by match lowering
//!
//! A lowered match is a flat decision procedure: the scrutinee is bound
//! once, then each [`Branch`] runs its [`Test`] and, if it holds, enters an
//! isolated [`ClauseScope`] that executes the clause's [`Binding`]s, its
//! optional guard, and its body. The chain ends in a [`Fallback`].
//!
//! Every node serializes to JSON so the CLI can dump lowered code.

use crate::ast::visit::{walk_program, Visitor};
use crate::ast::{ClauseBody, Expr, ExprKind, Identifier, Literal, Program, Span};
use crate::error::{Error, Result, SourceLocation};
use serde::Serialize;
use std::fmt;

/// A path from the scrutinee to the value under test
#[derive(Debug, Clone, Serialize)]
pub enum Place {
    /// The scrutinee binding itself
    Local(Identifier),
    /// `place[index]`
    Index(Box<Place>, usize),
    /// `place.name` or `place[expr]`
    Member(Box<Place>, PropertyName),
}

impl Place {
    /// `self[index]`
    pub fn index(&self, index: usize) -> Place {
        Place::Index(Box::new(self.clone()), index)
    }

    /// `self.name`
    pub fn member(&self, name: PropertyName) -> Place {
        Place::Member(Box::new(self.clone()), name)
    }

    /// The scrutinee binding this place is rooted at
    pub fn root(&self) -> &Identifier {
        match self {
            Place::Local(id) => id,
            Place::Index(base, _) | Place::Member(base, _) => base.root(),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Local(id) => write!(f, "{}", id.name),
            Place::Index(base, index) => write!(f, "{}[{}]", base, index),
            Place::Member(base, PropertyName::Static(name)) => write!(f, "{}.{}", base, name),
            Place::Member(base, PropertyName::Computed(temp)) => write!(f, "{}[{}]", base, temp.name),
        }
    }
}

/// A property name used by tests and member places
#[derive(Debug, Clone, Serialize)]
pub enum PropertyName {
    /// Known at compile time
    Static(String),
    /// Read from the temporary a [`Test::KeyTemp`] bound earlier in the branch
    Computed(Identifier),
}

/// A boolean test over places of the scrutinee
#[derive(Debug, Clone, Serialize)]
pub enum Test {
    /// `place === literal`
    StrictEq { place: Place, literal: Literal },
    /// `Array.isArray(place)`
    IsArray(Place),
    /// `place.length === length`
    LengthEq { place: Place, length: usize },
    /// `typeof place === type_name`
    TypeOf { place: Place, type_name: String },
    /// `place.hasOwnProperty(key)`
    HasOwn { place: Place, key: PropertyName },
    /// `place !== undefined`
    NotUndefined(Place),
    /// `(M[Symbol.match] && M[Symbol.match](place) !== null) || (typeof M === "function" && place instanceof M)`
    Protocol { place: Place, matcher: Identifier },
    /// `(name = init, true)`: evaluates a computed pattern key once, right
    /// before its first use
    KeyTemp { name: Identifier, init: Box<Expr> },
    /// `key !== name`, used by rest filters
    KeyNe { key: Identifier, name: PropertyName },
    /// Short-circuiting conjunction
    And(Box<Test>, Box<Test>),
}

impl Test {
    /// Conjoin two optional tests, left first
    pub fn and(left: Option<Test>, right: Option<Test>) -> Option<Test> {
        match (left, right) {
            (Some(l), Some(r)) => Some(Test::And(Box::new(l), Box::new(r))),
            (l, None) => l,
            (None, r) => r,
        }
    }

    /// Conjoin a sequence of tests left to right; `None` when empty
    pub fn all(tests: impl IntoIterator<Item = Option<Test>>) -> Option<Test> {
        tests.into_iter().fold(None, Test::and)
    }

    /// Number of primitive tests in this tree
    pub fn size(&self) -> usize {
        match self {
            Test::And(l, r) => l.size() + r.size(),
            _ => 1,
        }
    }
}

/// A declaration executed inside a clause scope once its test passed
#[derive(Debug, Clone, Serialize)]
pub enum Binding {
    /// `const name = init`
    Const { name: Identifier, init: Place },
    /// `var name = source.slice(start)`
    Slice {
        name: Identifier,
        source: Place,
        start: usize,
    },
    /// `var name = Object.assign({}, source)`
    CopyAll { name: Identifier, source: Place },
    /// `var name = {}; for (var key in source) if (filter) name[key] = source[key]`
    CopyFiltered {
        name: Identifier,
        source: Place,
        key: Identifier,
        filter: Test,
    },
}

impl Binding {
    /// Build a filtered rest copy that skips every name in `excluded`.
    /// An empty exclusion set has no filter to build; callers use
    /// [`Binding::CopyAll`] for that case.
    pub fn copy_filtered(
        name: Identifier,
        source: Place,
        key: Identifier,
        excluded: Vec<PropertyName>,
    ) -> Result<Binding> {
        let filter = Test::all(excluded.into_iter().map(|excluded_name| {
            Some(Test::KeyNe {
                key: key.clone(),
                name: excluded_name,
            })
        }))
        .ok_or_else(|| {
            Error::rest_spec(format!(
                "cannot build rest filter for '{}' over zero excluded keys",
                name.name
            ))
        })?;
        Ok(Binding::CopyFiltered {
            name,
            source,
            key,
            filter,
        })
    }

    /// The name this binding declares
    pub fn name(&self) -> &Identifier {
        match self {
            Binding::Const { name, .. }
            | Binding::Slice { name, .. }
            | Binding::CopyAll { name, .. }
            | Binding::CopyFiltered { name, .. } => name,
        }
    }
}

/// Isolated per-clause scope: bindings, then guard, then body
#[derive(Debug, Clone, Serialize)]
pub struct ClauseScope {
    pub bindings: Vec<Binding>,
    pub guard: Option<Expr>,
    pub body: ClauseBody,
}

/// One link of the dispatch chain
#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    /// `None` means the pattern matches unconditionally
    pub test: Option<Test>,
    pub scope: ClauseScope,
}

/// What runs when no branch was taken
#[derive(Debug, Clone, Serialize)]
pub enum Fallback {
    /// An unguarded `else` clause
    Clause(ClauseScope),
    /// Raise the match failure
    Fail {
        message: String,
        location: SourceLocation,
    },
}

/// Ordered branches plus the terminal fallback
#[derive(Debug, Clone, Serialize)]
pub struct DispatchChain {
    pub branches: Vec<Branch>,
    pub fallback: Fallback,
}

/// How the scrutinee is made available to the chain
#[derive(Debug, Clone, Serialize)]
pub enum ScrutineeBinding {
    /// The scrutinee was a bare identifier and is read directly
    Reuse(Identifier),
    /// `const name = init`, evaluated once before any test
    Temp { name: Identifier, init: Expr },
}

impl ScrutineeBinding {
    /// The name every [`Place`] of the chain is rooted at
    pub fn name(&self) -> &Identifier {
        match self {
            ScrutineeBinding::Reuse(id) => id,
            ScrutineeBinding::Temp { name, .. } => name,
        }
    }
}

/// The compiled replacement of a match expression
#[derive(Debug, Clone, Serialize)]
pub struct LoweredMatch {
    pub scrutinee: ScrutineeBinding,
    pub chain: DispatchChain,
    pub span: Span,
}

/// Outermost lowered matches of a program, in source order. Matches nested
/// inside another lowered match are reachable through their parent.
pub fn lowered_matches(program: &Program) -> Vec<LoweredMatch> {
    struct Collector(Vec<LoweredMatch>);

    impl Visitor for Collector {
        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Lowered(m) = &expr.kind {
                self.0.push((**m).clone());
            }
        }
    }

    let mut collector = Collector(Vec::new());
    walk_program(&mut collector, program);
    collector.0
}
