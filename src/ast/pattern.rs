//! Match-pattern AST node types
//!
//! A [`MatchExpression`] carries a scrutinee and an ordered list of
//! [`MatchClause`]s. Each clause tests one [`MatchPattern`]. Composite
//! patterns are built through the constructors below, so a tree that
//! reaches the compiler already satisfies the structural rules: at most one
//! rest capture per level, shorthand properties only for identifier keys,
//! and at least one clause per match.

use super::*;
use crate::error::{Error, Result};

/// A pattern tested against the scrutinee or one of its parts
#[derive(Debug, Clone, Serialize)]
pub enum MatchPattern {
    /// Literal pattern; matches by strict equality
    Literal { value: Literal, span: Span },

    /// Array pattern [a, b, ...rest]
    Array(ArrayMatchPattern),

    /// Object pattern {a, b: 1, ...rest}
    Object(ObjectMatchPattern),

    /// Identifier pattern. Binds at nested positions, tests the type at the root.
    Capture(Identifier),

    /// The `else` pattern
    Wildcard(Span),
}

impl MatchPattern {
    /// Build an array pattern
    pub fn array(elements: Vec<MatchPattern>, rest: Option<ArrayRest>, span: Span) -> Self {
        MatchPattern::Array(ArrayMatchPattern {
            elements,
            rest,
            span,
        })
    }

    /// Build an object pattern
    pub fn object(
        properties: Vec<PropertyMatchPattern>,
        rest: Option<Identifier>,
        span: Span,
    ) -> Self {
        MatchPattern::Object(ObjectMatchPattern {
            properties,
            rest,
            span,
        })
    }

    /// Get the span of this pattern
    pub fn span(&self) -> Span {
        match self {
            MatchPattern::Literal { span, .. } => *span,
            MatchPattern::Array(a) => a.span,
            MatchPattern::Object(o) => o.span,
            MatchPattern::Capture(id) => id.span,
            MatchPattern::Wildcard(span) => *span,
        }
    }

    /// Whether this is the `else` pattern
    pub fn is_wildcard(&self) -> bool {
        matches!(self, MatchPattern::Wildcard(_))
    }

    /// Get all names this pattern binds when used below the root
    pub fn bound_names(&self) -> Vec<&Identifier> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names<'a>(&'a self, names: &mut Vec<&'a Identifier>) {
        match self {
            MatchPattern::Capture(id) => names.push(id),
            MatchPattern::Array(arr) => {
                for elem in &arr.elements {
                    elem.collect_bound_names(names);
                }
                if let Some(id) = arr.rest.as_ref().and_then(|r| r.binding.as_ref()) {
                    names.push(id);
                }
            }
            MatchPattern::Object(obj) => {
                for prop in &obj.properties {
                    prop.value.collect_bound_names(names);
                }
                if let Some(id) = &obj.rest {
                    names.push(id);
                }
            }
            MatchPattern::Literal { .. } | MatchPattern::Wildcard(_) => {}
        }
    }
}

/// Array pattern
#[derive(Debug, Clone, Serialize)]
pub struct ArrayMatchPattern {
    /// Positional element patterns
    pub elements: Vec<MatchPattern>,
    /// Trailing rest marker
    pub rest: Option<ArrayRest>,
    /// Span in source
    pub span: Span,
}

impl ArrayMatchPattern {
    /// Whether a `...` marker follows the positional elements
    pub fn has_rest(&self) -> bool {
        self.rest.is_some()
    }
}

/// The `...` or `...name` tail of an array pattern
#[derive(Debug, Clone, Serialize)]
pub struct ArrayRest {
    /// Name receiving the remaining elements, if any
    pub binding: Option<Identifier>,
    /// Span in source
    pub span: Span,
}

/// Object pattern
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMatchPattern {
    /// Property patterns, tested left to right
    pub properties: Vec<PropertyMatchPattern>,
    /// Name receiving the remaining own properties
    pub rest: Option<Identifier>,
    /// Span in source
    pub span: Span,
}

/// A `key` or `key: pattern` entry of an object pattern
#[derive(Debug, Clone, Serialize)]
pub struct PropertyMatchPattern {
    /// Property key
    pub key: PropertyKey,
    /// Value pattern
    pub value: MatchPattern,
    /// Written without `: pattern`
    pub shorthand: bool,
    /// Span in source
    pub span: Span,
}

impl PropertyMatchPattern {
    /// Build a property pattern. Without an explicit value pattern the key
    /// must be an identifier, which then doubles as a capture.
    pub fn new(key: PropertyKey, value: Option<MatchPattern>, span: Span) -> Result<Self> {
        match value {
            Some(value) => Ok(Self {
                key,
                value,
                shorthand: false,
                span,
            }),
            None => match &key {
                PropertyKey::Identifier(id) => {
                    let value = MatchPattern::Capture(id.clone());
                    Ok(Self {
                        key,
                        value,
                        shorthand: true,
                        span,
                    })
                }
                _ => Err(Error::parse_error(
                    "Shorthand property pattern requires an identifier key",
                    span.start,
                )),
            },
        }
    }

    /// Whether the key is a `[computed]` expression
    pub fn computed(&self) -> bool {
        matches!(self.key, PropertyKey::Computed(_))
    }
}

/// Body of a match clause
#[derive(Debug, Clone, Serialize)]
pub enum ClauseBody {
    /// A single expression whose value is the clause result
    Expr(Box<Expr>),
    /// A block; its own `return` produces the clause result
    Block(Block),
}

impl ClauseBody {
    /// Get the span of this body
    pub fn span(&self) -> Span {
        match self {
            ClauseBody::Expr(e) => e.span,
            ClauseBody::Block(b) => b.span,
        }
    }
}

/// One `pattern (if guard)?: body` alternative
#[derive(Debug, Clone, Serialize)]
pub struct MatchClause {
    /// Pattern tested against the scrutinee
    pub pattern: MatchPattern,
    /// Extra condition evaluated after the pattern's bindings
    pub guard: Option<Expr>,
    /// Clause result
    pub body: ClauseBody,
    /// Span in source
    pub span: Span,
}

/// match (scrutinee) { clauses }
#[derive(Debug, Clone, Serialize)]
pub struct MatchExpression {
    /// The value being matched
    pub scrutinee: Expr,
    /// Clauses in source order
    pub clauses: Vec<MatchClause>,
    /// Span in source
    pub span: Span,
}

impl MatchExpression {
    /// Build a match expression; at least one clause is required
    pub fn new(scrutinee: Expr, clauses: Vec<MatchClause>, span: Span) -> Result<Self> {
        if clauses.is_empty() {
            return Err(Error::parse_error(
                "Match expression requires at least one clause",
                span.end,
            ));
        }
        Ok(Self {
            scrutinee,
            clauses,
            span,
        })
    }
}
