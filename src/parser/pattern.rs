//! Match clause sub-parser
//!
//! The host parser recognizes `match (expr) {` and hands control to
//! [`PatternParser`], which reads clauses off any [`ClauseSource`]. Host
//! expressions inside clauses (guards, bodies, computed keys) are parsed by
//! calling back into the source.
//!
//! ```text
//! Clauses        := Clause ( "," Clause )* ","? "}"
//! Clause         := ( "else" | BasicPattern ) ( "if" Expression )? ":" Body
//! BasicPattern   := ObjectPattern | ArrayPattern | Literal | "-" Number | Identifier
//! ObjectPattern  := "{" ( PropertyPattern "," )* ( PropertyPattern | "..." Identifier )? "}"
//! PropertyPattern:= Key ( ":" BasicPattern )?
//! ArrayPattern   := "[" ( BasicPattern "," )* ( BasicPattern | "..." Identifier? )? "]"
//! ```

use crate::ast::*;
use crate::error::{Error, Result, SourceLocation};
use crate::lexer::{Keyword, TokenKind};

/// Token cursor plus host-grammar callbacks the clause parser needs
pub trait ClauseSource {
    /// Kind of the current token
    fn current_kind(&self) -> TokenKind;

    /// Kind of the token `offset` positions ahead
    fn kind_at(&self, offset: usize) -> TokenKind;

    /// Source text of the current token
    fn current_text(&self) -> &str;

    /// Start of the current token
    fn current_location(&self) -> SourceLocation;

    /// End of the most recently consumed token
    fn last_end(&self) -> SourceLocation;

    /// Consume the current token
    fn bump(&mut self);

    /// Parse an assignment-level host expression
    fn expression(&mut self) -> Result<Expr>;

    /// Parse a literal token (number, bigint, string, boolean, null)
    fn literal(&mut self) -> Result<Literal>;

    /// Parse an object key: name, string, number, or `[expr]`
    fn property_key(&mut self) -> Result<PropertyKey>;

    /// Parse a `{ ... }` block in which `return` is legal
    fn clause_block(&mut self) -> Result<Block>;

    /// Build a parse error at `location`
    fn syntax_error(&self, message: &str, location: SourceLocation) -> Error;

    /// Build an "Expected X, found <current token>" error
    fn expected(&self, expected: &str) -> Error;
}

/// Parses the clause list of one match expression
pub struct PatternParser<'p, S: ClauseSource + ?Sized> {
    src: &'p mut S,
}

impl<'p, S: ClauseSource + ?Sized> PatternParser<'p, S> {
    pub fn new(src: &'p mut S) -> Self {
        Self { src }
    }

    /// Parse `{ clauses }` following the scrutinee. `start` is where the
    /// `match` keyword began.
    pub fn parse_match_body(
        &mut self,
        scrutinee: Expr,
        start: SourceLocation,
    ) -> Result<MatchExpression> {
        self.expect(TokenKind::LBrace)?;

        let mut clauses = vec![self.parse_clause()?];
        while self.at(TokenKind::Comma) {
            self.src.bump();
            if self.at(TokenKind::RBrace) {
                break;
            }
            clauses.push(self.parse_clause()?);
        }
        self.expect(TokenKind::RBrace)?;

        MatchExpression::new(scrutinee, clauses, self.span_from(start))
    }

    fn parse_clause(&mut self) -> Result<MatchClause> {
        let start = self.src.current_location();

        let pattern = if self.at(TokenKind::Keyword(Keyword::Else)) {
            self.src.bump();
            MatchPattern::Wildcard(self.span_from(start))
        } else {
            self.parse_basic_pattern()?
        };

        let guard = if self.at(TokenKind::Keyword(Keyword::If)) {
            self.src.bump();
            Some(self.src.expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Colon)?;

        let body = if self.at(TokenKind::LBrace) {
            ClauseBody::Block(self.src.clause_block()?)
        } else {
            ClauseBody::Expr(Box::new(self.src.expression()?))
        };

        Ok(MatchClause {
            pattern,
            guard,
            body,
            span: self.span_from(start),
        })
    }

    /// Any pattern except `else`
    fn parse_basic_pattern(&mut self) -> Result<MatchPattern> {
        match self.src.current_kind() {
            TokenKind::LBrace => self.parse_object_pattern(),
            TokenKind::LBracket => self.parse_array_pattern(),
            kind if kind.is_literal() => {
                let start = self.src.current_location();
                let value = self.src.literal()?;
                Ok(MatchPattern::Literal { value, span: self.span_from(start) })
            }
            TokenKind::Minus if matches!(self.src.kind_at(1), TokenKind::Number | TokenKind::BigInt) => {
                self.parse_negative_literal()
            }
            TokenKind::Ident => self.parse_identifier().map(MatchPattern::Capture),
            TokenKind::Keyword(Keyword::Else) => Err(self.src.syntax_error(
                "'else' is only allowed as a whole clause pattern",
                self.src.current_location(),
            )),
            _ => Err(self.src.expected("pattern")),
        }
    }

    fn parse_negative_literal(&mut self) -> Result<MatchPattern> {
        let start = self.src.current_location();
        self.src.bump(); // -
        let value = self.src.literal()?;
        let value = value
            .negated()
            .ok_or_else(|| self.src.syntax_error("Only numbers can be negated in a pattern", start))?;
        Ok(MatchPattern::Literal { value, span: self.span_from(start) })
    }

    fn parse_object_pattern(&mut self) -> Result<MatchPattern> {
        let start = self.src.current_location();
        self.expect(TokenKind::LBrace)?;

        let mut properties = Vec::new();
        let mut rest = None;

        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Ellipsis) {
                self.src.bump();
                rest = Some(self.parse_identifier()?);
                if !self.at(TokenKind::RBrace) {
                    return Err(self.src.expected("'}' after rest element"));
                }
                break;
            }

            properties.push(self.parse_property_pattern()?);

            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(MatchPattern::object(properties, rest, self.span_from(start)))
    }

    fn parse_property_pattern(&mut self) -> Result<PropertyMatchPattern> {
        let start = self.src.current_location();

        let keyword_key = matches!(self.src.current_kind(), TokenKind::Keyword(_));
        let key = self.src.property_key()?;

        let value = if self.at(TokenKind::Colon) {
            self.src.bump();
            Some(self.parse_basic_pattern()?)
        } else if keyword_key || !matches!(key, PropertyKey::Identifier(_)) {
            return Err(self.src.expected("':'"));
        } else {
            None
        };

        PropertyMatchPattern::new(key, value, self.span_from(start))
    }

    fn parse_array_pattern(&mut self) -> Result<MatchPattern> {
        let start = self.src.current_location();
        self.expect(TokenKind::LBracket)?;

        let mut elements = Vec::new();
        let mut rest = None;

        while !self.at(TokenKind::RBracket) {
            if self.at(TokenKind::Ellipsis) {
                let rest_start = self.src.current_location();
                self.src.bump();
                let binding = if self.at(TokenKind::Ident) {
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                if !self.at(TokenKind::RBracket) {
                    return Err(self.src.expected("']' after rest element"));
                }
                rest = Some(ArrayRest {
                    binding,
                    span: self.span_from(rest_start),
                });
                break;
            }

            elements.push(self.parse_basic_pattern()?);

            if !self.at(TokenKind::RBracket) {
                self.expect(TokenKind::Comma)?;
            }
        }
        self.expect(TokenKind::RBracket)?;

        Ok(MatchPattern::array(elements, rest, self.span_from(start)))
    }

    fn parse_identifier(&mut self) -> Result<Identifier> {
        if !self.at(TokenKind::Ident) {
            return Err(self.src.expected("identifier"));
        }
        self.parse_name()
    }

    /// Identifier or keyword, taken as a plain name
    fn parse_name(&mut self) -> Result<Identifier> {
        let start = self.src.current_location();
        let name = self.src.current_text().to_string();
        self.src.bump();
        Ok(Identifier::new(name, self.span_from(start)))
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.src.current_kind() == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.at(kind) {
            self.src.bump();
            Ok(())
        } else {
            Err(self.src.expected(&kind.to_string()))
        }
    }

    fn span_from(&self, start: SourceLocation) -> Span {
        Span::new(start, self.src.last_end())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::Error;
    use crate::parser::parse_expression;

    fn parse_match(source: &str) -> MatchExpression {
        match parse_expression(source).unwrap().kind {
            ExprKind::Match(m) => *m,
            other => panic!("Expected match expression, got {:?}", other),
        }
    }

    fn first_pattern(source: &str) -> MatchPattern {
        parse_match(source).clauses.remove(0).pattern
    }

    fn parse_err(source: &str) -> Error {
        parse_expression(source).unwrap_err()
    }

    #[test]
    fn test_clause_list() {
        let m = parse_match("match (x) { 1: 'one', 'two': 2, true: 3, null: 4, 5n: 5, else: 6, }");
        assert_eq!(m.clauses.len(), 6);
        assert!(m.clauses[5].pattern.is_wildcard());
        assert_eq!(m.scrutinee.as_ident(), Some("x"));
    }

    #[test]
    fn test_negative_literal() {
        match first_pattern("match (x) { -1: 'neg' }") {
            MatchPattern::Literal { value, span } => {
                assert_eq!(value, Literal::Number(-1.0));
                assert_eq!((span.start.column, span.end.column), (13, 15));
            }
            other => panic!("Expected literal, got {:?}", other),
        }
        match first_pattern("match (x) { -7n: 'neg' }") {
            MatchPattern::Literal { value, .. } => assert_eq!(value, Literal::BigInt("-7".into())),
            other => panic!("Expected literal, got {:?}", other),
        }
        assert!(parse_expression("match (x) { -'a': 1 }").is_err());
    }

    #[test]
    fn test_array_pattern_with_rest() {
        match first_pattern("match (x) { [a, [b], ...rest]: a }") {
            MatchPattern::Array(arr) => {
                assert_eq!(arr.elements.len(), 2);
                assert_eq!(arr.rest.unwrap().binding.unwrap().name, "rest");
            }
            other => panic!("Expected array pattern, got {:?}", other),
        }
        match first_pattern("match (x) { [a, ...]: a }") {
            MatchPattern::Array(arr) => {
                assert!(arr.has_rest());
                assert!(arr.rest.unwrap().binding.is_none());
            }
            other => panic!("Expected array pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_object_pattern_keys() {
        match first_pattern("match (x) { { a, b: 1, 'c d': e, 2: f, [k]: g, if: h, ...rest }: a }") {
            MatchPattern::Object(obj) => {
                assert_eq!(obj.properties.len(), 6);
                assert!(obj.properties[0].shorthand);
                assert!(!obj.properties[1].shorthand);
                assert!(matches!(obj.properties[2].key, PropertyKey::String(ref s) if s == "c d"));
                assert!(matches!(obj.properties[3].key, PropertyKey::Number(n) if n == 2.0));
                assert!(obj.properties[4].computed());
                assert_eq!(obj.rest.unwrap().name, "rest");
            }
            other => panic!("Expected object pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_patterns() {
        assert!(matches!(
            first_pattern("match (x) { {}: 1 }"),
            MatchPattern::Object(ref o) if o.properties.is_empty() && o.rest.is_none()
        ));
        assert!(matches!(
            first_pattern("match (x) { []: 1 }"),
            MatchPattern::Array(ref a) if a.elements.is_empty() && !a.has_rest()
        ));
    }

    #[test]
    fn test_guard_and_block_body() {
        let m = parse_match("match (x) { n if n > 1: { return n; }, else: 0 }");
        assert!(m.clauses[0].guard.is_some());
        assert!(matches!(m.clauses[0].body, ClauseBody::Block(_)));
        assert!(matches!(m.clauses[1].body, ClauseBody::Expr(_)));
    }

    #[test]
    fn test_nested_match_in_body() {
        let m = parse_match("match (x) { [a]: match (a) { 1: 'one', else: 'other' }, else: 0 }");
        match &m.clauses[0].body {
            ClauseBody::Expr(e) => assert!(matches!(e.kind, ExprKind::Match(_))),
            other => panic!("Expected expression body, got {:?}", other),
        }
    }

    #[test]
    fn test_object_rest_must_close() {
        let err = parse_err("match (x) { { ...rest, a }: 1 }");
        assert!(err.to_string().contains("'}' after rest element"));
    }

    #[test]
    fn test_array_rest_must_close() {
        let err = parse_err("match (x) { [...rest, a]: 1 }");
        assert!(err.to_string().contains("']' after rest element"));
    }

    #[test]
    fn test_nested_else_rejected() {
        let err = parse_err("match (x) { [else]: 1 }");
        assert!(err.to_string().contains("'else'"));
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_err("match (x) { 1 'one' }");
        match err {
            Error::ParseError { expected, location, .. } => {
                assert_eq!(expected.as_deref(), Some("':'"));
                assert_eq!(location.column, 15);
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_separator() {
        assert!(parse_expression("match (x) { [a b]: 1 }").is_err());
        assert!(parse_expression("match (x) { {a b}: 1 }").is_err());
        assert!(parse_expression("match (x) { 1: 2 3: 4 }").is_err());
    }

    #[test]
    fn test_shorthand_requires_identifier() {
        assert!(parse_expression("match (x) { {'a'}: 1 }").is_err());
        assert!(parse_expression("match (x) { {if}: 1 }").is_err());
    }

    #[test]
    fn test_at_least_one_clause() {
        assert!(parse_expression("match (x) { }").is_err());
    }
}
