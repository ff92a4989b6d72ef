//! Host-language parser
//!
//! Statements are parsed by recursive descent and binary operators by
//! precedence climbing over [`BinaryOp::precedence`]. On `match (expr) {`
//! the token stream is handed to [`PatternParser`] through [`ClauseSource`].

mod literal;
mod pattern;

pub use pattern::{ClauseSource, PatternParser};

use crate::ast::*;
use crate::error::{messages, Error, Result, SourceLocation};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Which jump statements are legal at the current position
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    /// Function bodies and clause blocks accept `return`
    in_function: bool,
    /// Loop bodies accept `break` and `continue`
    in_loop: bool,
}

const FUNCTION_BODY: Context = Context { in_function: true, in_loop: false };

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    cursor: usize,
    context: Context,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self> {
        Ok(Parser {
            source,
            tokens: Lexer::new(source).tokenize()?,
            cursor: 0,
            context: Context::default(),
        })
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let start = self.location();
        let mut body = Vec::new();
        while self.kind() != TokenKind::Eof {
            body.push(self.statement()?);
        }
        Ok(Program { body, span: self.span_from(start) })
    }

    // Cursor

    /// The current token; the cursor never moves past `Eof`
    fn token(&self) -> Token {
        self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens.get(self.cursor + n).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn kind(&self) -> TokenKind {
        self.nth(0)
    }

    fn text(&self) -> &'src str {
        self.token().text(self.source)
    }

    fn location(&self) -> SourceLocation {
        self.token().start
    }

    fn prev_end(&self) -> SourceLocation {
        match self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(prev) => prev.end,
            None => self.location(),
        }
    }

    fn span_from(&self, start: SourceLocation) -> Span {
        Span::new(start, self.prev_end())
    }

    fn bump(&mut self) -> Token {
        let token = self.token();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let hit = self.kind() == kind;
        if hit {
            self.bump();
        }
        hit
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.kind() == kind {
            Ok(self.bump())
        } else {
            Err(self.expected(&kind.to_string()))
        }
    }

    fn error(&self, message: impl Into<String>, at: SourceLocation) -> Error {
        Error::parse_error_with_context(message, at, self.source)
    }

    /// "Expected `what`, found <current token>"
    fn expected(&self, what: &str) -> Error {
        let found = match self.kind() {
            kind @ (TokenKind::Ident | TokenKind::Number | TokenKind::BigInt | TokenKind::Str) => {
                format!("{} {}", kind, self.text())
            }
            kind => kind.to_string(),
        };
        Error::unexpected_token(what, found, self.location(), self.source)
    }

    /// Run `f` with `context` in effect, restoring the outer one afterwards
    fn within<T>(&mut self, context: Context, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let outer = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = outer;
        result
    }

    /// A statement may end here: before `;`, `}`, end of input, or a line break
    fn at_statement_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof)
            || self.prev_end().line < self.location().line
    }

    fn end_statement(&mut self) -> Result<()> {
        if !self.at_statement_end() {
            return Err(self.expected("';'"));
        }
        self.eat(TokenKind::Semi);
        Ok(())
    }

    // Statements

    fn statement(&mut self) -> Result<Stmt> {
        let start = self.location();
        let kind = match self.kind() {
            TokenKind::LBrace => StmtKind::Block(self.block()?),
            TokenKind::Semi => {
                self.bump();
                StmtKind::Empty
            }
            TokenKind::Keyword(Keyword::Var) => self.declaration(DeclKind::Var)?,
            TokenKind::Keyword(Keyword::Let) => self.declaration(DeclKind::Let)?,
            TokenKind::Keyword(Keyword::Const) => self.declaration(DeclKind::Const)?,
            TokenKind::Keyword(Keyword::Function) => StmtKind::Function(Box::new(self.function(true)?)),
            TokenKind::Keyword(Keyword::If) => self.if_statement()?,
            TokenKind::Keyword(Keyword::While) => self.while_statement()?,
            TokenKind::Keyword(Keyword::Return) => self.return_statement()?,
            TokenKind::Keyword(Keyword::Throw) => {
                self.bump();
                let value = self.expression()?;
                self.end_statement()?;
                StmtKind::Throw(value)
            }
            TokenKind::Keyword(Keyword::Try) => self.try_statement()?,
            TokenKind::Ident if matches!(self.text(), "break" | "continue") => self.jump_statement()?,
            _ => {
                let expr = self.expression()?;
                self.end_statement()?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn block(&mut self) -> Result<Block> {
        let start = self.location();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            if self.kind() == TokenKind::Eof {
                return Err(self.expected("'}'"));
            }
            stmts.push(self.statement()?);
        }
        Ok(Block { stmts, span: self.span_from(start) })
    }

    fn function_block(&mut self) -> Result<Block> {
        self.within(FUNCTION_BODY, Self::block)
    }

    fn declaration(&mut self, kind: DeclKind) -> Result<StmtKind> {
        self.bump();
        let mut declarators = Vec::new();
        loop {
            let name = self.identifier()?;
            let init = if self.eat(TokenKind::Eq) {
                Some(self.expression()?)
            } else if kind == DeclKind::Const {
                return Err(self.error("Missing initializer in const declaration", name.span.start));
            } else {
                None
            };
            declarators.push(Declarator { name, init });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.end_statement()?;
        Ok(StmtKind::Decl { kind, declarators })
    }

    /// `function name?(params) { body }`; declarations must be named
    fn function(&mut self, is_declaration: bool) -> Result<Function> {
        let start = self.location();
        self.expect(TokenKind::Keyword(Keyword::Function))?;
        let name = match self.kind() {
            TokenKind::Ident => Some(self.identifier()?),
            _ if is_declaration => return Err(self.expected("function name")),
            _ => None,
        };
        self.expect(TokenKind::LParen)?;
        let (params, rest) = self.params()?;
        let body = FunctionBody::Block(self.function_block()?);
        Ok(Function { name, params, rest, body, is_arrow: false, span: self.span_from(start) })
    }

    /// Parameters after `(`, through the closing `)`
    fn params(&mut self) -> Result<(Vec<Identifier>, Option<Identifier>)> {
        let mut params: Vec<Identifier> = Vec::new();
        let mut rest = None;
        while !self.eat(TokenKind::RParen) {
            if self.eat(TokenKind::Ellipsis) {
                rest = Some(self.identifier()?);
                self.expect(TokenKind::RParen)?;
                break;
            }
            let param = self.identifier()?;
            if params.iter().any(|p| p.name == param.name) {
                let message = format!("Duplicate parameter name '{}'", param.name);
                return Err(self.error(message, param.span.start));
            }
            params.push(param);
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok((params, rest))
    }

    /// Parenthesized condition of `if` and `while`
    fn condition(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;
        let cond = self.expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(cond)
    }

    fn if_statement(&mut self) -> Result<StmtKind> {
        self.bump();
        let cond = self.condition()?;
        let then = Box::new(self.statement()?);
        let otherwise = if self.eat(TokenKind::Keyword(Keyword::Else)) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(StmtKind::If { cond, then, otherwise })
    }

    fn while_statement(&mut self) -> Result<StmtKind> {
        self.bump();
        let cond = self.condition()?;
        let context = Context { in_loop: true, ..self.context };
        let body = Box::new(self.within(context, Self::statement)?);
        Ok(StmtKind::While { cond, body })
    }

    /// `break` and `continue` lex as identifiers; they are statements only
    /// inside a loop body
    fn jump_statement(&mut self) -> Result<StmtKind> {
        let start = self.location();
        let word = self.bump().text(self.source);
        if !self.context.in_loop {
            return Err(self.error(format!("Illegal {} statement", word), start));
        }
        self.end_statement()?;
        Ok(if word == "break" { StmtKind::Break } else { StmtKind::Continue })
    }

    fn return_statement(&mut self) -> Result<StmtKind> {
        let start = self.location();
        self.bump();
        if !self.context.in_function {
            return Err(self.error("Illegal return statement", start));
        }
        let value = if self.at_statement_end() { None } else { Some(self.expression()?) };
        self.end_statement()?;
        Ok(StmtKind::Return(value))
    }

    fn try_statement(&mut self) -> Result<StmtKind> {
        let start = self.location();
        self.bump();
        let body = self.block()?;
        let catch = if self.eat(TokenKind::Keyword(Keyword::Catch)) {
            let param = if self.eat(TokenKind::LParen) {
                let param = self.identifier()?;
                self.expect(TokenKind::RParen)?;
                Some(param)
            } else {
                None
            };
            Some(CatchClause { param, body: self.block()? })
        } else {
            None
        };
        let finally = if self.eat(TokenKind::Keyword(Keyword::Finally)) {
            Some(self.block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            return Err(self.error("Missing catch or finally after try", start));
        }
        Ok(StmtKind::Try { body, catch, finally })
    }

    // Expressions

    /// Assignment-level expression; there is no comma operator
    fn expression(&mut self) -> Result<Expr> {
        if self.arrow_ahead() {
            return self.arrow();
        }
        let start = self.location();
        let target = self.conditional()?;
        let op = match self.kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            _ => return Ok(target),
        };
        if !target.is_assignable() {
            return Err(self.error("Invalid left-hand side in assignment", start));
        }
        self.bump();
        let value = self.expression()?;
        let kind = ExprKind::Assign { op, target: Box::new(target), value: Box::new(value) };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// `name =>` or a balanced parenthesized list followed by `=>`
    fn arrow_ahead(&self) -> bool {
        match self.kind() {
            TokenKind::Ident => self.nth(1) == TokenKind::FatArrow,
            TokenKind::LParen => {
                let mut depth = 0usize;
                for (offset, token) in self.tokens[self.cursor..].iter().enumerate() {
                    match token.kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return self.nth(offset + 1) == TokenKind::FatArrow;
                            }
                        }
                        TokenKind::Eof => break,
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn arrow(&mut self) -> Result<Expr> {
        let start = self.location();
        let (params, rest) = if self.kind() == TokenKind::Ident {
            (vec![self.identifier()?], None)
        } else {
            self.expect(TokenKind::LParen)?;
            self.params()?
        };
        self.expect(TokenKind::FatArrow)?;
        let body = if self.kind() == TokenKind::LBrace {
            FunctionBody::Block(self.function_block()?)
        } else {
            FunctionBody::Expr(Box::new(self.within(FUNCTION_BODY, Self::expression)?))
        };
        let span = self.span_from(start);
        let function = Function { name: None, params, rest, body, is_arrow: true, span };
        Ok(Expr::new(ExprKind::Function(Box::new(function)), span))
    }

    fn conditional(&mut self) -> Result<Expr> {
        let start = self.location();
        let cond = self.binary(1)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then = self.expression()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.expression()?;
        let kind = ExprKind::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// Binary operators binding at least as tight as `min_precedence`
    fn binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let start = self.location();
        let mut left = self.unary()?;
        while let Some(op) = binary_op(self.kind()) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.bump();
            let right = self.binary(precedence + 1)?;
            let kind = ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) };
            left = Expr::new(kind, self.span_from(start));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr> {
        let start = self.location();
        let op = match self.kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Keyword(Keyword::TypeOf) => UnaryOp::TypeOf,
            TokenKind::Keyword(Keyword::Void) => UnaryOp::Void,
            _ => return self.postfix(),
        };
        self.bump();
        let operand = Box::new(self.unary()?);
        Ok(Expr::new(ExprKind::Unary { op, operand }, self.span_from(start)))
    }

    /// `new`, then any chain of calls, `.name`, and `[index]`. A call of
    /// the bare name `match` with one argument and a following `{` is a
    /// match expression.
    fn postfix(&mut self) -> Result<Expr> {
        let start = self.location();
        let mut expr = if self.eat(TokenKind::Keyword(Keyword::New)) {
            let callee = Box::new(self.member_chain()?);
            let args = if self.eat(TokenKind::LParen) { self.arguments()? } else { Vec::new() };
            Expr::new(ExprKind::New { callee, args }, self.span_from(start))
        } else {
            self.primary()?
        };
        loop {
            expr = match self.kind() {
                TokenKind::LParen => {
                    let names_match = matches!(&expr.kind, ExprKind::Ident(name) if name == "match");
                    self.bump();
                    let mut args = self.arguments()?;
                    let single = args.len() == 1 && !matches!(args[0].kind, ExprKind::Spread(_));
                    if names_match && single && self.kind() == TokenKind::LBrace {
                        if let Some(scrutinee) = args.pop() {
                            let parsed = PatternParser::new(self).parse_match_body(scrutinee, start)?;
                            return Ok(Expr::new(ExprKind::Match(Box::new(parsed)), self.span_from(start)));
                        }
                    }
                    Expr::new(ExprKind::Call { callee: Box::new(expr), args }, self.span_from(start))
                }
                TokenKind::Dot | TokenKind::LBracket => self.member(expr, start)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Callee of `new`: a primary with member suffixes but no calls
    fn member_chain(&mut self) -> Result<Expr> {
        let start = self.location();
        let mut expr = self.primary()?;
        while matches!(self.kind(), TokenKind::Dot | TokenKind::LBracket) {
            expr = self.member(expr, start)?;
        }
        Ok(expr)
    }

    fn member(&mut self, object: Expr, start: SourceLocation) -> Result<Expr> {
        let object = Box::new(object);
        let kind = if self.eat(TokenKind::Dot) {
            ExprKind::Member { object, property: self.property_name()? }
        } else {
            self.expect(TokenKind::LBracket)?;
            let index = Box::new(self.expression()?);
            self.expect(TokenKind::RBracket)?;
            ExprKind::Index { object, index }
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn primary(&mut self) -> Result<Expr> {
        let start = self.location();
        let kind = match self.kind() {
            TokenKind::Ident => ExprKind::Ident(self.bump().text(self.source).to_string()),
            kind if kind.is_literal() => ExprKind::Literal(self.literal()?),
            TokenKind::Keyword(Keyword::This) => {
                self.bump();
                ExprKind::This
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBracket => {
                self.bump();
                ExprKind::Array(self.list(TokenKind::RBracket, Self::spreadable)?)
            }
            TokenKind::LBrace => {
                self.bump();
                ExprKind::Object(self.list(TokenKind::RBrace, Self::object_member)?)
            }
            TokenKind::Keyword(Keyword::Function) => ExprKind::Function(Box::new(self.function(false)?)),
            TokenKind::Eof => return Err(self.error(messages::UNEXPECTED_END, start)),
            _ => return Err(self.expected("expression")),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// Number, bigint, string, boolean, or null token
    fn literal(&mut self) -> Result<Literal> {
        let token = self.token();
        let text = token.text(self.source);
        let invalid = |what: &str| self.error(format!("Invalid {}: {}", what, text), token.start);
        let value = match token.kind {
            TokenKind::Number => Literal::Number(literal::number(text).ok_or_else(|| invalid("number"))?),
            TokenKind::BigInt => Literal::BigInt(literal::bigint(text).ok_or_else(|| invalid("BigInt"))?),
            TokenKind::Str => Literal::String(literal::unescape(text)),
            TokenKind::Keyword(Keyword::True) => Literal::Bool(true),
            TokenKind::Keyword(Keyword::False) => Literal::Bool(false),
            TokenKind::Keyword(Keyword::Null) => Literal::Null,
            _ => return Err(self.expected("literal")),
        };
        self.bump();
        Ok(value)
    }

    /// Comma-separated items through `close`; a trailing comma is allowed
    fn list<T>(&mut self, close: TokenKind, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(item(self)?);
            if !self.eat(TokenKind::Comma) {
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    /// Call arguments after `(`, through the closing `)`
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        self.list(TokenKind::RParen, Self::spreadable)
    }

    /// An expression, or `...expr` in array literals and argument lists
    fn spreadable(&mut self) -> Result<Expr> {
        let start = self.location();
        if !self.eat(TokenKind::Ellipsis) {
            return self.expression();
        }
        let inner = Box::new(self.expression()?);
        Ok(Expr::new(ExprKind::Spread(inner), self.span_from(start)))
    }

    /// `key: value`, shorthand `key`, method `key() {}`, or `...spread`
    fn object_member(&mut self) -> Result<ObjectMember> {
        let start = self.location();
        if self.eat(TokenKind::Ellipsis) {
            return Ok(ObjectMember::Spread(self.expression()?));
        }
        let key = self.property_key()?;
        if self.eat(TokenKind::LParen) {
            let (params, rest) = self.params()?;
            let body = FunctionBody::Block(self.function_block()?);
            let span = self.span_from(start);
            let method = Function { name: None, params, rest, body, is_arrow: false, span };
            let value = Expr::new(ExprKind::Function(Box::new(method)), span);
            return Ok(ObjectMember::Property { key, value, shorthand: false });
        }
        if self.eat(TokenKind::Colon) {
            return Ok(ObjectMember::Property { key, value: self.expression()?, shorthand: false });
        }
        match &key {
            PropertyKey::Identifier(id) if Keyword::lookup(&id.name).is_none() => {
                let value = Expr::new(ExprKind::Ident(id.name.clone()), id.span);
                Ok(ObjectMember::Property { key, value, shorthand: true })
            }
            _ => Err(self.expected("':'")),
        }
    }

    /// Identifier name (keywords allowed), string, number, or `[expr]`
    fn property_key(&mut self) -> Result<PropertyKey> {
        let start = self.location();
        match self.kind() {
            TokenKind::Ident | TokenKind::Keyword(_) => Ok(PropertyKey::Identifier(self.property_name()?)),
            TokenKind::Str => Ok(PropertyKey::String(literal::unescape(self.bump().text(self.source)))),
            TokenKind::Number => {
                let text = self.bump().text(self.source);
                literal::number(text)
                    .map(PropertyKey::Number)
                    .ok_or_else(|| self.error(format!("Invalid number: {}", text), start))
            }
            TokenKind::LBracket => {
                self.bump();
                let expr = self.expression()?;
                self.expect(TokenKind::RBracket)?;
                Ok(PropertyKey::Computed(Box::new(expr)))
            }
            _ => Err(self.expected("property name")),
        }
    }

    fn identifier(&mut self) -> Result<Identifier> {
        if self.kind() != TokenKind::Ident {
            return Err(self.expected("identifier"));
        }
        self.property_name()
    }

    /// Identifier or keyword taken as a plain name, as after `.`
    fn property_name(&mut self) -> Result<Identifier> {
        if !matches!(self.kind(), TokenKind::Ident | TokenKind::Keyword(_)) {
            return Err(self.expected("property name"));
        }
        let start = self.location();
        let name = self.bump().text(self.source).to_string();
        Ok(Identifier::new(name, self.span_from(start)))
    }
}

impl ClauseSource for Parser<'_> {
    fn current_kind(&self) -> TokenKind {
        self.kind()
    }

    fn kind_at(&self, offset: usize) -> TokenKind {
        self.nth(offset)
    }

    fn current_text(&self) -> &str {
        self.text()
    }

    fn current_location(&self) -> SourceLocation {
        self.location()
    }

    fn last_end(&self) -> SourceLocation {
        self.prev_end()
    }

    fn bump(&mut self) {
        Parser::bump(self);
    }

    fn expression(&mut self) -> Result<Expr> {
        Parser::expression(self)
    }

    fn literal(&mut self) -> Result<Literal> {
        Parser::literal(self)
    }

    fn property_key(&mut self) -> Result<PropertyKey> {
        Parser::property_key(self)
    }

    fn clause_block(&mut self) -> Result<Block> {
        self.function_block()
    }

    fn syntax_error(&self, message: &str, location: SourceLocation) -> Error {
        self.error(message, location)
    }

    fn expected(&self, what: &str) -> Error {
        Parser::expected(self, what)
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::EqEq => BinaryOp::LooseEq,
        TokenKind::NotEq => BinaryOp::LooseNotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::NotEqEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Keyword(Keyword::In) => BinaryOp::In,
        TokenKind::Keyword(Keyword::InstanceOf) => BinaryOp::InstanceOf,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::QuestionQuestion => BinaryOp::Coalesce,
        _ => return None,
    };
    Some(op)
}

/// Parse a whole source file
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source)?.parse_program()
}

/// Parse a single expression that must span the whole input
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = Parser::expression(&mut parser)?;
    if parser.kind() != TokenKind::Eof {
        return Err(parser.expected("end of input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> ExprKind {
        parse_expression(source).unwrap().kind
    }

    fn first_stmt(source: &str) -> StmtKind {
        parse(source).unwrap().body.remove(0).kind
    }

    #[test]
    fn test_statement_count_with_asi() {
        assert_eq!(parse("42;").unwrap().body.len(), 1);
        assert_eq!(parse("true; false; null").unwrap().body.len(), 3);
        assert_eq!(parse("let a = 1\nlet b = 2\na + b").unwrap().body.len(), 3);
        assert!(parse("let a = 1 let b = 2").is_err());
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        match expr("1 + 2 * 3") {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Add);
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        match expr("a || b && c") {
            ExprKind::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Or);
                assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::And, .. }));
            }
            other => panic!("Expected logical expression, got {:?}", other),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        match expr("a - b - c") {
            ExprKind::Binary { left, .. } => {
                assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
            }
            other => panic!("Expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_declaration() {
        match first_stmt("let x = 1, y;") {
            StmtKind::Decl { kind, declarators } => {
                assert_eq!(kind, DeclKind::Let);
                assert_eq!(declarators.len(), 2);
                assert_eq!(declarators[0].name.name, "x");
                assert!(declarators[1].init.is_none());
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
        assert!(parse("const x;").is_err());
    }

    #[test]
    fn test_function_declaration() {
        match first_stmt("function foo(a, b) { return a + b; }") {
            StmtKind::Function(f) => {
                assert_eq!(f.name.unwrap().name, "foo");
                assert_eq!(f.params.len(), 2);
                assert!(!f.is_arrow);
            }
            other => panic!("Expected function declaration, got {:?}", other),
        }
        assert!(parse("function (a) {}").is_err());
        assert!(parse("function f(a, a) {}").is_err());
    }

    #[test]
    fn test_arrow_function() {
        match expr("(x, ...rest) => x * 2") {
            ExprKind::Function(f) => {
                assert!(f.name.is_none());
                assert!(f.is_arrow);
                assert_eq!(f.rest.unwrap().name, "rest");
                assert!(matches!(f.body, FunctionBody::Expr(_)));
            }
            other => panic!("Expected arrow function, got {:?}", other),
        }
        assert!(matches!(expr("x => { return x; }"), ExprKind::Function(f) if f.is_arrow));
    }

    #[test]
    fn test_parenthesized_is_not_arrow() {
        assert!(matches!(expr("(1 + 2) * 3"), ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_assignment_targets() {
        assert!(matches!(expr("a.b += 1"), ExprKind::Assign { op: AssignOp::AddAssign, .. }));
        assert!(matches!(expr("(a) = 1"), ExprKind::Assign { .. }));
        assert!(parse_expression("1 = 2").is_err());
        assert!(parse_expression("f() = 2").is_err());
    }

    #[test]
    fn test_if_else() {
        match first_stmt("if (x) { y; } else z;") {
            StmtKind::If { otherwise, .. } => assert!(otherwise.is_some()),
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_return_needs_function() {
        assert!(parse("return 1;").is_err());
        assert!(parse("function f() { return }").is_ok());
        match first_stmt("function f() { return\n1 }") {
            StmtKind::Function(f) => match f.body {
                FunctionBody::Block(b) => assert!(matches!(b.stmts[0].kind, StmtKind::Return(None))),
                other => panic!("Expected block body, got {:?}", other),
            },
            other => panic!("Expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_jumps_need_loop() {
        assert!(parse("break;").is_err());
        assert!(parse("while (true) { if (x) continue; break; }").is_ok());
        assert!(parse("while (true) { function f() { break; } }").is_err());
        assert!(parse("let brk = x => { while (x) break }").is_ok());
    }

    #[test]
    fn test_try_needs_handler() {
        assert!(parse("try { a(); }").is_err());
        assert!(parse("try { a(); } finally { b(); }").is_ok());
        match first_stmt("try { a(); } catch { b(); }") {
            StmtKind::Try { catch, .. } => assert!(catch.unwrap().param.is_none()),
            other => panic!("Expected try statement, got {:?}", other),
        }
    }

    #[test]
    fn test_object_literal_forms() {
        match expr("({ a, 'b': 1, 2: 3, [k]: 4, m() { return 1; }, if: 5, ...o })") {
            ExprKind::Paren(inner) => match inner.kind {
                ExprKind::Object(members) => {
                    assert_eq!(members.len(), 7);
                    assert!(matches!(members[0], ObjectMember::Property { shorthand: true, .. }));
                    assert!(matches!(members[6], ObjectMember::Spread(_)));
                }
                other => panic!("Expected object literal, got {:?}", other),
            },
            other => panic!("Expected parenthesized expression, got {:?}", other),
        }
        assert!(parse_expression("({ if })").is_err());
    }

    #[test]
    fn test_keyword_after_dot() {
        match expr("a.new.if") {
            ExprKind::Member { property, .. } => assert_eq!(property.name, "if"),
            other => panic!("Expected member access, got {:?}", other),
        }
    }

    #[test]
    fn test_new_with_member_callee() {
        match expr("new a.B(1)") {
            ExprKind::New { callee, args } => {
                assert!(matches!(callee.kind, ExprKind::Member { .. }));
                assert_eq!(args.len(), 1);
            }
            other => panic!("Expected new expression, got {:?}", other),
        }
    }

    #[test]
    fn test_match_call_without_brace_is_a_call() {
        assert!(matches!(expr("match(x)"), ExprKind::Call { .. }));
        assert!(matches!(expr("match(...xs)"), ExprKind::Call { .. }));
    }

    #[test]
    fn test_match_with_brace_is_a_match() {
        match expr("match (x) { 1: 'one', else: 'other' }") {
            ExprKind::Match(m) => assert_eq!(m.clauses.len(), 2),
            other => panic!("Expected match expression, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_values() {
        assert!(matches!(expr("0x10"), ExprKind::Literal(Literal::Number(n)) if n == 16.0));
        assert!(matches!(expr("0x10n"), ExprKind::Literal(Literal::BigInt(ref d)) if d == "16"));
        assert!(matches!(expr(r"'a\tb'"), ExprKind::Literal(Literal::String(ref s)) if s == "a\tb"));
        assert!(parse_expression("0x").is_err());
    }

    #[test]
    fn test_trailing_input_rejected() {
        let err = parse_expression("a b").unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn test_error_position() {
        match parse("let x = ;").unwrap_err() {
            Error::ParseError { location, .. } => {
                assert_eq!(location.line, 1);
                assert_eq!(location.column, 9);
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }
}
