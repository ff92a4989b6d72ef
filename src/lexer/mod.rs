//! Tokenizer for host source
//!
//! Whitespace and `//` / `/* */` comments are skipped. Literal tokens keep
//! their raw spelling; the parser decodes numbers and string escapes.

mod token;

pub use token::{Keyword, Token, TokenKind};

use crate::error::{Error, Result, SourceLocation};
use token::PUNCTUATORS;
use unicode_xid::UnicodeXID;

pub struct Lexer<'src> {
    source: &'src str,
    pos: SourceLocation,
}

fn starts_identifier(c: char) -> bool {
    matches!(c, '_' | '$') || c.is_xid_start()
}

fn continues_identifier(c: char) -> bool {
    matches!(c, '_' | '$') || c.is_xid_continue()
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            pos: SourceLocation { line: 1, column: 1, offset: 0 },
        }
    }

    /// All tokens of the source, ending with exactly one `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let start = self.pos;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) if starts_identifier(c) => {
                self.bump_while(continues_identifier);
                let word = &self.source[start.offset..self.pos.offset];
                Keyword::lookup(word).map_or(TokenKind::Ident, TokenKind::Keyword)
            }
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => self.number(),
            Some(quote @ ('"' | '\'')) => self.string(quote)?,
            Some(c) => {
                let source = self.source;
                let rest = &source[start.offset..];
                let Some(&(spelling, kind)) = PUNCTUATORS.iter().find(|(p, _)| rest.starts_with(*p)) else {
                    return Err(self.error(format!("Unexpected character '{}'", c), start));
                };
                for _ in spelling.chars() {
                    self.bump();
                }
                kind
            }
        };
        Ok(Token { kind, start, end: self.pos })
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.pos.offset..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn bump_if(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let hit = self.peek().is_some_and(pred);
        if hit {
            self.bump();
        }
        hit
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            self.bump_while(char::is_whitespace);
            let source = self.source;
            let rest = &source[self.pos.offset..];
            if rest.starts_with("//") {
                self.bump_while(|c| c != '\n');
            } else if rest.starts_with("/*") {
                let start = self.pos;
                match rest[2..].find("*/") {
                    Some(len) => {
                        for _ in rest[..len + 4].chars() {
                            self.bump();
                        }
                    }
                    None => return Err(self.error("Unterminated comment", start)),
                }
            } else {
                return Ok(());
            }
        }
    }

    /// Decimal, hex, octal, or binary number, optionally a bigint. Digits
    /// may be separated by `_`.
    fn number(&mut self) -> TokenKind {
        let radix_prefixed = self.peek() == Some('0')
            && matches!(self.peek_second(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        if radix_prefixed {
            self.bump();
            self.bump();
            self.bump_while(|c| c.is_ascii_alphanumeric() && c != 'n' || c == '_');
        } else {
            self.bump_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('n') {
                self.bump();
                return TokenKind::BigInt;
            }
            if self.peek() == Some('.') && self.peek_second().map_or(true, |c| c.is_ascii_digit()) {
                self.bump();
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
            }
            if self.bump_if(|c| matches!(c, 'e' | 'E')) {
                self.bump_if(|c| matches!(c, '+' | '-'));
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
        if self.bump_if(|c| c == 'n') {
            TokenKind::BigInt
        } else {
            TokenKind::Number
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(TokenKind::Str),
                Some('\\') => {
                    self.bump();
                }
                None | Some('\n' | '\r') => {
                    return Err(self.error("Unterminated string literal", start));
                }
                Some(_) => {}
            }
        }
    }

    fn error(&self, message: impl Into<String>, at: SourceLocation) -> Error {
        Error::lexer_error_with_context(message, at, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text(source)))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds("  // nothing\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_contextual_words_are_identifiers() {
        assert_eq!(
            lex("match break $el _x else"),
            vec![
                (TokenKind::Ident, "match"),
                (TokenKind::Ident, "break"),
                (TokenKind::Ident, "$el"),
                (TokenKind::Ident, "_x"),
                (TokenKind::Keyword(Keyword::Else), "else"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_number_spellings() {
        let tokens = lex("42 3.14 0xFF 0b1010 1_000 1e10 .5 123n 0x1Fn");
        let texts: Vec<&str> = tokens.iter().map(|(_, text)| *text).collect();
        assert_eq!(texts, vec!["42", "3.14", "0xFF", "0b1010", "1_000", "1e10", ".5", "123n", "0x1Fn", ""]);
        assert_eq!(tokens[7].0, TokenKind::BigInt);
        assert_eq!(tokens[8].0, TokenKind::BigInt);
        assert_eq!(tokens[2].0, TokenKind::Number);
    }

    #[test]
    fn test_member_access_on_number_keeps_dot() {
        assert_eq!(
            kinds("a[0].b"),
            vec![
                TokenKind::Ident,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_raw_text() {
        let tokens = lex(r#""a\"b" 'c'"#);
        assert_eq!(tokens[0], (TokenKind::Str, r#""a\"b""#));
        assert_eq!(tokens[1], (TokenKind::Str, "'c'"));
    }

    #[test]
    fn test_unterminated_input() {
        assert!(matches!(Lexer::new("'abc").tokenize(), Err(Error::LexerError { .. })));
        assert!(matches!(Lexer::new("/* abc").tokenize(), Err(Error::LexerError { .. })));
        assert!(matches!(Lexer::new("a # b").tokenize(), Err(Error::LexerError { .. })));
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("a===b !== c ...d => ?? ?. -="),
            vec![
                TokenKind::Ident,
                TokenKind::EqEqEq,
                TokenKind::Ident,
                TokenKind::NotEqEq,
                TokenKind::Ident,
                TokenKind::Ellipsis,
                TokenKind::Ident,
                TokenKind::FatArrow,
                TokenKind::QuestionQuestion,
                TokenKind::Question,
                TokenKind::Dot,
                TokenKind::MinusEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_pattern_punctuation() {
        assert_eq!(
            kinds("{ a, ...rest }: [x, ...]"),
            vec![
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ellipsis,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_locations_track_lines() {
        let tokens = Lexer::new("a /* x\n y */ b\n  c").tokenize().unwrap();
        assert_eq!((tokens[1].start.line, tokens[1].start.column), (2, 7));
        assert_eq!((tokens[2].start.line, tokens[2].start.column), (3, 3));
        assert_eq!(tokens[2].end.offset, 18);
    }
}
