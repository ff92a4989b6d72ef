//! Token kinds and the punctuator table

use crate::error::SourceLocation;
use std::fmt;

/// One lexeme. The text is recovered by slicing the source between
/// `start.offset` and `end.offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Token {
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start.offset..self.end.offset]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword(Keyword),
    Number,
    /// Integer with an `n` suffix
    BigInt,
    /// Quoted string, escapes still encoded
    Str,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Ellipsis,
    Semi,
    Comma,
    Colon,
    Question,
    FatArrow,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    AndAnd,
    OrOr,
    QuestionQuestion,

    Eq,
    PlusEq,
    MinusEq,

    Eof,
}

/// Operator and punctuation spellings, longest first so the first prefix
/// match is the maximal munch
pub(crate) const PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::NotEqEq),
    ("...", TokenKind::Ellipsis),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("??", TokenKind::QuestionQuestion),
    ("=>", TokenKind::FatArrow),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (".", TokenKind::Dot),
    (";", TokenKind::Semi),
    (",", TokenKind::Comma),
    (":", TokenKind::Colon),
    ("?", TokenKind::Question),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
];

impl TokenKind {
    /// Whether this token can begin a pattern or expression literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::BigInt
                | TokenKind::Str
                | TokenKind::Keyword(Keyword::True | Keyword::False | Keyword::Null)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => f.write_str("identifier"),
            TokenKind::Keyword(k) => f.write_str(k.as_str()),
            TokenKind::Number => f.write_str("number"),
            TokenKind::BigInt => f.write_str("bigint"),
            TokenKind::Str => f.write_str("string"),
            TokenKind::Eof => f.write_str("end of input"),
            punct => match PUNCTUATORS.iter().find(|(_, kind)| kind == punct) {
                Some((spelling, _)) => write!(f, "'{}'", spelling),
                None => write!(f, "{:?}", punct),
            },
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// Reserved words. `match`, `break`, and `continue` are contextual and
        /// lex as identifiers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub fn lookup(text: &str) -> Option<Keyword> {
                match text {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Catch => "catch",
    Const => "const",
    Else => "else",
    False => "false",
    Finally => "finally",
    Function => "function",
    If => "if",
    In => "in",
    InstanceOf => "instanceof",
    Let => "let",
    New => "new",
    Null => "null",
    Return => "return",
    This => "this",
    Throw => "throw",
    True => "true",
    Try => "try",
    TypeOf => "typeof",
    Var => "var",
    Void => "void",
    While => "while",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuators_are_longest_first() {
        for (i, (later, _)) in PUNCTUATORS.iter().enumerate() {
            for (earlier, _) in &PUNCTUATORS[..i] {
                assert!(!later.starts_with(*earlier), "{} is shadowed by {}", later, earlier);
            }
        }
    }

    #[test]
    fn test_keyword_round_trip() {
        assert_eq!(Keyword::lookup("instanceof"), Some(Keyword::InstanceOf));
        assert_eq!(Keyword::InstanceOf.as_str(), "instanceof");
        assert_eq!(Keyword::lookup("match"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Colon.to_string(), "':'");
        assert_eq!(TokenKind::Keyword(Keyword::Else).to_string(), "else");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
