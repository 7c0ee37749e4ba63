//! Token definitions for mojom source.

use std::fmt;

/// A token in mojom source.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Module,
    Import,
    Struct,
    Union,
    Enum,
    Interface,
    Const,
    Array,
    Map,
    Handle,
    Associated,
    True,
    False,
    Default,

    // Literals
    Identifier(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    /// `@N` ordinal
    Ordinal(u32),

    // Punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Less,
    Greater,
    Semicolon,
    Comma,
    Dot,
    Equal,
    Question,
    Amp,
    Minus,
    /// `=>`
    ResponseArrow,

    Eof,
}

/// Source location of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Module => write!(f, "module"),
            Token::Import => write!(f, "import"),
            Token::Struct => write!(f, "struct"),
            Token::Union => write!(f, "union"),
            Token::Enum => write!(f, "enum"),
            Token::Interface => write!(f, "interface"),
            Token::Const => write!(f, "const"),
            Token::Array => write!(f, "array"),
            Token::Map => write!(f, "map"),
            Token::Handle => write!(f, "handle"),
            Token::Associated => write!(f, "associated"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Default => write!(f, "default"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::FloatLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s),
            Token::Ordinal(n) => write!(f, "@{}", n),
            Token::LeftBrace => write!(f, "'{{'"),
            Token::RightBrace => write!(f, "'}}'"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::LeftBracket => write!(f, "'['"),
            Token::RightBracket => write!(f, "']'"),
            Token::Less => write!(f, "'<'"),
            Token::Greater => write!(f, "'>'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Equal => write!(f, "'='"),
            Token::Question => write!(f, "'?'"),
            Token::Amp => write!(f, "'&'"),
            Token::Minus => write!(f, "'-'"),
            Token::ResponseArrow => write!(f, "'=>'"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
