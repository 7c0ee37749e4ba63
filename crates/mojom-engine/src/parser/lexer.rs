//! Lexer for mojom source.
//!
//! Built on the logos library. Produces a token stream with line/column
//! information for diagnostics.

use crate::parser::token::{Span, Token};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// Converted to the public [`Token`] enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("module")]
    Module,

    #[token("import")]
    Import,

    #[token("struct")]
    Struct,

    #[token("union")]
    Union,

    #[token("enum")]
    Enum,

    #[token("interface")]
    Interface,

    #[token("const")]
    Const,

    #[token("array")]
    Array,

    #[token("map")]
    Map,

    #[token("handle")]
    Handle,

    #[token("associated")]
    Associated,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("default")]
    Default,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"0[xX][0-9a-fA-F]+", parse_hex)]
    #[regex(r"[0-9]+", parse_int)]
    IntLiteral(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    FloatLiteral(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    StringLiteral(String),

    #[regex(r"@[0-9]+", parse_ordinal)]
    Ordinal(u32),

    #[token("=>")]
    ResponseArrow,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Equal,

    #[token("?")]
    Question,

    #[token("&")]
    Amp,

    #[token("-")]
    Minus,
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::FilterResult<(), ()> {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => logos::FilterResult::Error(()),
    }
}

fn parse_hex(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    i64::from_str_radix(&lex.slice()[2..], 16).ok()
}

fn parse_int(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    lex.slice().parse().ok()
}

fn parse_float(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn parse_ordinal(lex: &mut logos::Lexer<LogosToken>) -> Option<u32> {
    lex.slice()[1..].parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    Some(unescape_string(&s[1..s.len() - 1]))
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some(c) => result.push(c),
                None => break,
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Lexer error.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    InvalidNumber { text: String, span: Span },
    /// `/*` with no closing `*/`
    UnterminatedComment { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::UnterminatedComment { span } => *span,
        }
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Tokenize the whole input. Stops at the first invalid token.
    pub fn tokenize(self) -> Result<Vec<(Token, Span)>, LexError> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut tokens = Vec::new();
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();
            advance(&self.source[last_end..range.start], &mut line, &mut column);
            let span = Span::new(range.start, range.end, line, column);

            match token_result {
                Ok(logos_token) => tokens.push((convert_token(logos_token), span)),
                Err(()) => {
                    let text = &self.source[range.start..range.end];
                    let first = text.chars().next().unwrap_or('\0');
                    return Err(if text.starts_with("/*") {
                        LexError::UnterminatedComment { span }
                    } else if first.is_ascii_digit() || first == '@' {
                        LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        }
                    } else {
                        LexError::UnexpectedCharacter { char: first, span }
                    });
                }
            }

            advance(&self.source[range.start..range.end], &mut line, &mut column);
            last_end = range.end;
        }

        advance(&self.source[last_end..], &mut line, &mut column);
        let eof = Span::new(self.source.len(), self.source.len(), line, column);
        tokens.push((Token::Eof, eof));
        Ok(tokens)
    }
}

fn advance(text: &str, line: &mut u32, column: &mut u32) {
    for c in text.chars() {
        if c == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

fn convert_token(token: LogosToken) -> Token {
    match token {
        LogosToken::Module => Token::Module,
        LogosToken::Import => Token::Import,
        LogosToken::Struct => Token::Struct,
        LogosToken::Union => Token::Union,
        LogosToken::Enum => Token::Enum,
        LogosToken::Interface => Token::Interface,
        LogosToken::Const => Token::Const,
        LogosToken::Array => Token::Array,
        LogosToken::Map => Token::Map,
        LogosToken::Handle => Token::Handle,
        LogosToken::Associated => Token::Associated,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Default => Token::Default,
        LogosToken::Identifier(name) => Token::Identifier(name),
        LogosToken::IntLiteral(n) => Token::IntLiteral(n),
        LogosToken::FloatLiteral(n) => Token::FloatLiteral(n),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::Ordinal(n) => Token::Ordinal(n),
        LogosToken::ResponseArrow => Token::ResponseArrow,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Dot => Token::Dot,
        LogosToken::Equal => Token::Equal,
        LogosToken::Question => Token::Question,
        LogosToken::Amp => Token::Amp,
        LogosToken::Minus => Token::Minus,
        // Skipped variants never reach conversion
        LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment => Token::Eof,
    }
}
