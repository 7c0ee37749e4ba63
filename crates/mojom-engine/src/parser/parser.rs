//! Recursive descent parser for mojom source.
//!
//! Transforms the token stream from the lexer into a [`MojomFile`]. Parsing
//! stops at the first error.

use std::fmt;
use std::mem;

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::token::{Span, Token};

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// File label passed to [`parse`]
    pub filename: String,
    /// Source location of the error
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: Error: {}",
            self.filename, self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse `source` into a syntax tree. `filename` labels diagnostics.
pub fn parse(source: &str, filename: &str) -> Result<MojomFile, ParseError> {
    Parser::new(source, filename)?.parse()
}

/// Parser state.
pub struct Parser {
    filename: String,
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    /// Create a new parser, tokenizing the whole input first.
    pub fn new(source: &str, filename: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize().map_err(|e| {
            let message = match &e {
                LexError::UnexpectedCharacter { char, .. } => {
                    format!("Unexpected character '{}'", char)
                }
                LexError::InvalidNumber { text, .. } => format!("Invalid number '{}'", text),
                LexError::UnterminatedComment { .. } => "Unterminated comment".to_string(),
            };
            ParseError {
                filename: filename.to_string(),
                span: e.span(),
                message,
            }
        })?;

        Ok(Self {
            filename: filename.to_string(),
            tokens,
            pos: 0,
        })
    }

    /// Parse the entire file.
    pub fn parse(mut self) -> Result<MojomFile, ParseError> {
        let mut module: Option<ModuleDecl> = None;
        let mut imports = Vec::new();
        let mut definitions = Vec::new();

        while !self.at_eof() {
            let attributes = self.parse_attributes()?;
            let span = self.current_span();
            match self.current() {
                Token::Module => {
                    if module.is_some() {
                        return Err(self.error_at(span, "Multiple \"module\" statements"));
                    }
                    if !imports.is_empty() || !definitions.is_empty() {
                        return Err(self.error_at(
                            span,
                            "\"module\" statements must precede imports and definitions",
                        ));
                    }
                    self.advance();
                    let name = self.parse_name()?;
                    self.expect(Token::Semicolon)?;
                    module = Some(ModuleDecl {
                        attributes,
                        name,
                        span,
                    });
                }
                Token::Import => {
                    if !definitions.is_empty() {
                        return Err(
                            self.error_at(span, "Imports must precede all definitions")
                        );
                    }
                    self.advance();
                    let filename = self.expect_string()?;
                    self.expect(Token::Semicolon)?;
                    imports.push(ImportDecl { filename, span });
                }
                Token::Struct => definitions.push(Definition::Struct(self.parse_struct(attributes)?)),
                Token::Union => definitions.push(Definition::Union(self.parse_union(attributes)?)),
                Token::Enum => definitions.push(Definition::Enum(self.parse_enum(attributes)?)),
                Token::Interface => {
                    definitions.push(Definition::Interface(self.parse_interface(attributes)?))
                }
                Token::Const => definitions.push(Definition::Const(self.parse_const(attributes)?)),
                other => {
                    let message = format!("Unexpected {}", other);
                    return Err(self.error_at(span, &message));
                }
            }
        }

        Ok(MojomFile {
            filename: self.filename,
            module,
            imports,
            definitions,
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Check the current token's kind, ignoring any payload.
    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<Span, ParseError> {
        let span = self.current_span();
        if self.check(&token) {
            self.advance();
            Ok(span)
        } else {
            let message = format!("Expected {}, found {}", token, self.current());
            Err(self.error_at(span, &message))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => {
                let message = format!("Expected identifier, found {}", other);
                Err(self.error_at(self.current_span(), &message))
            }
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current().clone() {
            Token::StringLiteral(value) => {
                self.advance();
                Ok(value)
            }
            other => {
                let message = format!("Expected string literal, found {}", other);
                Err(self.error_at(self.current_span(), &message))
            }
        }
    }

    fn eat_ordinal(&mut self) -> Option<u32> {
        match self.current() {
            Token::Ordinal(n) => {
                let n = *n;
                self.advance();
                Some(n)
            }
            _ => None,
        }
    }

    fn error_at(&self, span: Span, message: &str) -> ParseError {
        ParseError {
            filename: self.filename.clone(),
            span,
            message: message.to_string(),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Parse an optional `[Key, Key=Value, ...]` list.
    fn parse_attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        if !self.eat(&Token::LeftBracket) {
            return Ok(attributes);
        }
        if self.eat(&Token::RightBracket) {
            return Ok(attributes);
        }
        loop {
            let key = self.expect_identifier()?;
            let value = if self.eat(&Token::Equal) {
                Some(self.parse_literal()?)
            } else {
                None
            };
            attributes.push(Attribute { key, value });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightBracket)?;
        Ok(attributes)
    }

    /// Parse a dotted name such as `foo.bar.Baz`.
    fn parse_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    fn parse_struct(&mut self, attributes: Vec<Attribute>) -> Result<StructDecl, ParseError> {
        let span = self.expect(Token::Struct)?;
        let name = self.expect_identifier()?;
        let mut decl = StructDecl {
            attributes,
            name,
            fields: Vec::new(),
            enums: Vec::new(),
            constants: Vec::new(),
            span,
        };

        self.expect(Token::LeftBrace)?;
        while !self.check(&Token::RightBrace) {
            let attributes = self.parse_attributes()?;
            match self.current() {
                Token::Enum => decl.enums.push(self.parse_enum(attributes)?),
                Token::Const => decl.constants.push(self.parse_const(attributes)?),
                _ => decl.fields.push(self.parse_field(attributes, true)?),
            }
        }
        self.expect(Token::RightBrace)?;
        self.expect(Token::Semicolon)?;
        Ok(decl)
    }

    fn parse_union(&mut self, attributes: Vec<Attribute>) -> Result<UnionDecl, ParseError> {
        let span = self.expect(Token::Union)?;
        let name = self.expect_identifier()?;
        let mut fields = Vec::new();

        self.expect(Token::LeftBrace)?;
        while !self.check(&Token::RightBrace) {
            let attributes = self.parse_attributes()?;
            fields.push(self.parse_field(attributes, false)?);
        }
        self.expect(Token::RightBrace)?;
        self.expect(Token::Semicolon)?;
        Ok(UnionDecl {
            attributes,
            name,
            fields,
            span,
        })
    }

    fn parse_field(
        &mut self,
        attributes: Vec<Attribute>,
        allow_default: bool,
    ) -> Result<FieldDecl, ParseError> {
        let typename = self.parse_type()?;
        let name = self.expect_identifier()?;
        let ordinal = self.eat_ordinal();
        let default = if allow_default && self.eat(&Token::Equal) {
            Some(self.parse_literal()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        Ok(FieldDecl {
            attributes,
            typename,
            name,
            ordinal,
            default,
        })
    }

    fn parse_enum(&mut self, attributes: Vec<Attribute>) -> Result<EnumDecl, ParseError> {
        let span = self.expect(Token::Enum)?;
        let name = self.expect_identifier()?;
        let mut values = Vec::new();

        self.expect(Token::LeftBrace)?;
        while !self.check(&Token::RightBrace) {
            let attributes = self.parse_attributes()?;
            let name = self.expect_identifier()?;
            let value = if self.eat(&Token::Equal) {
                Some(self.parse_literal()?)
            } else {
                None
            };
            values.push(EnumValueDecl {
                attributes,
                name,
                value,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightBrace)?;
        self.expect(Token::Semicolon)?;
        Ok(EnumDecl {
            attributes,
            name,
            values,
            span,
        })
    }

    fn parse_interface(
        &mut self,
        attributes: Vec<Attribute>,
    ) -> Result<InterfaceDecl, ParseError> {
        let span = self.expect(Token::Interface)?;
        let name = self.expect_identifier()?;
        let mut decl = InterfaceDecl {
            attributes,
            name,
            methods: Vec::new(),
            enums: Vec::new(),
            constants: Vec::new(),
            span,
        };

        self.expect(Token::LeftBrace)?;
        while !self.check(&Token::RightBrace) {
            let attributes = self.parse_attributes()?;
            match self.current() {
                Token::Enum => decl.enums.push(self.parse_enum(attributes)?),
                Token::Const => decl.constants.push(self.parse_const(attributes)?),
                _ => decl.methods.push(self.parse_method(attributes)?),
            }
        }
        self.expect(Token::RightBrace)?;
        self.expect(Token::Semicolon)?;
        Ok(decl)
    }

    fn parse_method(&mut self, attributes: Vec<Attribute>) -> Result<MethodDecl, ParseError> {
        let name = self.expect_identifier()?;
        let ordinal = self.eat_ordinal();
        let parameters = self.parse_parameters()?;
        let response = if self.eat(&Token::ResponseArrow) {
            Some(self.parse_parameters()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        Ok(MethodDecl {
            attributes,
            name,
            ordinal,
            parameters,
            response,
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<ParameterDecl>, ParseError> {
        let mut parameters = Vec::new();
        self.expect(Token::LeftParen)?;
        if self.eat(&Token::RightParen) {
            return Ok(parameters);
        }
        loop {
            let attributes = self.parse_attributes()?;
            let typename = self.parse_type()?;
            let name = self.expect_identifier()?;
            let ordinal = self.eat_ordinal();
            parameters.push(ParameterDecl {
                attributes,
                typename,
                name,
                ordinal,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightParen)?;
        Ok(parameters)
    }

    fn parse_const(&mut self, attributes: Vec<Attribute>) -> Result<ConstDecl, ParseError> {
        self.expect(Token::Const)?;
        let typename = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.expect(Token::Equal)?;
        let value = self.parse_literal()?;
        self.expect(Token::Semicolon)?;
        Ok(ConstDecl {
            attributes,
            typename,
            name,
            value,
        })
    }

    // ========================================================================
    // Types and literals
    // ========================================================================

    fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let base = self.parse_base_type()?;
        if self.eat(&Token::Question) {
            Ok(TypeRef::Nullable(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    fn parse_base_type(&mut self) -> Result<TypeRef, ParseError> {
        match self.current() {
            Token::Array => {
                self.advance();
                self.expect(Token::Less)?;
                let element = self.parse_type()?;
                let fixed_size = if self.eat(&Token::Comma) {
                    let span = self.current_span();
                    match self.advance() {
                        Token::IntLiteral(n) if n > 0 => Some(n as u64),
                        other => {
                            let message =
                                format!("Expected positive array size, found {}", other);
                            return Err(self.error_at(span, &message));
                        }
                    }
                } else {
                    None
                };
                self.expect(Token::Greater)?;
                Ok(TypeRef::Array {
                    element: Box::new(element),
                    fixed_size,
                })
            }
            Token::Map => {
                self.advance();
                self.expect(Token::Less)?;
                let key = self.parse_type()?;
                self.expect(Token::Comma)?;
                let value = self.parse_type()?;
                self.expect(Token::Greater)?;
                Ok(TypeRef::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            Token::Handle => {
                self.advance();
                if self.eat(&Token::Less) {
                    let kind = self.expect_identifier()?;
                    self.expect(Token::Greater)?;
                    Ok(TypeRef::Handle(Some(kind)))
                } else {
                    Ok(TypeRef::Handle(None))
                }
            }
            Token::Associated => {
                self.advance();
                let inner = self.parse_base_type()?;
                Ok(TypeRef::Associated(Box::new(inner)))
            }
            _ => {
                let name = self.parse_name()?;
                if self.eat(&Token::Amp) {
                    Ok(TypeRef::InterfaceRequest(name))
                } else {
                    Ok(TypeRef::Named(name))
                }
            }
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let span = self.current_span();
        let negative = self.eat(&Token::Minus);
        let literal = match self.advance() {
            Token::IntLiteral(n) => Literal::Int(if negative { -n } else { n }),
            Token::FloatLiteral(n) => Literal::Float(if negative { -n } else { n }),
            Token::StringLiteral(s) if !negative => Literal::String(s),
            Token::True if !negative => Literal::Bool(true),
            Token::False if !negative => Literal::Bool(false),
            Token::Default if !negative => Literal::Default,
            Token::Identifier(first) if !negative => {
                let mut name = first;
                while self.eat(&Token::Dot) {
                    name.push('.');
                    name.push_str(&self.expect_identifier()?);
                }
                Literal::Name(name)
            }
            other => {
                let message = format!("Expected value, found {}", other);
                return Err(self.error_at(span, &message));
            }
        };
        Ok(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_and_imports() {
        let source = r#"
            module sample.service;
            import "sample/types.mojom";
            import "other.mojom";
        "#;
        let file = parse(source, "service.mojom").unwrap();
        assert_eq!(file.module.unwrap().name, "sample.service");
        let imports: Vec<_> = file.imports.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(imports, vec!["sample/types.mojom", "other.mojom"]);
    }

    #[test]
    fn test_parse_struct() {
        let source = r#"
            [Stable]
            struct Point {
                enum Unit { PIXEL, DIP = 2 };
                const int32 kOrigin = 0;
                int32 x@0 = -1;
                int32 y@1;
                array<string, 2>? labels;
                map<string, Point> neighbours;
            };
        "#;
        let file = parse(source, "point.mojom").unwrap();
        let Definition::Struct(decl) = &file.definitions[0] else {
            panic!("expected struct");
        };
        assert_eq!(decl.name, "Point");
        assert_eq!(decl.attributes[0].key, "Stable");
        assert_eq!(decl.enums[0].values.len(), 2);
        assert_eq!(decl.constants[0].name, "kOrigin");
        assert_eq!(decl.fields.len(), 4);
        assert_eq!(decl.fields[0].default, Some(Literal::Int(-1)));
        assert_eq!(decl.fields[1].ordinal, Some(1));
        assert_eq!(decl.fields[2].typename.to_string(), "array<string, 2>?");
        assert_eq!(decl.fields[3].typename.to_string(), "map<string, Point>");
    }

    #[test]
    fn test_parse_interface() {
        let source = r#"
            interface Logger {
                Log@0(string message, handle<message_pipe>? pipe);
                Flush() => (bool ok);
                Bind(associated Logger& request);
            };
        "#;
        let file = parse(source, "logger.mojom").unwrap();
        let Definition::Interface(decl) = &file.definitions[0] else {
            panic!("expected interface");
        };
        assert_eq!(decl.methods.len(), 3);
        assert_eq!(decl.methods[0].ordinal, Some(0));
        assert!(decl.methods[0].response.is_none());
        assert_eq!(
            decl.methods[0].parameters[1].typename.to_string(),
            "handle<message_pipe>?"
        );
        assert_eq!(decl.methods[1].response.as_ref().unwrap()[0].name, "ok");
        assert_eq!(
            decl.methods[2].parameters[0].typename.to_string(),
            "associated Logger&"
        );
    }

    #[test]
    fn test_parse_union_enum_const() {
        let source = r#"
            union Value { int64 number; string text; };
            enum Color { RED, GREEN = 4, BLUE = GREEN, };
            const double kRatio = 1.5;
            const string kName = "demo";
        "#;
        let file = parse(source, "values.mojom").unwrap();
        assert_eq!(file.definitions.len(), 4);
        let Definition::Enum(color) = &file.definitions[1] else {
            panic!("expected enum");
        };
        assert_eq!(color.values[2].value, Some(Literal::Name("GREEN".to_string())));
        let Definition::Const(name) = &file.definitions[3] else {
            panic!("expected const");
        };
        assert_eq!(name.value, Literal::String("demo".to_string()));
    }

    #[test]
    fn test_error_reports_position() {
        let err = parse("struct Foo {\n  int32 x\n};", "foo.mojom").unwrap_err();
        assert_eq!(err.span.line, 3);
        assert_eq!(err.to_string(), "foo.mojom:3:1: Error: Expected ';', found '}'");
    }

    #[test]
    fn test_import_after_definition_rejected() {
        let err = parse("enum A { X };\nimport \"b.mojom\";", "a.mojom").unwrap_err();
        assert!(err.message.contains("Imports must precede"));
    }

    #[test]
    fn test_lex_error_is_parse_error() {
        let err = parse("struct Foo { int32 #x; };", "foo.mojom").unwrap_err();
        assert!(err.message.contains("Unexpected character '#'"));
    }

    #[test]
    fn test_unterminated_comment_is_parse_error() {
        let err = parse("module a;\n/* never closed", "a.mojom").unwrap_err();
        assert_eq!(err.to_string(), "a.mojom:2:1: Error: Unterminated comment");
    }
}
