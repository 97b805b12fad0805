//! Recursive-descent parser.
//!
//! Source text is tokenized up front, parsed into a statement list and then
//! lowered onto an [`alsvid_ir::Circuit`].

mod expression;
mod lowering;
mod statement;

use std::mem::discriminant;

use alsvid_ir::Circuit;

use crate::ast::Statement;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse QASM 3 source into a circuit.
///
/// The `OPENQASM` header is optional; when present, its major version must
/// be 3.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let statements = Parser::new(source)?.program()?;
    lowering::lower(&statements)
}

pub(super) struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        let tokens = tokenize(source).map_err(|e| ParseError::Lex {
            line: e.line,
            position: e.position,
            message: e.message,
        })?;
        Ok(Self { tokens, pos: 0 })
    }

    fn program(&mut self) -> ParseResult<Vec<Statement>> {
        if self.eat(&Token::OpenQasm) {
            let version = match self.bump() {
                Some(Token::Float(v)) => format!("{v:?}"),
                Some(Token::Int(v)) => format!("{v}.0"),
                Some(other) => return Err(ParseError::Version(other.to_string())),
                None => return Err(ParseError::Eof("version number".into())),
            };
            if !version.starts_with("3.") {
                return Err(ParseError::Version(version));
            }
            self.expect(Token::Semicolon)?;
        }

        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| discriminant(t) == discriminant(token))
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it is of the same kind as `token`.
    fn eat(&mut self, token: &Token) -> bool {
        let hit = self.peek_is(token);
        if hit {
            self.pos += 1;
        }
        hit
    }

    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, token: Token) -> ParseResult<()> {
        match self.bump() {
            Some(found) if discriminant(&found) == discriminant(&token) => Ok(()),
            Some(found) => Err(self.syntax_error(&token.to_string(), &found)),
            None => Err(ParseError::Eof(token.to_string())),
        }
    }

    /// Error for `found`, the token just consumed.
    fn syntax_error(&self, expected: &str, found: &Token) -> ParseError {
        let line = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map_or(1, |t| t.line);
        ParseError::Syntax {
            line,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    fn ident(&mut self) -> ParseResult<String> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(name),
            Some(other) => Err(self.syntax_error("identifier", &other)),
            None => Err(ParseError::Eof("identifier".into())),
        }
    }

    fn idents(&mut self) -> ParseResult<Vec<String>> {
        let mut names = vec![self.ident()?];
        while self.eat(&Token::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    /// A register size or element index.
    fn index(&mut self) -> ParseResult<u32> {
        match self.bump() {
            Some(Token::Int(v)) => {
                u32::try_from(v).map_err(|_| ParseError::Invalid(format!("index {v} is too large")))
            }
            Some(other) => Err(self.syntax_error("integer", &other)),
            None => Err(ParseError::Eof("integer".into())),
        }
    }
}
