//! Statement grammar.

use super::Parser;
use crate::ast::{BitRef, GateCall, GateDef, QubitRef, RegisterKind, Selector, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .bump()
            .ok_or_else(|| ParseError::Eof("statement".into()))?;
        let stmt = match token {
            Token::Include => {
                let path = match self.bump() {
                    Some(Token::Str(path)) => path,
                    Some(other) => return Err(self.syntax_error("include path", &other)),
                    None => return Err(ParseError::Eof("include path".into())),
                };
                Statement::Include(path)
            }
            Token::Qubit => self.declaration(RegisterKind::Quantum)?,
            Token::Bit => self.declaration(RegisterKind::Classical)?,
            Token::Qreg => self.legacy_declaration(RegisterKind::Quantum)?,
            Token::Creg => self.legacy_declaration(RegisterKind::Classical)?,
            Token::Measure => {
                let qubits = self.qubit_refs()?;
                let bits = if self.eat(&Token::Arrow) {
                    self.bit_refs()?
                } else {
                    vec![]
                };
                Statement::Measure { qubits, bits }
            }
            Token::Reset => Statement::Reset(self.qubit_refs()?),
            Token::Barrier => {
                if self.peek_is(&Token::Semicolon) {
                    Statement::Barrier(vec![])
                } else {
                    Statement::Barrier(self.qubit_refs()?)
                }
            }
            // Gate definitions carry their own braces and no semicolon.
            Token::Gate => return self.gate_definition(),
            Token::Ident(name) => {
                if self.peek_is(&Token::LBracket) || self.peek_is(&Token::Assign) {
                    self.measure_assignment(name)?
                } else {
                    self.gate_call(name)?
                }
            }
            Token::Reserved(word) => {
                return Err(ParseError::Unsupported(format!("'{word}' statements")));
            }
            other => return Err(self.syntax_error("statement", &other)),
        };
        self.expect(Token::Semicolon)?;
        Ok(stmt)
    }

    /// `qubit[n] name` / `bit name`
    fn declaration(&mut self, kind: RegisterKind) -> ParseResult<Statement> {
        let size = self.size()?;
        let name = self.ident()?;
        Ok(Statement::Declare { kind, name, size })
    }

    /// `qreg name[n]` / `creg name`
    fn legacy_declaration(&mut self, kind: RegisterKind) -> ParseResult<Statement> {
        let name = self.ident()?;
        let size = self.size()?;
        Ok(Statement::Declare { kind, name, size })
    }

    fn size(&mut self) -> ParseResult<Option<u32>> {
        if !self.eat(&Token::LBracket) {
            return Ok(None);
        }
        let size = self.index()?;
        self.expect(Token::RBracket)?;
        Ok(Some(size))
    }

    /// `c = measure q` or `c[i] = measure q[j]`; any other assignment is
    /// classical computation and rejected.
    fn measure_assignment(&mut self, register: String) -> ParseResult<Statement> {
        let selector = self.selector()?;
        self.expect(Token::Assign)?;
        if !self.eat(&Token::Measure) {
            return Err(ParseError::Unsupported(format!(
                "classical assignment to '{register}'"
            )));
        }
        let qubits = self.qubit_refs()?;
        Ok(Statement::Measure {
            qubits,
            bits: vec![BitRef { register, selector }],
        })
    }

    fn gate_call(&mut self, name: String) -> ParseResult<Statement> {
        let mut params = vec![];
        if self.eat(&Token::LParen) {
            params = self.expressions()?;
            self.expect(Token::RParen)?;
        }
        let qubits = self.qubit_refs()?;
        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    fn gate_definition(&mut self) -> ParseResult<Statement> {
        let name = self.ident()?;
        let mut params = vec![];
        if self.eat(&Token::LParen) {
            if !self.peek_is(&Token::RParen) {
                params = self.idents()?;
            }
            self.expect(Token::RParen)?;
        }
        let qubits = self.idents()?;

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(ParseError::Eof(format!("'}}' closing gate '{name}'")));
            }
            body.push(self.statement()?);
        }
        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    fn qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.qubit_ref()?];
        while self.eat(&Token::Comma) {
            refs.push(self.qubit_ref()?);
        }
        Ok(refs)
    }

    fn qubit_ref(&mut self) -> ParseResult<QubitRef> {
        if let Some(&Token::Hardware(n)) = self.peek() {
            self.pos += 1;
            return Ok(QubitRef::Hardware(n));
        }
        let register = self.ident()?;
        let selector = self.selector()?;
        Ok(QubitRef::Named { register, selector })
    }

    fn bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = Vec::new();
        loop {
            let register = self.ident()?;
            let selector = self.selector()?;
            refs.push(BitRef { register, selector });
            if !self.eat(&Token::Comma) {
                return Ok(refs);
            }
        }
    }

    /// Optional `[i]` or `[start:end]`.
    fn selector(&mut self) -> ParseResult<Selector> {
        if !self.eat(&Token::LBracket) {
            return Ok(Selector::All);
        }
        let first = self.index()?;
        let selector = if self.eat(&Token::Colon) {
            Selector::Slice(first, self.index()?)
        } else {
            Selector::Index(first)
        };
        self.expect(Token::RBracket)?;
        Ok(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(source: &str) -> ParseResult<Vec<Statement>> {
        Parser::new(source)?.program()
    }

    #[test]
    fn test_declarations() {
        let stmts = statements("qubit[3] q; bit c; qreg r[2]; creg m[2];").unwrap();
        assert!(matches!(
            &stmts[0],
            Statement::Declare { kind: RegisterKind::Quantum, name, size: Some(3) } if name == "q"
        ));
        assert!(matches!(
            &stmts[1],
            Statement::Declare { kind: RegisterKind::Classical, size: None, .. }
        ));
        assert!(matches!(
            &stmts[2],
            Statement::Declare { kind: RegisterKind::Quantum, name, size: Some(2) } if name == "r"
        ));
        assert!(matches!(
            &stmts[3],
            Statement::Declare { kind: RegisterKind::Classical, .. }
        ));
    }

    #[test]
    fn test_selectors() {
        let stmts = statements("cx q[0:2], $4; c[1] = measure q[1];").unwrap();
        let Statement::Gate(call) = &stmts[0] else {
            panic!("expected a gate call");
        };
        assert_eq!(
            call.qubits,
            vec![
                QubitRef::Named {
                    register: "q".into(),
                    selector: Selector::Slice(0, 2)
                },
                QubitRef::Hardware(4),
            ]
        );
        let Statement::Measure { bits, .. } = &stmts[1] else {
            panic!("expected a measurement");
        };
        assert_eq!(bits[0].selector, Selector::Index(1));
    }

    #[test]
    fn test_gate_definition_body() {
        let stmts = statements("gate g(a, b) x, y { rz(a) x; barrier; cx x, y; }").unwrap();
        let Statement::GateDef(def) = &stmts[0] else {
            panic!("expected a gate definition");
        };
        assert_eq!(def.params, vec!["a", "b"]);
        assert_eq!(def.qubits, vec!["x", "y"]);
        assert_eq!(def.body.len(), 3);
    }

    #[test]
    fn test_unterminated_gate_body() {
        assert!(matches!(
            statements("gate g x { h x;"),
            Err(ParseError::Eof(_))
        ));
    }

    #[test]
    fn test_classical_constructs_are_rejected() {
        for source in [
            "if (c == 1) { x q; }",
            "for uint i in [0:3] { x q; }",
            "while (true) { }",
            "const float t = 0.5;",
            "def f() { }",
        ] {
            assert!(
                matches!(statements(source), Err(ParseError::Unsupported(_))),
                "{source}"
            );
        }
        assert!(matches!(
            statements("c = 1;"),
            Err(ParseError::Unsupported(_))
        ));
    }
}
