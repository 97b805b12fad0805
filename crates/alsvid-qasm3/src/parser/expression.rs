//! Angle expressions, by precedence climbing.

use std::f64::consts::{E, PI, TAU};

use super::Parser;
use crate::ast::{BinOp, Expr};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    pub(super) fn expression(&mut self) -> ParseResult<Expr> {
        self.climb(1)
    }

    /// Comma-separated expressions up to, not including, the closing `)`.
    pub(super) fn expressions(&mut self) -> ParseResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        if self.peek_is(&Token::RParen) {
            return Ok(exprs);
        }
        exprs.push(self.expression()?);
        while self.eat(&Token::Comma) {
            exprs.push(self.expression()?);
        }
        Ok(exprs)
    }

    fn climb(&mut self, min: u8) -> ParseResult<Expr> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(binary_op) {
            let (prec, right_assoc) = op.precedence();
            if prec < min {
                break;
            }
            self.pos += 1;
            let rhs = self.climb(if right_assoc { prec } else { prec + 1 })?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.eat(&Token::Plus);
        self.atom()
    }

    #[allow(clippy::cast_precision_loss)]
    fn atom(&mut self) -> ParseResult<Expr> {
        let token = self
            .bump()
            .ok_or_else(|| ParseError::Eof("expression".into()))?;
        match token {
            Token::Int(v) => Ok(Expr::Number(v as f64)),
            Token::Float(v) => Ok(Expr::Number(v)),
            Token::Pi => Ok(Expr::Number(PI)),
            Token::Tau => Ok(Expr::Number(TAU)),
            Token::Euler => Ok(Expr::Number(E)),
            Token::Ident(name) if self.eat(&Token::LParen) => {
                let args = self.expressions()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Call(name, args))
            }
            Token::Ident(name) => Ok(Expr::Name(name)),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(self.syntax_error("expression", &other)),
        }
    }
}

fn binary_op(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::Percent => BinOp::Mod,
        Token::Power => BinOp::Pow,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn eval(source: &str) -> f64 {
        let mut parser = Parser::new(source).unwrap();
        let expr = parser.expression().unwrap();
        assert!(parser.peek().is_none(), "trailing input in {source}");
        expr.evaluate(&FxHashMap::default()).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("8 / 4 / 2"), 1.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("7 % 4"), 3.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval("2 * 3 ** 2"), 18.0);
    }

    #[test]
    fn test_unary_and_constants() {
        assert_eq!(eval("-pi"), -PI);
        assert_eq!(eval("+tau / 2"), PI);
        assert!((eval("ln(euler)") - 1.0).abs() < 1e-15);
        assert!((eval("sqrt(2) * sqrt(2)") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dangling_operator() {
        let mut parser = Parser::new("1 +").unwrap();
        assert!(matches!(parser.expression(), Err(ParseError::Eof(_))));
    }
}
