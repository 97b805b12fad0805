//! Parsing weighted Pauli sums.
//!
//! An operator is written as a list of `(term, coefficient)` pairs, in JSON
//! or Python literal style:
//!
//! ```text
//! [["X 0 Z 1", 1.5], ("Z0", -0.5), ['I', 2]]
//! ```
//!
//! A term alternates Pauli labels and qubit indices. A letter may be glued
//! to the index that follows it (`X0Z1`), and a bare `I` is the identity.

use std::ops::Range;

use logos::Logos;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EstimationError, EstimationResult};
use crate::layout::Layout;
use crate::pauli::{Pauli, PauliString};

/// Tokens of the outer pair list.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum OpToken {
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].to_string()
}

/// One term of an observable: Pauli factors on distinct qubits with a real weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliTerm {
    paulis: Vec<Pauli>,
    qubits: Vec<u32>,
    coefficient: f64,
}

impl PauliTerm {
    /// Build a term from its textual form.
    ///
    /// Fails when labels and indices do not alternate, a label is not one of
    /// `I X Y Z`, an index repeats, or an index is not below `num_qubits`.
    /// A term made only of identities becomes the identity on all qubits.
    pub fn parse(text: &str, coefficient: f64, num_qubits: u32) -> EstimationResult<Self> {
        let invalid = |message: String| EstimationError::InvalidTerm {
            text: text.to_string(),
            message,
        };

        let spaced = separate_indices(text.trim());
        let spaced = if spaced == "I" { "I 0" } else { spaced.as_str() };
        let parts: Vec<&str> = spaced.split_whitespace().collect();
        if parts.is_empty() || parts.len() % 2 != 0 {
            return Err(invalid(
                "labels and qubit indices must alternate in equal numbers".into(),
            ));
        }

        let mut paulis = Vec::with_capacity(parts.len() / 2);
        let mut qubits = Vec::with_capacity(parts.len() / 2);
        let mut seen = FxHashSet::default();
        for pair in parts.chunks_exact(2) {
            let mut chars = pair[0].chars();
            let pauli = match (chars.next().and_then(Pauli::from_char), chars.next()) {
                (Some(p), None) => p,
                _ => return Err(invalid(format!("'{}' is not a Pauli label", pair[0]))),
            };
            let qubit: u32 = pair[1]
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a qubit index", pair[1])))?;
            if qubit >= num_qubits {
                return Err(invalid(format!(
                    "qubit index {qubit} is out of range for {num_qubits} qubits"
                )));
            }
            if !seen.insert(qubit) {
                return Err(invalid(format!("qubit index {qubit} is repeated")));
            }
            paulis.push(pauli);
            qubits.push(qubit);
        }

        if paulis.iter().all(|p| p.is_identity()) {
            paulis = vec![Pauli::I; num_qubits as usize];
            qubits = (0..num_qubits).collect();
        }

        Ok(Self {
            paulis,
            qubits,
            coefficient,
        })
    }

    /// Labels in the order they were written, e.g. `"XZ"` for `X0Z1`.
    pub fn label(&self) -> String {
        self.paulis.iter().map(|p| p.as_char()).collect()
    }

    /// Qubit index of each label.
    pub fn qubits(&self) -> &[u32] {
        &self.qubits
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn is_identity(&self) -> bool {
        self.paulis.iter().all(|p| p.is_identity())
    }
}

/// Insert a space wherever a letter and a digit touch, so `X0Z1` reads `X 0 Z 1`.
fn separate_indices(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if let Some(p) = prev {
            let touching = (p.is_ascii_alphabetic() && c.is_ascii_digit())
                || (p.is_ascii_digit() && c.is_ascii_alphabetic());
            if touching {
                out.push(' ');
            }
        }
        prev = Some(c);
        out.push(c);
    }
    out
}

/// A weighted sum of Pauli terms over a fixed number of qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    pub terms: Vec<PauliTerm>,
    pub num_qubits: u32,
}

impl Observable {
    /// Parse an operator list for a circuit of `num_qubits` qubits.
    pub fn parse(text: &str, num_qubits: u32) -> EstimationResult<Self> {
        let pairs = PairListParser::new(text)?.parse()?;
        let terms = pairs
            .into_iter()
            .map(|(term, coefficient)| PauliTerm::parse(&term, coefficient, num_qubits))
            .collect::<EstimationResult<Vec<_>>>()?;
        Ok(Self { terms, num_qubits })
    }

    /// Dense Pauli strings with term qubit `i` moved to `layout[i]`.
    ///
    /// Terms that land on the same string are merged by adding their
    /// coefficients; the first occurrence fixes the position.
    pub fn to_dense(&self, layout: &Layout) -> EstimationResult<Vec<(PauliString, f64)>> {
        if layout.len() != self.num_qubits as usize {
            return Err(EstimationError::InvalidLayout {
                layout: layout.as_slice().to_vec(),
                message: format!("expected {} entries", self.num_qubits),
            });
        }

        let mut merged: Vec<(PauliString, f64)> = Vec::with_capacity(self.terms.len());
        let mut position: FxHashMap<PauliString, usize> = FxHashMap::default();
        for term in &self.terms {
            let mut dense = PauliString::identity(layout.len());
            for (&pauli, &qubit) in term.paulis.iter().zip(&term.qubits) {
                dense.set(layout.physical(qubit) as usize, pauli);
            }
            match position.get(&dense) {
                Some(&i) => merged[i].1 += term.coefficient,
                None => {
                    position.insert(dense.clone(), merged.len());
                    merged.push((dense, term.coefficient));
                }
            }
        }
        Ok(merged)
    }
}

/// Recursive-descent parser for `[(str, number), ...]`.
struct PairListParser<'a> {
    text: &'a str,
    tokens: Vec<(OpToken, Range<usize>)>,
    pos: usize,
}

impl<'a> PairListParser<'a> {
    fn new(text: &'a str) -> EstimationResult<Self> {
        let mut tokens = Vec::new();
        let mut lexer = OpToken::lexer(text);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(()) => {
                    return Err(EstimationError::OperatorSyntax {
                        offset: span.start,
                        text: text[span].to_string(),
                        message: "unrecognized input".into(),
                    });
                }
            }
        }
        Ok(Self {
            text,
            tokens,
            pos: 0,
        })
    }

    fn error(&self, message: &str) -> EstimationError {
        let (offset, text) = match self.tokens.get(self.pos) {
            Some((_, span)) => (span.start, self.text[span.clone()].to_string()),
            None => (self.text.len(), "end of input".to_string()),
        };
        EstimationError::OperatorSyntax {
            offset,
            text,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<&OpToken> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn consume(&mut self, token: &OpToken) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &OpToken, what: &str) -> EstimationResult<()> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn parse(mut self) -> EstimationResult<Vec<(String, f64)>> {
        self.expect(&OpToken::LBracket, "'['")?;
        let mut pairs = Vec::new();
        while !self.consume(&OpToken::RBracket) {
            pairs.push(self.parse_pair()?);
            if !self.consume(&OpToken::Comma) {
                self.expect(&OpToken::RBracket, "',' or ']'")?;
                break;
            }
        }
        if self.pos < self.tokens.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(pairs)
    }

    fn parse_pair(&mut self) -> EstimationResult<(String, f64)> {
        let close = if self.consume(&OpToken::LBracket) {
            OpToken::RBracket
        } else if self.consume(&OpToken::LParen) {
            OpToken::RParen
        } else {
            return Err(self.error("expected '[' or '(' opening a term"));
        };

        let term = match self.peek() {
            Some(OpToken::Str(s)) => s.clone(),
            _ => return Err(self.error("expected a quoted term")),
        };
        self.pos += 1;
        self.expect(&OpToken::Comma, "','")?;

        let coefficient = match self.peek() {
            Some(OpToken::Number(v)) => *v,
            _ => return Err(self.error("expected a real coefficient")),
        };
        self.pos += 1;

        self.consume(&OpToken::Comma);
        let closing = if close == OpToken::RBracket { "']'" } else { "')'" };
        self.expect(&close, closing)?;
        Ok((term, coefficient))
    }
}
