//! Syntax tree for the supported `OpenQASM` 3 subset.

use rustc_hash::FxHashMap;

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegisterKind {
    Quantum,
    Classical,
}

#[derive(Debug, Clone)]
pub(crate) enum Statement {
    /// `include "file";`
    Include(String),
    /// `qubit[n] q;`, `bit c;`, `qreg q[n];` or `creg c[n];`
    Declare {
        kind: RegisterKind,
        name: String,
        size: Option<u32>,
    },
    Gate(GateCall),
    /// `measure q -> c;` or `c = measure q;`
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<BitRef>,
    },
    Reset(Vec<QubitRef>),
    /// An empty operand list spans every qubit in scope.
    Barrier(Vec<QubitRef>),
    GateDef(GateDef),
}

#[derive(Debug, Clone)]
pub(crate) struct GateCall {
    pub name: String,
    pub params: Vec<Expr>,
    pub qubits: Vec<QubitRef>,
}

/// `gate name(params) qubits { body }`
#[derive(Debug, Clone)]
pub(crate) struct GateDef {
    pub name: String,
    pub params: Vec<String>,
    pub qubits: Vec<String>,
    pub body: Vec<Statement>,
}

/// Which elements of a register an operand names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selector {
    All,
    Index(u32),
    /// Inclusive `[start:end]`.
    Slice(u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QubitRef {
    Named { register: String, selector: Selector },
    /// `$n`
    Hardware(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BitRef {
    pub register: String,
    pub selector: Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    /// Binding strength and whether the operator groups to the right.
    pub(crate) fn precedence(self) -> (u8, bool) {
        match self {
            BinOp::Add | BinOp::Sub => (1, false),
            BinOp::Mul | BinOp::Div | BinOp::Mod => (2, false),
            BinOp::Pow => (3, true),
        }
    }

    fn apply(self, l: f64, r: f64) -> f64 {
        match self {
            BinOp::Add => l + r,
            BinOp::Sub => l - r,
            BinOp::Mul => l * r,
            BinOp::Div => l / r,
            BinOp::Mod => l % r,
            BinOp::Pow => l.powf(r),
        }
    }
}

/// A real-valued angle expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// Literal or named constant, already resolved.
    Number(f64),
    /// Gate parameter bound inside a gate body.
    Name(String),
    Neg(Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub(crate) fn evaluate(&self, bindings: &FxHashMap<String, f64>) -> ParseResult<f64> {
        match self {
            Expr::Number(v) => Ok(*v),
            Expr::Name(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| ParseError::Undefined(name.clone())),
            Expr::Neg(inner) => Ok(-inner.evaluate(bindings)?),
            Expr::Binary(l, op, r) => Ok(op.apply(l.evaluate(bindings)?, r.evaluate(bindings)?)),
            Expr::Call(name, args) => {
                let [arg] = args.as_slice() else {
                    return Err(ParseError::Invalid(format!(
                        "{name}() takes one argument, got {}",
                        args.len()
                    )));
                };
                let f: fn(f64) -> f64 = match name.as_str() {
                    "sin" => f64::sin,
                    "cos" => f64::cos,
                    "tan" => f64::tan,
                    "arcsin" => f64::asin,
                    "arccos" => f64::acos,
                    "arctan" => f64::atan,
                    "exp" => f64::exp,
                    "ln" => f64::ln,
                    "sqrt" => f64::sqrt,
                    _ => return Err(ParseError::Invalid(format!("unknown function {name}()"))),
                };
                Ok(f(arg.evaluate(bindings)?))
            }
        }
    }
}
