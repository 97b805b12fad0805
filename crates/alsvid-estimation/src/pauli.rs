//! Dense Pauli strings.

use std::fmt;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// Parse a label character. Only upper-case `I`, `X`, `Y`, `Z` are accepted.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }
}

/// A Pauli operator on every qubit of a register, indexed by qubit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PauliString(Vec<Pauli>);

impl PauliString {
    /// Identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        Self(vec![Pauli::I; num_qubits])
    }

    pub fn num_qubits(&self) -> usize {
        self.0.len()
    }

    /// Operator on `qubit`; identity outside the register.
    pub fn get(&self, qubit: usize) -> Pauli {
        self.0.get(qubit).copied().unwrap_or(Pauli::I)
    }

    pub(crate) fn set(&mut self, qubit: usize, pauli: Pauli) {
        self.0[qubit] = pauli;
    }

    /// Qubits carrying a non-identity operator, ascending.
    pub fn support(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_identity())
            .map(|(q, _)| q)
    }

    /// Whether the operators agree on every qubit where both are non-identity.
    pub fn commutes_qubitwise(&self, other: &PauliString) -> bool {
        self.0
            .iter()
            .zip(&other.0)
            .all(|(a, b)| a.is_identity() || b.is_identity() || a == b)
    }

    /// Label with the highest qubit first.
    pub fn label(&self) -> String {
        self.0.iter().rev().map(|p| p.as_char()).collect()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
