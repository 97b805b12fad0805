//! Qubit and classical bit identifiers and the registers that group them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat index of a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The flat index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Flat index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    /// The flat index as a `usize`.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A named, contiguous block of qubits or classical bits.
///
/// Registers are laid out back to back in declaration order, so a register
/// covers the flat indices `start..start + size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Declared name.
    pub name: String,
    /// First flat index covered by the register.
    pub start: u32,
    /// Number of bits.
    pub size: u32,
}

impl Register {
    /// Create a register covering `start..start + size`.
    pub fn new(name: impl Into<String>, start: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            start,
            size,
        }
    }

    /// Check whether a flat index falls inside this register.
    #[inline]
    pub fn contains(&self, flat: u32) -> bool {
        flat >= self.start && flat - self.start < self.size
    }

    /// Flat index of the `offset`-th bit, if in range.
    pub fn flat(&self, offset: u32) -> Option<u32> {
        (offset < self.size).then(|| self.start + offset)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}
