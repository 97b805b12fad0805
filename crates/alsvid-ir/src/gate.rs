//! The standard gate set.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Gates of `stdgates.inc`, plus `prx`, with their angles bound.
///
/// `PRX(θ, φ)` is `RZ(φ) · RX(θ) · RZ(-φ)`, the native single-qubit gate of
/// some superconducting devices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    SX,
    SXdg,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    P(f64),
    U(f64, f64, f64),
    PRX(f64, f64),

    CX,
    CY,
    CZ,
    CH,
    Swap,
    ISwap,
    CRx(f64),
    CRy(f64),
    CRz(f64),
    CP(f64),
    RXX(f64),
    RYY(f64),
    RZZ(f64),

    CCX,
    CSwap,
}

impl StandardGate {
    /// Name in `stdgates.inc`.
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
            StandardGate::PRX(_, _) => "prx",
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> u32 {
        use StandardGate::*;
        match self {
            CCX | CSwap => 3,
            CX | CY | CZ | CH | Swap | ISwap => 2,
            CRx(_) | CRy(_) | CRz(_) | CP(_) | RXX(_) | RYY(_) | RZZ(_) => 2,
            _ => 1,
        }
    }

    /// Bound angles, in QASM argument order.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRx(p)
            | StandardGate::CRy(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p)
            | StandardGate::RXX(p)
            | StandardGate::RYY(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U(a, b, c) => vec![a, b, c],

            StandardGate::PRX(theta, phi) => vec![theta, phi],

            _ => vec![],
        }
    }

    /// Resolve a gate by its OpenQASM name and evaluated arguments.
    ///
    /// Accepts the `stdgates.inc` names plus the legacy aliases `u1`, `u2`,
    /// `u3`, `phase`, `cphase`, `CX` and `U`. Returns `None` when the name is
    /// unknown or the argument count does not match.
    pub fn from_name(name: &str, params: &[f64]) -> Option<Self> {
        let gate = match (name, params) {
            ("id" | "i", []) => StandardGate::I,
            ("x", []) => StandardGate::X,
            ("y", []) => StandardGate::Y,
            ("z", []) => StandardGate::Z,
            ("h", []) => StandardGate::H,
            ("s", []) => StandardGate::S,
            ("sdg", []) => StandardGate::Sdg,
            ("t", []) => StandardGate::T,
            ("tdg", []) => StandardGate::Tdg,
            ("sx", []) => StandardGate::SX,
            ("sxdg", []) => StandardGate::SXdg,
            ("rx", [t]) => StandardGate::Rx(*t),
            ("ry", [t]) => StandardGate::Ry(*t),
            ("rz", [t]) => StandardGate::Rz(*t),
            ("p" | "phase" | "u1", [l]) => StandardGate::P(*l),
            ("u2", [phi, lambda]) => StandardGate::U(FRAC_PI_2, *phi, *lambda),
            ("u" | "U" | "u3", [t, phi, lambda]) => StandardGate::U(*t, *phi, *lambda),
            ("cx" | "CX" | "cnot", []) => StandardGate::CX,
            ("cy", []) => StandardGate::CY,
            ("cz", []) => StandardGate::CZ,
            ("ch", []) => StandardGate::CH,
            ("swap", []) => StandardGate::Swap,
            ("iswap", []) => StandardGate::ISwap,
            ("crx", [t]) => StandardGate::CRx(*t),
            ("cry", [t]) => StandardGate::CRy(*t),
            ("crz", [t]) => StandardGate::CRz(*t),
            ("cp" | "cphase" | "cu1", [l]) => StandardGate::CP(*l),
            ("rxx", [t]) => StandardGate::RXX(*t),
            ("ryy", [t]) => StandardGate::RYY(*t),
            ("rzz", [t]) => StandardGate::RZZ(*t),
            ("ccx", []) => StandardGate::CCX,
            ("cswap", []) => StandardGate::CSwap,
            ("prx", [theta, phi]) => StandardGate::PRX(*theta, *phi),
            _ => return None,
        };
        Some(gate)
    }
}
