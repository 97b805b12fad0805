//! QASM3 emitter for serializing circuits.

use std::f64::consts::PI;

use alsvid_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId};

use crate::error::{ParseError, ParseResult};

/// Denominators tried when rendering an angle as a multiple of pi.
const PI_DENOMINATORS: [i32; 4] = [1, 2, 4, 8];

/// Emit a circuit as QASM3 source code.
///
/// Registers are declared in layout order and every qubit is addressed
/// through its register. A circuit on hardware qubits declares no qubit
/// registers and addresses qubits as `$n`. Angles that are exact multiples of
/// `pi/8` print symbolically; all others print with enough digits to parse
/// back to the same value.
pub fn emit(circuit: &Circuit) -> ParseResult<String> {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit()?;
    Ok(emitter.output)
}

/// QASM3 emitter.
struct Emitter<'a> {
    circuit: &'a Circuit,
    output: String,
}

impl<'a> Emitter<'a> {
    fn new(circuit: &'a Circuit) -> Self {
        Self {
            circuit,
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self) -> ParseResult<()> {
        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");

        let circuit = self.circuit;
        for reg in circuit.qregs() {
            self.writeln(&format!("qubit[{}] {};", reg.size, reg.name));
        }
        for reg in circuit.cregs() {
            self.writeln(&format!("bit[{}] {};", reg.size, reg.name));
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }
        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> ParseResult<()> {
        let qubits = self.emit_qubits(&instruction.qubits)?;
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let params = gate.parameters();
                if params.is_empty() {
                    self.writeln(&format!("{} {qubits};", gate.name()));
                } else {
                    let params = params
                        .iter()
                        .map(|p| emit_param(*p))
                        .collect::<ParseResult<Vec<_>>>()?
                        .join(", ");
                    self.writeln(&format!("{}({params}) {qubits};", gate.name()));
                }
            }

            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let line = format!("{} = measure {};", self.clbit(*c)?, self.qubit(*q)?);
                    self.writeln(&line);
                }
            }

            InstructionKind::Reset => self.writeln(&format!("reset {qubits};")),

            InstructionKind::Barrier => {
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }
        Ok(())
    }

    fn emit_qubits(&self, qubits: &[QubitId]) -> ParseResult<String> {
        Ok(qubits
            .iter()
            .map(|q| self.qubit(*q))
            .collect::<ParseResult<Vec<_>>>()?
            .join(", "))
    }

    fn qubit(&self, qubit: QubitId) -> ParseResult<String> {
        if self.circuit.is_physical() {
            return Ok(format!("${}", qubit.0));
        }
        self.circuit
            .locate_qubit(qubit)
            .map(|(reg, offset)| format!("{}[{offset}]", reg.name))
            .ok_or_else(|| ParseError::Invalid(format!("qubit {qubit} is in no register")))
    }

    fn clbit(&self, clbit: ClbitId) -> ParseResult<String> {
        self.circuit
            .locate_clbit(clbit)
            .map(|(reg, offset)| format!("{}[{offset}]", reg.name))
            .ok_or_else(|| ParseError::Invalid(format!("classical bit {clbit} is in no register")))
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Render an angle so that parsing it back yields the same `f64`.
fn emit_param(v: f64) -> ParseResult<String> {
    if !v.is_finite() {
        return Err(ParseError::Invalid(format!("cannot emit angle {v}")));
    }
    for d in PI_DENOMINATORS {
        for k in (-2 * d..=2 * d).filter(|&k| k != 0) {
            if v == f64::from(k) * PI / f64::from(d) {
                return Ok(pi_fraction(k, d));
            }
        }
    }
    // Debug formatting is shortest-round-trip and switches to exponent form
    // for extreme magnitudes, which the lexer reads back as a float.
    Ok(format!("{v:?}"))
}

fn pi_fraction(k: i32, d: i32) -> String {
    let numerator = match k {
        1 => "pi".to_string(),
        -1 => "-pi".to_string(),
        _ => format!("{k}*pi"),
    };
    if d == 1 {
        numerator
    } else {
        format!("{numerator}/{d}")
    }
}
