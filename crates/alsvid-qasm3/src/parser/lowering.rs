//! Statement list to [`Circuit`].
//!
//! Registers are added in declaration order. Gate definitions are inlined
//! at each call site and register operands are broadcast over the gate.

use std::ops::Range;

use alsvid_ir::{Circuit, ClbitId, QubitId, Register, StandardGate};
use rustc_hash::FxHashMap;

use crate::ast::{BitRef, GateCall, GateDef, QubitRef, RegisterKind, Selector, Statement};
use crate::error::{ParseError, ParseResult};

/// Gates from this include are built in; any other include is rejected.
const STDGATES: &str = "stdgates.inc";

pub(super) fn lower(statements: &[Statement]) -> ParseResult<Circuit> {
    let mut lowering = Lowering {
        circuit: Circuit::new("qasm_circuit"),
        definitions: FxHashMap::default(),
        inlining: Vec::new(),
    };
    for stmt in statements {
        lowering.top_level(stmt)?;
    }
    Ok(lowering.circuit)
}

struct Lowering {
    circuit: Circuit,
    definitions: FxHashMap<String, GateDef>,
    /// Definitions being expanded, innermost last.
    inlining: Vec<String>,
}

/// Formal arguments bound while inlining one application of a gate.
#[derive(Default)]
struct Frame {
    qubits: Vec<(String, QubitId)>,
    params: FxHashMap<String, f64>,
}

impl Frame {
    fn lookup(&self, name: &str) -> Option<QubitId> {
        self.qubits.iter().find(|(n, _)| n == name).map(|&(_, q)| q)
    }

    fn in_gate_body(&self) -> bool {
        !self.qubits.is_empty()
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Lowering {
    fn top_level(&mut self, stmt: &Statement) -> ParseResult<()> {
        let frame = Frame::default();
        match stmt {
            Statement::Include(path) if path == STDGATES => Ok(()),
            Statement::Include(path) => Err(ParseError::Unsupported(format!("include \"{path}\""))),
            Statement::Declare { kind, name, size } => {
                if self.circuit.qreg(name).is_some() || self.circuit.creg(name).is_some() {
                    return Err(ParseError::Duplicate(name.clone()));
                }
                let size = size.unwrap_or(1);
                match kind {
                    RegisterKind::Quantum => self.circuit.add_qreg(name.as_str(), size)?,
                    RegisterKind::Classical => self.circuit.add_creg(name.as_str(), size)?,
                };
                Ok(())
            }
            Statement::Measure { qubits, bits } => self.measure(qubits, bits),
            Statement::Reset(operands) => {
                for q in self.flatten(operands, &frame)? {
                    self.circuit.reset(q)?;
                }
                Ok(())
            }
            Statement::GateDef(def) => {
                if self.definitions.contains_key(&def.name) {
                    return Err(ParseError::Duplicate(def.name.clone()));
                }
                self.definitions.insert(def.name.clone(), def.clone());
                Ok(())
            }
            Statement::Gate(_) | Statement::Barrier(_) => self.in_frame(stmt, &frame),
        }
    }

    /// Statements allowed both at top level and inside a gate body.
    fn in_frame(&mut self, stmt: &Statement, frame: &Frame) -> ParseResult<()> {
        match stmt {
            Statement::Gate(call) => self.call(call, frame),
            Statement::Barrier(operands) => {
                let qubits = if !operands.is_empty() {
                    self.flatten(operands, frame)?
                } else if frame.in_gate_body() {
                    frame.qubits.iter().map(|&(_, q)| q).collect()
                } else {
                    (0..self.circuit.num_qubits() as u32).map(QubitId).collect()
                };
                self.circuit.barrier(qubits)?;
                Ok(())
            }
            _ => Err(ParseError::Unsupported(
                "only gate calls and barriers are allowed in a gate body".into(),
            )),
        }
    }

    fn measure(&mut self, qubits: &[QubitRef], bits: &[BitRef]) -> ParseResult<()> {
        if bits.is_empty() {
            return Err(ParseError::Unsupported(
                "measurement without a classical target".into(),
            ));
        }
        let qubits = self.flatten(qubits, &Frame::default())?;
        let mut clbits = Vec::new();
        for bit in bits {
            let reg = self
                .circuit
                .creg(&bit.register)
                .ok_or_else(|| ParseError::Undefined(bit.register.clone()))?;
            clbits.extend(select(reg, bit.selector)?.map(ClbitId));
        }
        if qubits.len() != clbits.len() {
            return Err(ParseError::Broadcast {
                operation: "measure".into(),
                sizes: vec![qubits.len(), clbits.len()],
            });
        }
        for (q, c) in qubits.into_iter().zip(clbits) {
            self.circuit.measure(q, c)?;
        }
        Ok(())
    }

    fn call(&mut self, call: &GateCall, frame: &Frame) -> ParseResult<()> {
        let params = call
            .params
            .iter()
            .map(|p| p.evaluate(&frame.params))
            .collect::<ParseResult<Vec<_>>>()?;
        let operands = call
            .qubits
            .iter()
            .map(|r| self.operand(r, frame))
            .collect::<ParseResult<Vec<_>>>()?;
        let width = broadcast_width(&call.name, &operands)?;

        if let Some(def) = self.definitions.get(&call.name).cloned() {
            return self.inline(&def, &params, &operands, width);
        }

        let gate = builtin(&call.name, &params)?;
        let arity = gate.num_qubits() as usize;
        if arity != operands.len() {
            return Err(ParseError::QubitArity {
                gate: call.name.clone(),
                expected: arity,
                got: operands.len(),
            });
        }
        for i in 0..width {
            self.circuit.gate(gate, nth_application(&operands, i))?;
        }
        Ok(())
    }

    fn inline(
        &mut self,
        def: &GateDef,
        params: &[f64],
        operands: &[Vec<QubitId>],
        width: usize,
    ) -> ParseResult<()> {
        if params.len() != def.params.len() {
            return Err(ParseError::ParamArity {
                gate: def.name.clone(),
                expected: def.params.len(),
                got: params.len(),
            });
        }
        if operands.len() != def.qubits.len() {
            return Err(ParseError::QubitArity {
                gate: def.name.clone(),
                expected: def.qubits.len(),
                got: operands.len(),
            });
        }
        if self.inlining.contains(&def.name) {
            return Err(ParseError::RecursiveGate(def.name.clone()));
        }

        self.inlining.push(def.name.clone());
        for i in 0..width {
            let frame = Frame {
                qubits: def
                    .qubits
                    .iter()
                    .cloned()
                    .zip(nth_application(operands, i))
                    .collect(),
                params: def.params.iter().cloned().zip(params.iter().copied()).collect(),
            };
            for stmt in &def.body {
                self.in_frame(stmt, &frame)?;
            }
        }
        self.inlining.pop();
        Ok(())
    }

    fn flatten(&mut self, operands: &[QubitRef], frame: &Frame) -> ParseResult<Vec<QubitId>> {
        let mut qubits = Vec::new();
        for r in operands {
            qubits.extend(self.operand(r, frame)?);
        }
        Ok(qubits)
    }

    /// The qubits one operand names, in order.
    fn operand(&mut self, r: &QubitRef, frame: &Frame) -> ParseResult<Vec<QubitId>> {
        let (register, selector) = match r {
            QubitRef::Hardware(n) => return Ok(vec![self.circuit.physical_qubit(*n)?]),
            QubitRef::Named { register, selector } => (register, *selector),
        };

        if let Some(q) = frame.lookup(register) {
            if selector != Selector::All {
                return Err(ParseError::Invalid(format!(
                    "gate argument '{register}' cannot be indexed"
                )));
            }
            return Ok(vec![q]);
        }
        if frame.in_gate_body() {
            return Err(ParseError::Undefined(register.clone()));
        }

        let reg = self
            .circuit
            .qreg(register)
            .ok_or_else(|| ParseError::Undefined(register.clone()))?;
        Ok(select(reg, selector)?.map(QubitId).collect())
    }
}

/// Flat indices `selector` picks out of `register`.
fn select(register: &Register, selector: Selector) -> ParseResult<Range<u32>> {
    let (first, last) = match selector {
        Selector::All => return Ok(register.start..register.start + register.size),
        Selector::Index(i) => (i, i),
        Selector::Slice(first, last) => (first, last),
    };
    if first > last {
        return Err(ParseError::Invalid(format!(
            "empty range {}[{first}:{last}]",
            register.name
        )));
    }
    let flat = |index: u32| {
        register.flat(index).ok_or_else(|| ParseError::OutOfRange {
            register: register.name.clone(),
            index: index as usize,
            size: register.size as usize,
        })
    };
    Ok(flat(first)?..flat(last)? + 1)
}

/// How many times a call applies once register operands are broadcast.
///
/// Single-qubit operands repeat; the rest must all have the same length.
fn broadcast_width(name: &str, operands: &[Vec<QubitId>]) -> ParseResult<usize> {
    let width = operands.iter().map(Vec::len).max().unwrap_or(0);
    if operands.iter().any(|o| o.len() != 1 && o.len() != width) {
        return Err(ParseError::Broadcast {
            operation: name.to_string(),
            sizes: operands.iter().map(Vec::len).collect(),
        });
    }
    Ok(width)
}

fn nth_application(operands: &[Vec<QubitId>], i: usize) -> Vec<QubitId> {
    operands
        .iter()
        .map(|o| if o.len() == 1 { o[0] } else { o[i] })
        .collect()
}

/// Look up a built-in gate, telling an unknown name from a wrong arity.
fn builtin(name: &str, params: &[f64]) -> ParseResult<StandardGate> {
    if let Some(gate) = StandardGate::from_name(name, params) {
        return Ok(gate);
    }
    match (0..=3).find(|&n| StandardGate::from_name(name, &vec![0.0; n]).is_some()) {
        Some(expected) => Err(ParseError::ParamArity {
            gate: name.to_string(),
            expected,
            got: params.len(),
        }),
        None => Err(ParseError::UnknownGate(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ParseError;
    use crate::parse;
    use alsvid_ir::{ClbitId, QubitId, StandardGate};
    use std::f64::consts::PI;

    #[test]
    fn test_gate_definition_is_inlined() {
        let source = r#"
            OPENQASM 3.0;
            include "stdgates.inc";
            gate rot(theta) a, b { rz(theta / 2) a; cx a, b; }
            qubit[2] q;
            rot(pi) q[1], q[0];
        "#;
        let circuit = parse(source).unwrap();
        let ops = circuit.instructions();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].as_gate(), Some(&StandardGate::Rz(PI / 2.0)));
        assert_eq!(ops[0].qubits, vec![QubitId(1)]);
        assert_eq!(ops[1].qubits, vec![QubitId(1), QubitId(0)]);
    }

    #[test]
    fn test_register_broadcast() {
        let source = "qubit[3] a; qubit[3] b; qubit t; h a; cx a, b; cx a[0:1], t;";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.len(), 3 + 3 + 2);
        assert_eq!(circuit.instructions()[5].qubits, vec![QubitId(2), QubitId(5)]);
        assert_eq!(circuit.instructions()[7].qubits, vec![QubitId(1), QubitId(6)]);
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        assert!(matches!(
            parse("qubit[3] a; qubit[2] b; cx a, b;"),
            Err(ParseError::Broadcast { sizes, .. }) if sizes == vec![3, 2]
        ));
        assert!(matches!(
            parse("qubit[3] q; bit[2] c; c = measure q;"),
            Err(ParseError::Broadcast { .. })
        ));
    }

    #[test]
    fn test_hardware_qubits() {
        let circuit = parse("bit[2] c; x $3; c[0] = measure $3; c[1] = measure $0;").unwrap();
        assert!(circuit.is_physical());
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(circuit.measured_qubits(), vec![QubitId(3), QubitId(0)]);
        assert_eq!(circuit.instructions()[1].clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_legacy_register_declarations() {
        let circuit = parse("qreg q[2]; creg m[2]; h q[0]; measure q -> m;").unwrap();
        assert_eq!(circuit.qregs()[0].name, "q");
        assert_eq!(circuit.cregs()[0].name, "m");
        assert_eq!(circuit.len(), 3);
    }

    #[test]
    fn test_barrier_defaults() {
        let circuit = parse("qubit[3] q; gate b2 x, y { barrier; } barrier; b2 q[0], q[2];").unwrap();
        let ops = circuit.instructions();
        assert_eq!(ops[0].qubits, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(ops[1].qubits, vec![QubitId(0), QubitId(2)]);
    }

    #[test]
    fn test_gate_arity_errors() {
        assert!(matches!(
            parse("qubit q; rz q;"),
            Err(ParseError::ParamArity { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            parse("qubit[3] q; cx q[0], q[1], q[2];"),
            Err(ParseError::QubitArity { expected: 2, got: 3, .. })
        ));
        assert!(matches!(
            parse("qubit q; frobnicate q;"),
            Err(ParseError::UnknownGate(_))
        ));
    }

    #[test]
    fn test_index_out_of_bounds() {
        assert!(matches!(
            parse("qubit[2] q; x q[2];"),
            Err(ParseError::OutOfRange { index: 2, size: 2, .. })
        ));
        assert!(matches!(
            parse("qubit[4] q; h q[2:1];"),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_unsupported_constructs() {
        assert!(matches!(
            parse("include \"qelib1.inc\";"),
            Err(ParseError::Unsupported(_))
        ));
        assert!(matches!(
            parse("qubit q; bit c; c = measure q; if (c == 1) { x q; }"),
            Err(ParseError::Unsupported(_))
        ));
        assert!(matches!(
            parse("qubit q; measure q;"),
            Err(ParseError::Unsupported(_))
        ));
        assert!(matches!(
            parse("qubit q; gate g a { reset a; } g q;"),
            Err(ParseError::Unsupported(_))
        ));
    }

    #[test]
    fn test_recursive_gate_is_rejected() {
        assert!(matches!(
            parse("gate g a { g a; } qubit q; g q;"),
            Err(ParseError::RecursiveGate(name)) if name == "g"
        ));
    }

    #[test]
    fn test_duplicate_declaration() {
        assert!(matches!(
            parse("qubit[2] q; bit[2] q;"),
            Err(ParseError::Duplicate(_))
        ));
    }
}
