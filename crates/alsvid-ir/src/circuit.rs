//! Circuits: registers plus a validated instruction list.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId, Register};

/// A quantum circuit.
///
/// Qubits and classical bits are addressed by flat index. Declared registers
/// map names onto contiguous index ranges; a circuit that addresses physical
/// qubits (`$0`, `$1`, ...) has no qubit registers at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    /// Qubits are hardware qubits rather than register members.
    physical: bool,
    instructions: Vec<Instruction>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            num_clbits: 0,
            qregs: vec![],
            cregs: vec![],
            physical: false,
            instructions: vec![],
        }
    }

    /// Create a circuit with one `q` register and one `c` register.
    ///
    /// Empty registers are not declared.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.qregs.push(Register::new("q", 0, num_qubits));
            circuit.num_qubits = num_qubits;
        }
        if num_clbits > 0 {
            circuit.cregs.push(Register::new("c", 0, num_clbits));
            circuit.num_clbits = num_clbits;
        }
        circuit
    }

    /// Add a quantum register, returning its layout.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Register> {
        let name = name.into();
        if self.physical {
            return Err(IrError::MixedAddressing(name));
        }
        self.check_register_name(&name)?;
        let register = Register::new(name, self.num_qubits, size);
        self.num_qubits = grow(self.num_qubits, size, &register.name)?;
        self.qregs.push(register.clone());
        Ok(register)
    }

    /// Add a classical register, returning its layout.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Register> {
        let name = name.into();
        self.check_register_name(&name)?;
        let register = Register::new(name, self.num_clbits, size);
        self.num_clbits = grow(self.num_clbits, size, &register.name)?;
        self.cregs.push(register.clone());
        Ok(register)
    }

    /// Address hardware qubit `$index`, growing the circuit to cover it.
    pub fn physical_qubit(&mut self, index: u32) -> IrResult<QubitId> {
        if let Some(reg) = self.qregs.first() {
            return Err(IrError::MixedAddressing(reg.name.clone()));
        }
        self.physical = true;
        if index >= self.num_qubits {
            self.num_qubits = grow(index, 1, &format!("${index}"))?;
        }
        Ok(QubitId(index))
    }

    fn check_register_name(&self, name: &str) -> IrResult<()> {
        if self.qreg(name).is_some() || self.creg(name).is_some() {
            return Err(IrError::DuplicateRegister(name.to_string()));
        }
        Ok(())
    }

    /// A register name not yet used by this circuit: `base`, else `base0`, `base1`, ...
    pub fn unused_register_name(&self, base: &str) -> String {
        let taken = |n: &str| self.qreg(n).is_some() || self.creg(n).is_some();
        if !taken(base) {
            return base.to_string();
        }
        (0u32..)
            .map(|i| format!("{base}{i}"))
            .find(|n| !taken(n))
            .unwrap_or_else(|| base.to_string())
    }

    /// Append an instruction after checking its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let operation = instruction.name();
        let (qubits, clbits) = (&instruction.qubits, &instruction.clbits);
        let expected = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.num_qubits() as usize),
            InstructionKind::Reset => Some(1),
            InstructionKind::Measure | InstructionKind::Barrier => None,
        };
        if let Some(expected) = expected.filter(|&n| n != qubits.len()) {
            return Err(IrError::Arity {
                operation,
                expected,
                got: qubits.len(),
            });
        }
        if instruction.is_measure() && (qubits.is_empty() || qubits.len() != clbits.len()) {
            return Err(IrError::MeasurePairing {
                qubits: qubits.len(),
                clbits: clbits.len(),
            });
        }

        if let Some(&qubit) = qubits.iter().find(|q| q.0 >= self.num_qubits) {
            return Err(IrError::QubitOutOfRange { qubit, operation });
        }
        if let Some(&clbit) = clbits.iter().find(|c| c.0 >= self.num_clbits) {
            return Err(IrError::ClbitOutOfRange { clbit, operation });
        }
        let mut seen = FxHashSet::default();
        if let Some(&qubit) = qubits.iter().find(|&&q| !seen.insert(q)) {
            return Err(IrError::RepeatedQubit { qubit, operation });
        }
        Ok(())
    }

    /// Append every instruction of `other`, shifted to start at the given offsets.
    pub fn compose(
        &mut self,
        other: &Circuit,
        qubit_offset: u32,
        clbit_offset: u32,
    ) -> IrResult<&mut Self> {
        for instruction in &other.instructions {
            self.apply(instruction.shifted(qubit_offset, clbit_offset))?;
        }
        Ok(self)
    }

    /// Apply a standard gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [qubit])
    }

    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [qubit])
    }

    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta), [qubit])
    }

    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta), [qubit])
    }

    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta), [qubit])
    }

    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        for i in 0..self.num_qubits {
            self.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Apply a barrier across the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    /// Physical qubit feeding each classical bit, ordered by classical bit.
    ///
    /// When a classical bit is written more than once the last measurement
    /// wins. Classical bits that are never written are absent.
    pub fn measured_qubits(&self) -> Vec<QubitId> {
        let mut by_clbit: BTreeMap<ClbitId, QubitId> = BTreeMap::new();
        for instruction in self.instructions.iter().filter(|i| i.is_measure()) {
            for (&qubit, &clbit) in instruction.qubits.iter().zip(&instruction.clbits) {
                by_clbit.insert(clbit, qubit);
            }
        }
        by_clbit.into_values().collect()
    }

    /// Strip measurements and barriers that are followed by nothing else.
    ///
    /// A measurement or barrier is final when no later kept operation touches
    /// any of its qubits or classical bits. Classical registers whose bits are
    /// all left idle by the removal are dropped and the remaining classical
    /// bits renumbered. Returns the number of removed instructions.
    pub fn remove_final_measurements(&mut self) -> usize {
        let mut busy_qubits: FxHashSet<QubitId> = FxHashSet::default();
        let mut busy_clbits: FxHashSet<ClbitId> = FxHashSet::default();
        let mut measured_finally: FxHashSet<ClbitId> = FxHashSet::default();
        let mut keep = vec![true; self.instructions.len()];

        for (i, instruction) in self.instructions.iter().enumerate().rev() {
            let is_final = matches!(
                instruction.kind,
                InstructionKind::Measure | InstructionKind::Barrier
            )
                && instruction.qubits.iter().all(|q| !busy_qubits.contains(q))
                && instruction.clbits.iter().all(|c| !busy_clbits.contains(c));
            if is_final {
                keep[i] = false;
                measured_finally.extend(instruction.clbits.iter().copied());
            } else {
                busy_qubits.extend(instruction.qubits.iter().copied());
                busy_clbits.extend(instruction.clbits.iter().copied());
            }
        }

        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }
        let mut flags = keep.into_iter();
        self.instructions
            .retain(|_| flags.next().unwrap_or(true));

        let idle: FxHashSet<u32> = measured_finally
            .iter()
            .filter(|c| !busy_clbits.contains(c))
            .map(|c| c.0)
            .collect();
        self.drop_idle_cregs(&idle);
        removed
    }

    /// Remove classical registers whose bits are all in `idle`, compacting the rest.
    fn drop_idle_cregs(&mut self, idle: &FxHashSet<u32>) {
        let mut remap: Vec<Option<u32>> = vec![None; self.num_clbits as usize];
        let mut kept = Vec::with_capacity(self.cregs.len());
        let mut next = 0u32;
        for reg in self.cregs.drain(..) {
            let all_idle = reg.size > 0 && (reg.start..reg.start + reg.size).all(|b| idle.contains(&b));
            if all_idle {
                continue;
            }
            for offset in 0..reg.size {
                remap[(reg.start + offset) as usize] = Some(next + offset);
            }
            kept.push(Register::new(reg.name, next, reg.size));
            next += reg.size;
        }
        self.cregs = kept;
        self.num_clbits = next;
        for instruction in &mut self.instructions {
            for clbit in &mut instruction.clbits {
                if let Some(Some(new)) = remap.get(clbit.index()) {
                    clbit.0 = *new;
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Whether qubits are addressed as hardware qubits (`$n`).
    pub fn is_physical(&self) -> bool {
        self.physical
    }

    /// Declared quantum registers in layout order.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Declared classical registers in layout order.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    pub fn qreg(&self, name: &str) -> Option<&Register> {
        self.qregs.iter().find(|r| r.name == name)
    }

    pub fn creg(&self, name: &str) -> Option<&Register> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Register and offset holding a qubit.
    pub fn locate_qubit(&self, qubit: QubitId) -> Option<(&Register, u32)> {
        self.qregs
            .iter()
            .find(|r| r.contains(qubit.0))
            .map(|r| (r, qubit.0 - r.start))
    }

    /// Register and offset holding a classical bit.
    pub fn locate_clbit(&self, clbit: ClbitId) -> Option<(&Register, u32)> {
        self.cregs
            .iter()
            .find(|r| r.contains(clbit.0))
            .map(|r| (r, clbit.0 - r.start))
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

fn grow(current: u32, by: u32, what: &str) -> IrResult<u32> {
    current
        .checked_add(by)
        .ok_or_else(|| IrError::SizeOverflow(format!("adding '{what}' exceeds u32 bits")))
}
