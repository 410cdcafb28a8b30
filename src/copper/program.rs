/*!
Fixed-capacity display program buffers.

Construction
- A `ProgramBuilder` owns the instruction storage while the program is laid
  out. Each emit helper returns the index of the emitted instruction so callers
  can record patch points.
- Emitting past the declared capacity fails with `ProgramError::CapacityExceeded`.
  Capacities are static constants, so this only fires when the sizing constants
  disagree with the layout code.
- `finish` seals the builder into a `ProgramBuffer`.

Patching
- A `ProgramBuffer` has no way to insert or remove instructions. Per-frame work
  goes through the operand setters, which keep the instruction count and order.
- `set_cell` may change the kind of a single instruction in place (colour write
  to jump and back); it is meant for the cells the layout reserves for that.
*/

use std::fmt;

use super::{Instruction, Register};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramError {
    CapacityExceeded { capacity: usize },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::CapacityExceeded { capacity } => {
                write!(f, "display program exceeds its capacity of {capacity} instructions")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// Emits instructions into a fresh buffer.
#[derive(Debug)]
pub struct ProgramBuilder {
    id: u8,
    capacity: usize,
    instructions: Vec<Instruction>,
}

impl ProgramBuilder {
    pub fn new(id: u8, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            instructions: Vec::with_capacity(capacity),
        }
    }

    /// Index the next emitted instruction will get.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.instructions.len()
    }

    pub fn emit(&mut self, ins: Instruction) -> Result<usize, ProgramError> {
        if self.instructions.len() >= self.capacity {
            return Err(ProgramError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.instructions.push(ins);
        Ok(self.instructions.len() - 1)
    }

    pub fn wait(&mut self, vp: u16, hp: u16) -> Result<usize, ProgramError> {
        self.emit(Instruction::wait(vp, hp))
    }

    pub fn write(&mut self, reg: Register, value: u16) -> Result<usize, ProgramError> {
        self.emit(Instruction::write(reg, value))
    }

    /// Two writes setting a 32-bit pointer register pair; returns the index of the high word.
    pub fn write32(&mut self, high: Register, low: Register, value: u32) -> Result<usize, ProgramError> {
        let at = self.write(high, (value >> 16) as u16)?;
        self.write(low, value as u16)?;
        Ok(at)
    }

    pub fn nop(&mut self) -> Result<usize, ProgramError> {
        self.emit(Instruction::nop())
    }

    pub fn jump(&mut self, target: usize) -> Result<usize, ProgramError> {
        self.emit(Instruction::jump(target))
    }

    pub fn end(&mut self) -> Result<usize, ProgramError> {
        self.emit(Instruction::end())
    }

    /// Fix up a forward jump emitted before its target existed.
    pub fn resolve_jump(&mut self, at: usize, target: usize) {
        if let Some(Instruction::Jump { target: t }) = self.instructions.get_mut(at) {
            *t = target;
        }
    }

    pub fn finish(self) -> ProgramBuffer {
        ProgramBuffer {
            id: self.id,
            capacity: self.capacity,
            instructions: self.instructions,
            entry: 0,
        }
    }
}

/// A built display program. Length and layout are frozen; operands are not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramBuffer {
    id: u8,
    capacity: usize,
    instructions: Vec<Instruction>,
    entry: usize,
}

impl ProgramBuffer {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Index execution starts at.
    pub fn entry(&self) -> usize {
        self.entry
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Set the vertical position of the wait at `index`.
    pub fn set_wait_line(&mut self, index: usize, line: u16) {
        match self.instructions.get_mut(index) {
            Some(Instruction::Wait { vp, .. }) => *vp = line,
            other => debug_assert!(false, "set_wait_line({index}) on {other:?}"),
        }
    }

    /// Set the value written by the move at `index`.
    pub fn set_move_value(&mut self, index: usize, value: u16) {
        match self.instructions.get_mut(index) {
            Some(Instruction::Move { value: v, .. }) => *v = value,
            other => debug_assert!(false, "set_move_value({index}) on {other:?}"),
        }
    }

    /// Set a 32-bit pointer written by the move pair starting at `index`.
    pub fn set_move_value32(&mut self, index: usize, value: u32) {
        self.set_move_value(index, (value >> 16) as u16);
        self.set_move_value(index + 1, value as u16);
    }

    /// Set the target of the jump at `index`.
    pub fn set_jump_target(&mut self, index: usize, target: usize) {
        debug_assert!(target < self.instructions.len(), "jump target {target} out of range");
        match self.instructions.get_mut(index) {
            Some(Instruction::Jump { target: t }) => *t = target,
            other => debug_assert!(false, "set_jump_target({index}) on {other:?}"),
        }
    }

    /// Replace a patchable cell with a non-wait instruction.
    pub fn set_cell(&mut self, index: usize, ins: Instruction) {
        debug_assert!(!ins.is_wait(), "cells never hold waits");
        if let Some(slot) = self.instructions.get_mut(index) {
            debug_assert!(!slot.is_wait(), "cell {index} is a wait");
            *slot = ins;
        }
    }
}
