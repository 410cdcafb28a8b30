/*!
Reference display emulator: a beam-synchronized list processor driving a
planar playfield.

Model (frame granularity, not cycle accurate):
- The beam visits lines `0..BEAM_LINES`. On each line the processor runs until
  it meets a wait for a later position; every instruction that runs on a line
  takes effect before the line is shown.
- A wait is satisfied when the masked beam line is past `vp`, or on `vp` with
  the end-of-line horizontal position at or past `hp`. The end-of-list wait is
  never satisfied, so the processor idles until the next frame.
- Window lines `DIW_TOP..DIW_TOP + WINDOW_HEIGHT` are shown as framebuffer rows.
  Enabled planes are fetched from chip memory (`FETCH_BYTES` per plane), delayed
  by the BPLCON1 shift, and each pointer then advances by the fetch plus its
  modulo.
- A per-frame step budget turns a jump loop into `EmulatorFault::Runaway`
  instead of a hang.

STRUCTURE:
- `Emulator` holds chip memory, the register file, the framebuffer and an
  optional execution trace.
- `registers.rs` is the register file and its write semantics.
- `memory.rs` is the chip memory bump allocator.
- `renderer.rs` turns the register state into framebuffer rows.
*/

use std::fmt;
use std::ops::Range;

use crate::copper::{Instruction, PROGRAM_CAPACITY, ProgramBuffer};
use crate::screen::{BEAM_LINES, DIW_TOP, WIDTH, WINDOW_HEIGHT};

pub(crate) mod memory;
pub(crate) mod registers;
pub(crate) mod renderer;

pub use memory::ChipMemory;
pub use registers::Registers;

/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;
/// Horizontal beam position at which a line is considered finished.
pub const LINE_END_HP: u16 = 0xe2;
/// Instructions one frame may execute before it is treated as a runaway.
pub const STEP_BUDGET: usize = 4 * PROGRAM_CAPACITY;
/// Chip memory reserved by `Emulator::new`.
pub const CHIP_MEMORY_BYTES: usize = 512 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmulatorFault {
    /// The step budget ran out, typically a jump cycle that never waits.
    Runaway { steps: usize, pc: usize },
    /// A jump left the program.
    PcOutOfRange { pc: usize, len: usize },
    OutOfChipMemory { requested: usize, free: usize },
}

impl fmt::Display for EmulatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorFault::Runaway { steps, pc } => {
                write!(f, "display program ran {steps} steps without finishing the frame (pc {pc})")
            }
            EmulatorFault::PcOutOfRange { pc, len } => {
                write!(f, "display program counter {pc} outside program of {len} instructions")
            }
            EmulatorFault::OutOfChipMemory { requested, free } => {
                write!(f, "chip memory exhausted: requested {requested} bytes, {free} free")
            }
        }
    }
}

impl std::error::Error for EmulatorFault {}

/// One executed instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub index: usize,
    pub line: u16,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub steps: usize,
    /// The end-of-list wait was reached.
    pub ended: bool,
}

pub struct Emulator {
    memory: ChipMemory,
    regs: Registers,
    framebuffer: Vec<u8>,
    trace: Option<Vec<TraceEntry>>,
    frames: u64,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a wait lets the processor continue on `line`.
#[inline]
pub fn wait_satisfied(ins: &Instruction, line: u16) -> bool {
    match *ins {
        Instruction::Wait { vp, hp, vmask, hmask } => {
            let beam = line & vmask;
            let target = vp & vmask;
            beam > target || (beam == target && (LINE_END_HP & hmask) >= (hp & hmask))
        }
        _ => true,
    }
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_memory(ChipMemory::new(CHIP_MEMORY_BYTES))
    }

    pub fn with_memory(memory: ChipMemory) -> Self {
        Self {
            memory,
            regs: Registers::default(),
            framebuffer: vec![0; WIDTH * WINDOW_HEIGHT as usize * BYTES_PER_PIXEL],
            trace: None,
            frames: 0,
        }
    }

    pub fn memory(&self) -> &ChipMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ChipMemory {
        &mut self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// RGBA framebuffer, `WIDTH` x `WINDOW_HEIGHT`.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start or stop recording executed instructions. Cleared at every frame.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled.then(Vec::new);
    }

    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// Whether any instruction in `range` ran during the last traced frame.
    pub fn executed_any(&self, range: Range<usize>) -> bool {
        self.trace().iter().any(|t| range.contains(&t.index))
    }

    /// Beam line on which instruction `index` last ran.
    pub fn executed_at(&self, index: usize) -> Option<u16> {
        self.trace().iter().rev().find(|t| t.index == index).map(|t| t.line)
    }

    /// Run `program` for one frame and redraw the framebuffer.
    pub fn run_frame(&mut self, program: &ProgramBuffer) -> Result<FrameStats, EmulatorFault> {
        if let Some(t) = self.trace.as_mut() {
            t.clear();
        }
        let mut stats = FrameStats::default();
        let mut pc = program.entry();

        for line in 0..BEAM_LINES {
            loop {
                let ins = program.get(pc).ok_or(EmulatorFault::PcOutOfRange {
                    pc,
                    len: program.len(),
                })?;
                if ins.is_wait() && !wait_satisfied(ins, line) {
                    stats.ended |= ins.is_end();
                    break;
                }
                stats.steps += 1;
                if stats.steps > STEP_BUDGET {
                    log::warn!("[Emulator] Runaway program at pc {} on line {}", pc, line);
                    return Err(EmulatorFault::Runaway {
                        steps: stats.steps,
                        pc,
                    });
                }
                if let Some(t) = self.trace.as_mut() {
                    t.push(TraceEntry { index: pc, line });
                }
                match *ins {
                    Instruction::Wait { .. } => pc += 1,
                    Instruction::Move { reg, value } => {
                        self.regs.write(reg, value);
                        pc += 1;
                    }
                    Instruction::Jump { target } => pc = target,
                }
            }

            let row = line as i32 - DIW_TOP;
            if (0..WINDOW_HEIGHT).contains(&row) {
                self.render_row(row as usize);
            }
        }

        self.frames += 1;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests;
