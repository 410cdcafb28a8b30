/*!
Display program model: instructions for a beam-synchronized list processor.

The processor walks an instruction list in lockstep with the video beam:
- `Wait` blocks until the beam reaches a (masked) vertical/horizontal position.
- `Move` writes a 16-bit value to a hardware register.
- `Jump` continues execution at an absolute index of the same list.

Submodules
- `program.rs`: fixed-capacity `ProgramBuffer`, its construction-only
  `ProgramBuilder`, and the operand setters used every frame.
- `layout.rs`: builds the complete effect program once per buffer and records
  the patchable offsets (`Region`, `BandRegion`).

Register numbers follow the classic custom-chip offsets so a program can be
handed to real hardware or to `crate::emulator`.
*/

pub mod layout;
pub mod program;

pub use layout::{BandRegion, PROGRAM_CAPACITY, ProgramLayout, Region, build};
pub use program::{ProgramBuffer, ProgramBuilder, ProgramError};

/// Custom-chip register offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Register(pub u16);

impl Register {
    pub const DIWSTRT: Register = Register(0x08e);
    pub const DIWSTOP: Register = Register(0x090);
    pub const DDFSTRT: Register = Register(0x092);
    pub const DDFSTOP: Register = Register(0x094);
    pub const DMACON: Register = Register(0x096);
    pub const BPLCON0: Register = Register(0x100);
    pub const BPLCON1: Register = Register(0x102);
    pub const BPL1MOD: Register = Register(0x108);
    pub const BPL2MOD: Register = Register(0x10a);
    /// Writes here have no effect.
    pub const NOP: Register = Register(0x1fe);

    const BPLPT_BASE: u16 = 0x0e0;
    const COLOR_BASE: u16 = 0x180;

    /// Colour register `n` (0..32).
    pub const fn color(n: usize) -> Register {
        Register(Self::COLOR_BASE + 2 * n as u16)
    }

    /// High word of bitplane pointer `plane`.
    pub const fn bplpth(plane: usize) -> Register {
        Register(Self::BPLPT_BASE + 4 * plane as u16)
    }

    /// Low word of bitplane pointer `plane`.
    pub const fn bplptl(plane: usize) -> Register {
        Register(Self::BPLPT_BASE + 4 * plane as u16 + 2)
    }

    pub fn color_index(self) -> Option<usize> {
        (Self::COLOR_BASE..Self::COLOR_BASE + 64)
            .contains(&self.0)
            .then(|| ((self.0 - Self::COLOR_BASE) / 2) as usize)
    }

    /// `(plane, is_high_word)` for bitplane pointer registers.
    pub fn bitplane_pointer(self) -> Option<(usize, bool)> {
        (Self::BPLPT_BASE..Self::BPLPT_BASE + 24)
            .contains(&self.0)
            .then(|| {
                let off = self.0 - Self::BPLPT_BASE;
                ((off / 4) as usize, off % 4 == 0)
            })
    }
}

pub const DMAF_SETCLR: u16 = 0x8000;
pub const DMAF_RASTER: u16 = 0x0100;
pub const BPLCON0_COLOR: u16 = 0x0200;

/// BPLCON0 value enabling `planes` bitplanes with colour output.
pub const fn bplcon0(planes: usize) -> u16 {
    BPLCON0_COLOR | ((planes as u16 & 7) << 12)
}

/// Number of planes encoded in a BPLCON0 value.
pub const fn bplcon0_planes(value: u16) -> usize {
    ((value >> 12) & 7) as usize
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Wait {
        vp: u16,
        hp: u16,
        vmask: u16,
        hmask: u16,
    },
    Move {
        reg: Register,
        value: u16,
    },
    Jump {
        target: usize,
    },
}

impl Instruction {
    /// Unmasked wait for beam position `(vp, hp)`.
    pub const fn wait(vp: u16, hp: u16) -> Self {
        Instruction::Wait {
            vp,
            hp,
            vmask: 0xffff,
            hmask: 0xffff,
        }
    }

    pub const fn write(reg: Register, value: u16) -> Self {
        Instruction::Move { reg, value }
    }

    pub const fn nop() -> Self {
        Instruction::Move {
            reg: Register::NOP,
            value: 0,
        }
    }

    pub const fn jump(target: usize) -> Self {
        Instruction::Jump { target }
    }

    /// Wait that is never satisfied: ends the list for this frame.
    pub const fn end() -> Self {
        Instruction::wait(0xffff, 0xfffe)
    }

    pub fn is_wait(&self) -> bool {
        matches!(self, Instruction::Wait { .. })
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Instruction::Move { .. })
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Instruction::Jump { .. })
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Instruction::Wait { vp: 0xffff, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_decoding() {
        assert_eq!(Register::color(0), Register(0x180));
        assert_eq!(Register::color(31).color_index(), Some(31));
        assert_eq!(Register::BPLCON0.color_index(), None);
        assert_eq!(Register::bplpth(4).bitplane_pointer(), Some((4, true)));
        assert_eq!(Register::bplptl(2).bitplane_pointer(), Some((2, false)));
        assert_eq!(Register::NOP.bitplane_pointer(), None);
    }

    #[test]
    fn bplcon0_round_trips_plane_count() {
        assert_eq!(bplcon0_planes(bplcon0(5)), 5);
        assert_eq!(bplcon0(0), BPLCON0_COLOR);
    }

    #[test]
    fn end_is_a_wait() {
        assert!(Instruction::end().is_wait());
        assert!(Instruction::end().is_end());
        assert!(!Instruction::wait(10, 0).is_end());
    }
}
