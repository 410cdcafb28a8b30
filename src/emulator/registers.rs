#![doc = r#"
Emulator register file

Responsibilities
- Hold the custom-chip registers the display programs write.
- Apply `Move` instructions: colour words are masked to 12 bits, plane pointers
  are set one half at a time, DMACON follows the set/clear convention.

Writes to registers the emulator does not model (including the no-op register)
are ignored.
"#]

use crate::copper::{DMAF_RASTER, DMAF_SETCLR, Register, bplcon0_planes};

pub const COLOR_REGISTERS: usize = 32;
pub const MAX_PLANES: usize = 6;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub color: [u16; COLOR_REGISTERS],
    pub bplpt: [u32; MAX_PLANES],
    pub bplcon0: u16,
    pub bplcon1: u16,
    pub bpl1mod: i16,
    pub bpl2mod: i16,
    pub dmacon: u16,
    pub diwstrt: u16,
    pub diwstop: u16,
    pub ddfstrt: u16,
    pub ddfstop: u16,
}

impl Registers {
    pub fn write(&mut self, reg: Register, value: u16) {
        if let Some(n) = reg.color_index() {
            self.color[n] = value & 0x0fff;
            return;
        }
        if let Some((plane, high)) = reg.bitplane_pointer() {
            let pt = &mut self.bplpt[plane];
            *pt = if high {
                (*pt & 0x0000_ffff) | ((value as u32) << 16)
            } else {
                (*pt & 0xffff_0000) | value as u32
            };
            return;
        }
        match reg {
            Register::BPLCON0 => self.bplcon0 = value,
            Register::BPLCON1 => self.bplcon1 = value,
            Register::BPL1MOD => self.bpl1mod = value as i16,
            Register::BPL2MOD => self.bpl2mod = value as i16,
            Register::DMACON => {
                if value & DMAF_SETCLR != 0 {
                    self.dmacon |= value & !DMAF_SETCLR;
                } else {
                    self.dmacon &= !value;
                }
            }
            Register::DIWSTRT => self.diwstrt = value,
            Register::DIWSTOP => self.diwstop = value,
            Register::DDFSTRT => self.ddfstrt = value,
            Register::DDFSTOP => self.ddfstop = value,
            _ => {}
        }
    }

    /// Planes fetched on the current line.
    pub fn active_planes(&self) -> usize {
        if self.dmacon & DMAF_RASTER == 0 {
            return 0;
        }
        bplcon0_planes(self.bplcon0).min(MAX_PLANES)
    }

    /// Horizontal delay of plane `plane` (0-based): odd-numbered planes use the low nibble.
    pub fn shift(&self, plane: usize) -> usize {
        if plane & 1 == 0 {
            (self.bplcon1 & 0xf) as usize
        } else {
            ((self.bplcon1 >> 4) & 0xf) as usize
        }
    }

    pub fn modulo(&self, plane: usize) -> i16 {
        if plane & 1 == 0 { self.bpl1mod } else { self.bpl2mod }
    }
}
