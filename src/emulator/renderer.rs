#![doc = r#"
Playfield renderer

Responsibilities
- Compose one framebuffer row from the enabled planes and the colour registers.
- Advance the plane pointers past the fetched data and modulo.

Notes
- Plane data is fetched from each pointer for `FETCH_BYTES` bytes; a shift of
  `s` delays the plane by `s` pixels and the leftmost `s` pixels read as 0.
- Colour words are 12-bit and expand to 8 bits per channel by nibble repetition.
"#]

use super::*;
use crate::background::Rgb12;
use super::registers::COLOR_REGISTERS;
use crate::screen::FETCH_BYTES;

/// 12-bit colour word to RGBA.
#[inline]
pub fn rgba(color: Rgb12) -> [u8; 4] {
    let r = ((color >> 8) & 0xf) as u8 * 17;
    let g = ((color >> 4) & 0xf) as u8 * 17;
    let b = (color & 0xf) as u8 * 17;
    [r, g, b, 0xff]
}

impl Emulator {
    pub(in crate::emulator) fn render_row(&mut self, row: usize) {
        let planes = self.regs.active_planes();
        let stride = WIDTH * BYTES_PER_PIXEL;
        let out = &mut self.framebuffer[row * stride..(row + 1) * stride];

        for x in 0..WIDTH {
            let mut index = 0usize;
            for plane in 0..planes {
                let shift = self.regs.shift(plane);
                let Some(src) = x.checked_sub(shift) else { continue };
                let byte = self.memory.read(self.regs.bplpt[plane].wrapping_add((src / 8) as u32));
                index |= (((byte >> (7 - src % 8)) & 1) as usize) << plane;
            }
            let px = rgba(self.regs.color[index % COLOR_REGISTERS]);
            out[x * BYTES_PER_PIXEL..(x + 1) * BYTES_PER_PIXEL].copy_from_slice(&px);
        }

        for plane in 0..planes {
            let advance = FETCH_BYTES as i32 + self.regs.modulo(plane) as i32;
            self.regs.bplpt[plane] = self.regs.bplpt[plane].wrapping_add_signed(advance);
        }
    }

    /// RGBA of framebuffer pixel `(x, row)`.
    pub fn pixel(&self, x: usize, row: usize) -> [u8; 4] {
        let at = (row * WIDTH + x) * BYTES_PER_PIXEL;
        let mut px = [0; 4];
        px.copy_from_slice(&self.framebuffer[at..at + BYTES_PER_PIXEL]);
        px
    }
}
