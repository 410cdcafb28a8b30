//! Static background band: one colour per screen row between `BAND_TOP` and
//! `BAND_BOTTOM`, shared read-only by every ball and both program buffers.

use crate::copper::{Instruction, Register};
use crate::screen::{BAND_ROWS, BAND_TOP};

/// 12-bit RGB colour word (`0x0RGB`).
pub type Rgb12 = u16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundTable {
    top: i32,
    colors: Vec<Rgb12>,
}

fn channel(c: Rgb12, shift: u32) -> i32 {
    ((c >> shift) & 0xf) as i32
}

impl BackgroundTable {
    /// Linear per-channel gradient from `from` (first row) to `to` (last row).
    pub fn gradient(top: i32, rows: usize, from: Rgb12, to: Rgb12) -> Self {
        let last = rows.saturating_sub(1).max(1) as i32;
        let colors = (0..rows as i32)
            .map(|i| {
                [8, 4, 0].iter().fold(0u16, |acc, &shift| {
                    let a = channel(from, shift);
                    let b = channel(to, shift);
                    let v = a + (b - a) * i / last;
                    acc | ((v as u16 & 0xf) << shift)
                })
            })
            .collect();
        Self { top, colors }
    }

    /// The band used by the effect.
    pub fn band(from: Rgb12, to: Rgb12) -> Self {
        Self::gradient(BAND_TOP, BAND_ROWS, from, to)
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    /// First row below the band.
    pub fn bottom(&self) -> i32 {
        self.top + self.colors.len() as i32
    }

    pub fn rows(&self) -> usize {
        self.colors.len()
    }

    pub fn contains(&self, row: i32) -> bool {
        row >= self.top && row < self.bottom()
    }

    /// Band rows above `row`, clamped to `0..=rows`.
    pub fn row_index(&self, row: i32) -> usize {
        (row - self.top).clamp(0, self.colors.len() as i32) as usize
    }

    pub fn color(&self, index: usize) -> Rgb12 {
        self.colors[index.min(self.colors.len() - 1)]
    }

    pub fn color_at(&self, row: i32) -> Option<Rgb12> {
        self.contains(row).then(|| self.colors[(row - self.top) as usize])
    }

    /// Background write for a screen row: a COLOR00 write inside the band, a no-op elsewhere.
    pub fn write_for(&self, row: i32) -> Instruction {
        match self.color_at(row) {
            Some(c) => Instruction::write(Register::color(0), c),
            None => Instruction::nop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_hits_both_ends() {
        let t = BackgroundTable::gradient(10, 16, 0x0f0, 0x00f);
        assert_eq!(t.rows(), 16);
        assert_eq!(t.color(0), 0x0f0);
        assert_eq!(t.color(15), 0x00f);
        assert_eq!(t.color_at(10), Some(0x0f0));
        assert_eq!(t.color_at(9), None);
        assert_eq!(t.color_at(26), None);
    }

    #[test]
    fn row_index_clamps() {
        let t = BackgroundTable::gradient(100, 8, 0, 0);
        assert_eq!(t.row_index(50), 0);
        assert_eq!(t.row_index(103), 3);
        assert_eq!(t.row_index(500), 8);
    }

    #[test]
    fn writes_only_inside_band() {
        let t = BackgroundTable::gradient(100, 4, 0x123, 0x123);
        assert_eq!(t.write_for(101), Instruction::write(Register::color(0), 0x123));
        assert_eq!(t.write_for(99), Instruction::nop());
    }
}
