#![doc = r#"
Program layout

Responsibilities
- Lay out the complete effect program once per buffer.
- Record every patchable offset so per-frame code never searches the list.

Layout (in execution order)
- Setup: display window, fetch window, DMA, depth, shift, base colours, modulo.
- Three ball slots, each:
  * `jump_target`: entry jump; falls through when the slot is live, skips otherwise
  * `wait_before`: waits for the ball's first row
  * no-op, bitplane pointers (one pair per plane), shift write, depth write
  * top padding: `PAD_TOP_PAIRS` pairs of wait + patchable cell
  * body: `HALF_ROWS` half-rows of wait, 12 palette writes, patchable cell
  * bottom padding: `PAD_BOTTOM_PAIRS` pairs of wait + patchable cell
  * `wait_after`, depth/modulo restoration, `exit_jump`
- Background band: one wait + patchable cell per band row, then a jump to the
  bottom program.
- Bottom program: fixed footer ending with an end-of-list wait.

The sizes are constants; `PROGRAM_CAPACITY` is the exact worst case and the
builder refuses to grow past it.
"#]

use std::ops::Range;

use super::program::{ProgramBuffer, ProgramBuilder, ProgramError};
use super::{DMAF_RASTER, DMAF_SETCLR, Register, bplcon0};
use crate::background::{BackgroundTable, Rgb12};
use crate::ball::SizeClass;
use crate::screen::{
    BALLS, BAND_BOTTOM, BAND_ROWS, BAND_TOP, BITMAP_MODULO, COPWAIT_X, COPWAIT_X_BALLSTART,
    COPWAIT_X_BAND, DEPTH, DIW_TOP, HALF_ROWS, HALFROW_COLORS, WINDOW_HEIGHT, beam_line,
};

/// Colour registers written by each half-row. Phase 0 carries the odd texture
/// columns, phase 1 the even ones; registers used by sprites are left out.
pub const PHASE_COLORS: [[usize; HALFROW_COLORS]; 2] = [
    [3, 5, 7, 9, 11, 13, 15, 18, 20, 23, 27, 31],
    [2, 4, 6, 8, 10, 12, 14, 16, 19, 22, 24, 28],
];

/// Colour register showing texture column `col`.
pub const fn column_color(col: usize) -> usize {
    PHASE_COLORS[1 - (col & 1)][col / 2]
}

pub const SETUP_LEN: usize = 11;
pub const PAD_TOP_PAIRS: usize = 6;
pub const PAD_BOTTOM_PAIRS: usize = 10;
/// Wait, colour writes, cell.
pub const HALFROW_LEN: usize = 1 + HALFROW_COLORS + 1;
pub const SLOT_LEN: usize = 3
    + 2 * DEPTH
    + 2
    + 2 * PAD_TOP_PAIRS
    + HALF_ROWS * HALFROW_LEN
    + 2 * PAD_BOTTOM_PAIRS
    + 5;
pub const BAND_LEN: usize = 2 * BAND_ROWS + 1;

const FOOTER_COLORS: [Rgb12; 6] = [0x012, 0x011, 0x001, 0x002, 0x001, 0x000];
const FOOTER_STEP: i32 = 4;
pub const BOTTOM_LEN: usize = 2 + 2 * FOOTER_COLORS.len() + 3;

pub const PROGRAM_LEN: usize = SETUP_LEN + BALLS * SLOT_LEN + BAND_LEN + BOTTOM_LEN;
/// Instructions allocated per buffer.
pub const PROGRAM_CAPACITY: usize = PROGRAM_LEN;

const _: () = assert!(PAD_TOP_PAIRS >= SizeClass::Small.pad_top());
const _: () = assert!(PAD_TOP_PAIRS >= SizeClass::Large.pad_top());
const _: () = assert!(PAD_BOTTOM_PAIRS >= SizeClass::Small.pad_bottom());
const _: () = assert!(PAD_BOTTOM_PAIRS >= SizeClass::Large.pad_bottom());
const _: () = assert!(BAND_BOTTOM + FOOTER_STEP * FOOTER_COLORS.len() as i32 <= WINDOW_HEIGHT);

/// Patch points of one ball slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub jump_target: usize,
    pub wait_before: usize,
    /// Index of the high-word write of each plane pointer; the low word follows.
    pub bitplane_pointers: [usize; DEPTH],
    pub shift_value: usize,
    pub padding_top: usize,
    pub ball_body: usize,
    pub padding_bottom: usize,
    pub wait_after: usize,
    pub exit_jump: usize,
}

impl Region {
    pub fn pad_top_wait(&self, i: usize) -> usize {
        self.padding_top + 2 * i
    }

    pub fn pad_bottom_wait(&self, i: usize) -> usize {
        self.padding_bottom + 2 * i
    }

    pub fn body_wait(&self, half_row: usize) -> usize {
        self.ball_body + half_row * HALFROW_LEN
    }

    pub fn body_color(&self, half_row: usize, i: usize) -> usize {
        self.body_wait(half_row) + 1 + i
    }

    pub fn body_cell(&self, half_row: usize) -> usize {
        self.body_wait(half_row) + 1 + HALFROW_COLORS
    }

    /// Instructions painted by the texture writer and its padding.
    pub fn body_range(&self) -> Range<usize> {
        self.ball_body..self.padding_bottom
    }

    /// Whole slot, entry jump to exit jump.
    pub fn range(&self) -> Range<usize> {
        self.jump_target..self.exit_jump + 1
    }
}

/// Patch points of the background band section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BandRegion {
    pub rows: usize,
    pub exit_jump: usize,
}

impl BandRegion {
    pub fn row_wait(&self, n: usize) -> usize {
        self.rows + 2 * n
    }

    pub fn row_cell(&self, n: usize) -> usize {
        self.row_wait(n) + 1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProgramLayout {
    pub slots: [Region; BALLS],
    pub band: BandRegion,
    /// Entry of the fixed bottom program.
    pub bottom: usize,
}

fn emit_setup(b: &mut ProgramBuilder, base_color: Rgb12) -> Result<(), ProgramError> {
    let diw_bottom = DIW_TOP + WINDOW_HEIGHT;
    b.write(Register::DIWSTRT, ((DIW_TOP as u16 & 0xff) << 8) | 0x81)?;
    b.write(Register::DIWSTOP, ((diw_bottom as u16 & 0xff) << 8) | 0xc1)?;
    b.write(Register::DDFSTRT, 0x38)?;
    b.write(Register::DDFSTOP, 0xd0)?;
    b.write(Register::DMACON, DMAF_SETCLR | DMAF_RASTER)?;
    b.write(Register::BPLCON0, bplcon0(0))?;
    b.write(Register::BPLCON1, 0)?;
    b.write(Register::color(0), base_color)?;
    b.write(Register::color(1), 0x000)?;
    b.write(Register::BPL1MOD, BITMAP_MODULO as u16)?;
    b.write(Register::BPL2MOD, BITMAP_MODULO as u16)?;
    Ok(())
}

fn emit_slot(b: &mut ProgramBuilder) -> Result<Region, ProgramError> {
    let line = beam_line(0);
    let jump_target = b.jump(0)?;
    let wait_before = b.wait(line, COPWAIT_X_BALLSTART)?;
    b.nop()?;

    let mut bitplane_pointers = [0; DEPTH];
    for (plane, slot) in bitplane_pointers.iter_mut().enumerate() {
        *slot = b.write32(Register::bplpth(plane), Register::bplptl(plane), 0)?;
    }
    let shift_value = b.write(Register::BPLCON1, 0)?;
    b.write(Register::BPLCON0, bplcon0(DEPTH))?;

    let padding_top = b.cursor();
    for _ in 0..PAD_TOP_PAIRS {
        b.wait(line, COPWAIT_X)?;
        b.nop()?;
    }

    let ball_body = b.cursor();
    for half_row in 0..HALF_ROWS {
        b.wait(line, COPWAIT_X)?;
        for &color in &PHASE_COLORS[half_row & 1] {
            b.write(Register::color(color), 0)?;
        }
        b.nop()?;
    }

    let padding_bottom = b.cursor();
    for _ in 0..PAD_BOTTOM_PAIRS {
        b.wait(line, COPWAIT_X)?;
        b.nop()?;
    }

    let wait_after = b.wait(line, COPWAIT_X)?;
    b.write(Register::BPLCON0, bplcon0(0))?;
    b.write(Register::BPL1MOD, BITMAP_MODULO as u16)?;
    b.write(Register::BPL2MOD, BITMAP_MODULO as u16)?;
    let exit_jump = b.jump(0)?;

    Ok(Region {
        jump_target,
        wait_before,
        bitplane_pointers,
        shift_value,
        padding_top,
        ball_body,
        padding_bottom,
        wait_after,
        exit_jump,
    })
}

fn emit_band(b: &mut ProgramBuilder, background: &BackgroundTable) -> Result<BandRegion, ProgramError> {
    let rows = b.cursor();
    for n in 0..BAND_ROWS {
        let row = BAND_TOP + n as i32;
        b.wait(beam_line(row), COPWAIT_X_BAND)?;
        b.emit(background.write_for(row))?;
    }
    let exit_jump = b.jump(0)?;
    Ok(BandRegion { rows, exit_jump })
}

fn emit_bottom(b: &mut ProgramBuilder) -> Result<usize, ProgramError> {
    let bottom = b.wait(beam_line(BAND_BOTTOM), 0)?;
    b.write(Register::BPLCON0, bplcon0(0))?;
    for (i, &color) in FOOTER_COLORS.iter().enumerate() {
        b.wait(beam_line(BAND_BOTTOM + FOOTER_STEP * i as i32), COPWAIT_X_BAND)?;
        b.write(Register::color(0), color)?;
    }
    b.wait(beam_line(WINDOW_HEIGHT), COPWAIT_X)?;
    b.write(Register::color(0), 0x000)?;
    b.end()?;
    Ok(bottom)
}

/// Build a complete program for buffer `id`.
///
/// Every slot starts out skipped (entry jump to the band, exit jump to the
/// bottom program); the scheduler rewires them each frame.
pub fn build(
    id: u8,
    background: &BackgroundTable,
    base_color: Rgb12,
) -> Result<(ProgramBuffer, ProgramLayout), ProgramError> {
    let mut b = ProgramBuilder::new(id, PROGRAM_CAPACITY);
    emit_setup(&mut b, base_color)?;

    let mut slots = Vec::with_capacity(BALLS);
    for _ in 0..BALLS {
        slots.push(emit_slot(&mut b)?);
    }
    let band = emit_band(&mut b, background)?;
    let bottom = emit_bottom(&mut b)?;

    for slot in &slots {
        b.resolve_jump(slot.jump_target, band.rows);
        b.resolve_jump(slot.exit_jump, bottom);
    }
    b.resolve_jump(band.exit_jump, bottom);

    let slots: [Region; BALLS] = std::array::from_fn(|i| slots[i]);
    let program = b.finish();
    log::info!(
        "[Copper] Built program {}: {}/{} instructions",
        id,
        program.len(),
        program.capacity()
    );
    Ok((program, ProgramLayout { slots, band, bottom }))
}
