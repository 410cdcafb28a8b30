#![doc = r#"
Depth/visibility scheduler

Responsibilities
- Decide which slot shows which ball this frame and wire the jumps so the
  display program runs the slots and the background band in screen order.
- Patch the per-ball operands of live slots: plane pointers, horizontal shift,
  wait lines and the patchable cells between waits.
- Rewrite the band cells: a background colour write per row, except rows where
  a ball starting inside the band is entered.

Packing
- Visible balls keep their top-to-bottom order and fill the bottom-most slots;
  the last slot is always in use when anything is visible. Skipped slots are
  left stale and are never executed.

Jumps
- Execution enters at slot 0's entry jump. A skipped leading slot jumps to the
  head target: the first live slot when its ball starts above the band,
  otherwise band row 0.
- A live slot's exit goes to the next live slot if that ball starts above the
  band, otherwise to the first band row its own ball did not cover, or to the
  bottom program once the band is used up.
- A band row is either a colour write or a splice jump, never both.

Cells
- Each wait inside a slot is followed by a cell. If the next wait in the slot
  would land at or below the band bottom, the cell becomes a jump to the bottom
  program and the rest of the slot is dead; otherwise it writes the background
  colour for its row (a no-op outside the band).
"#]

use crate::background::BackgroundTable;
use crate::ball::{Ball, SizeClass};
use crate::copper::layout::{PAD_BOTTOM_PAIRS, PAD_TOP_PAIRS};
use crate::copper::{Instruction, ProgramBuffer, ProgramLayout, Region};
use crate::screen::{BALL_ORIGIN, BALLS, BAND_BOTTOM, BAND_ROWS, BAND_TOP, HALF_ROWS, beam_line};
use crate::texture::{BallBitmaps, Bitmap};

/// Where a jump lands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// `wait_before` of a slot.
    Slot(usize),
    /// Wait of a band row.
    BandRow(usize),
    Bottom,
}

impl Target {
    pub fn index(self, layout: &ProgramLayout) -> usize {
        match self {
            Target::Slot(s) => layout.slots[s].wait_before,
            Target::BandRow(n) if n < BAND_ROWS => layout.band.row_wait(n),
            Target::BandRow(_) | Target::Bottom => layout.bottom,
        }
    }
}

/// Where execution continues once `ball` is drawn: the first band row it did
/// not cover, or the bottom program.
fn after(ball: &Ball, background: &BackgroundTable) -> Target {
    match background.row_index(ball.bottom()) {
        n if n >= BAND_ROWS => Target::Bottom,
        n => Target::BandRow(n),
    }
}

/// One frame's slot assignment and jump wiring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Ball shown by each slot, `None` when the slot is skipped.
    pub slots: [Option<usize>; BALLS],
    pub entries: [Target; BALLS],
    pub exits: [Target; BALLS],
    /// `(band row, slot)` pairs where the band jumps into a slot.
    pub splices: Vec<(usize, usize)>,
}

impl Schedule {
    pub fn plan(balls: &[Ball; BALLS], background: &BackgroundTable) -> Self {
        let visible: Vec<usize> = (0..BALLS).filter(|&i| balls[i].is_visible()).collect();
        let first = BALLS - visible.len();

        let mut slots = [None; BALLS];
        for (n, &ball) in visible.iter().enumerate() {
            slots[first + n] = Some(ball);
        }

        let head = match visible.first() {
            Some(&b) if balls[b].screen_y < BAND_TOP => Target::Slot(first),
            _ => Target::BandRow(0),
        };

        let mut entries = [head; BALLS];
        let mut exits = [Target::Bottom; BALLS];
        let mut splices = Vec::new();

        for s in first..BALLS {
            let Some(b) = slots[s] else { continue };
            let ball = &balls[b];
            if s > first {
                entries[s] = Target::Slot(s);
            }
            if ball.screen_y >= BAND_TOP {
                splices.push(((ball.screen_y - BAND_TOP) as usize, s));
            }
            exits[s] = match slots.get(s + 1).copied().flatten() {
                Some(next) if balls[next].screen_y < BAND_TOP => Target::Slot(s + 1),
                _ => after(ball, background),
            };
        }

        log::debug!(
            "[Scheduler] slots {:?} entries {:?} exits {:?} splices {:?}",
            slots,
            entries,
            exits,
            splices
        );
        Self {
            slots,
            entries,
            exits,
            splices,
        }
    }

    /// Write the plan into `program`. Only operands and cells change.
    pub fn apply(
        &self,
        program: &mut ProgramBuffer,
        layout: &ProgramLayout,
        balls: &[Ball; BALLS],
        bitmaps: &BallBitmaps,
        background: &BackgroundTable,
    ) {
        for (s, region) in layout.slots.iter().enumerate() {
            program.set_jump_target(region.jump_target, self.entries[s].index(layout));
            program.set_jump_target(region.exit_jump, self.exits[s].index(layout));
            if let Some(b) = self.slots[s] {
                let ball = &balls[b];
                patch_slot(program, region, ball, bitmaps.get(ball.size), background, layout.bottom);
            }
        }

        for n in 0..BAND_ROWS {
            program.set_cell(layout.band.row_cell(n), background.write_for(BAND_TOP + n as i32));
        }
        for &(n, s) in &self.splices {
            program.set_cell(layout.band.row_cell(n), Instruction::jump(layout.slots[s].wait_before));
        }
    }
}

/// Horizontal placement: `(byte offset into the bitmap row, BPLCON1 value)`.
pub fn horizontal(screen_x: i16) -> (u32, u16) {
    let x = BALL_ORIGIN - screen_x as i32;
    let skip = ((x >> 3) & !1) as u32;
    let shift = (15 - (x & 15)) as u16;
    (skip, (shift << 4) | shift)
}

/// Screen rows of every wait after `wait_before`, in program order, ending with `wait_after`.
fn wait_rows(ball: &Ball) -> Vec<i32> {
    let y = ball.screen_y;
    let pad_top = ball.size.pad_top();
    let pad_bottom = ball.size.pad_bottom();
    let mut rows = Vec::with_capacity(PAD_TOP_PAIRS + HALF_ROWS + PAD_BOTTOM_PAIRS + 1);

    // Unused pairs repeat the last row of their padding.
    for i in 0..PAD_TOP_PAIRS {
        rows.push(y + i.min(pad_top - 1) as i32);
    }

    let body = y + pad_top as i32;
    match ball.size {
        SizeClass::Small => {
            for k in 0..HALF_ROWS as i32 {
                rows.push(body + k);
            }
        }
        SizeClass::Large => {
            for k in 0..HALF_ROWS as i32 {
                rows.push(body + 2 * k);
            }
        }
    }

    let below = body + HALF_ROWS as i32 * ball.size.y_inc();
    for i in 0..PAD_BOTTOM_PAIRS {
        rows.push(below + i.min(pad_bottom - 1) as i32);
    }
    rows.push(ball.bottom());
    rows
}

/// `(wait, cell)` indices in the order `wait_rows` lists them; the last entry has no cell.
fn wait_cells(region: &Region) -> Vec<(usize, Option<usize>)> {
    let top = (0..PAD_TOP_PAIRS).map(|i| (region.pad_top_wait(i), Some(region.pad_top_wait(i) + 1)));
    let body = (0..HALF_ROWS).map(|k| (region.body_wait(k), Some(region.body_cell(k))));
    let bottom =
        (0..PAD_BOTTOM_PAIRS).map(|i| (region.pad_bottom_wait(i), Some(region.pad_bottom_wait(i) + 1)));
    top.chain(body)
        .chain(bottom)
        .chain(std::iter::once((region.wait_after, None)))
        .collect()
}

fn patch_slot(
    program: &mut ProgramBuffer,
    region: &Region,
    ball: &Ball,
    bitmap: &Bitmap,
    background: &BackgroundTable,
    bottom: usize,
) {
    let y = ball.screen_y;
    let (skip, shift) = horizontal(ball.screen_x);
    let clip = (-y).max(0) as u32 * bitmap.row_bytes as u32;
    for (plane, &at) in region.bitplane_pointers.iter().enumerate() {
        program.set_move_value32(at, bitmap.planes[plane] + skip + clip);
    }
    program.set_move_value(region.shift_value, shift);
    program.set_wait_line(region.wait_before, beam_line(y));

    let rows = wait_rows(ball);
    let mut dead = false;
    for (j, (wait, cell)) in wait_cells(region).into_iter().enumerate() {
        program.set_wait_line(wait, beam_line(rows[j]));
        let Some(cell) = cell else { continue };
        let ins = if dead {
            Instruction::nop()
        } else if rows[j + 1] >= BAND_BOTTOM {
            dead = true;
            Instruction::jump(bottom)
        } else {
            background.write_for(rows[j])
        };
        program.set_cell(cell, ins);
    }
}
