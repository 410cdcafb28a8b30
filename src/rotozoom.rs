//! Rotozoom texture writer.
//!
//! Fills the palette writes of a slot's body with texels sampled along a
//! rotated, scaled grid. Texture row `r` is shown by half-rows `2r` and `2r + 1`:
//! the first carries the odd columns, the second the even ones.

use crate::background::Rgb12;
use crate::copper::{ProgramBuffer, Region};
use crate::fixed::{cos, sin};
use crate::screen::{HALFROW_COLORS, ROTZOOM_H, ROTZOOM_W};
use crate::texture::Texture;

/// 8.8 texture coordinate pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Uv {
    pub u: i16,
    pub v: i16,
}

impl Uv {
    pub const fn new(u: i16, v: i16) -> Self {
        Self { u, v }
    }

    #[inline]
    pub fn offset(self, step: Uv, n: i16) -> Uv {
        Uv {
            u: self.u.wrapping_add(step.u.wrapping_mul(n)),
            v: self.v.wrapping_add(step.v.wrapping_mul(n)),
        }
    }
}

/// The palette-write cells of one slot body, addressed by texture row and column.
pub struct BodyCells<'a> {
    program: &'a mut ProgramBuffer,
    region: &'a Region,
}

impl<'a> BodyCells<'a> {
    pub fn new(program: &'a mut ProgramBuffer, region: &'a Region) -> Self {
        Self { program, region }
    }

    /// Program index holding texture cell `(row, col)`.
    pub fn index(region: &Region, row: usize, col: usize) -> usize {
        let half_row = 2 * row + 1 - (col & 1);
        region.body_color(half_row, col / 2)
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, color: Rgb12) {
        debug_assert!(row < ROTZOOM_H && col < ROTZOOM_W);
        debug_assert!(col / 2 < HALFROW_COLORS);
        self.program
            .set_move_value(Self::index(self.region, row, col), color);
    }
}

/// Sampling kernel run once per visible ball per frame.
pub trait Sampler {
    fn sample(&self, cells: &mut BodyCells<'_>, texture: &Texture, origin: Uv, col_step: Uv, row_step: Uv);
}

/// Nearest-texel sampling.
#[derive(Copy, Clone, Debug, Default)]
pub struct NearestSampler;

impl Sampler for NearestSampler {
    fn sample(&self, cells: &mut BodyCells<'_>, texture: &Texture, origin: Uv, col_step: Uv, row_step: Uv) {
        let mut line = origin;
        for row in 0..ROTZOOM_H {
            let mut uv = line;
            for col in 0..ROTZOOM_W {
                cells.set(row, col, texture.texel(uv.u, uv.v));
                uv = uv.offset(col_step, 1);
            }
            line = line.offset(row_step, 1);
        }
    }
}

/// Column step, row step and centred origin for a grid rotated by `angle` and scaled by `zoom`.
pub fn step_matrix(uv: Uv, angle: i16, zoom: i16) -> (Uv, Uv, Uv) {
    let s = ((zoom as i32 * sin(angle as i32)) >> 9) as i16;
    let c = ((zoom as i32 * cos(angle as i32)) >> 9) as i16;
    let col_step = Uv::new(s, c);
    let row_step = Uv::new(c, s.wrapping_neg());
    let half_w = (ROTZOOM_W / 2) as i16;
    let half_h = (ROTZOOM_H / 2) as i16;
    let origin = uv
        .offset(col_step, half_w.wrapping_neg())
        .offset(row_step, half_h.wrapping_neg());
    (origin, col_step, row_step)
}

/// Paint one slot body from `texture`.
pub fn paint<S: Sampler + ?Sized>(
    sampler: &S,
    program: &mut ProgramBuffer,
    region: &Region,
    texture: &Texture,
    uv: Uv,
    angle: i16,
    zoom: i16,
) {
    let (origin, col_step, row_step) = step_matrix(uv, angle, zoom);
    let mut cells = BodyCells::new(program, region);
    sampler.sample(&mut cells, texture, origin, col_step, row_step);
}
