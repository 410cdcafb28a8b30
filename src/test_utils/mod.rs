//! Shared fixtures for unit tests: textures, bitmaps, a built program and
//! balls placed at chosen rows.
//!
//! The bitmaps returned here are address tables only; nothing is uploaded.
//! Use `crate::assets::upload_balls` when pixels matter.

#![allow(dead_code)]

use std::rc::Rc;

use crate::background::BackgroundTable;
use crate::ball::{Ball, SizeClass};
use crate::copper::{self, Instruction, ProgramBuffer, ProgramLayout};
use crate::screen::{BALLS, BITMAP_ROW_BYTES, BITMAP_WIDTH};
use crate::texture::{BallBitmaps, Bitmap, Texture};

/// 4x4 texture of a single colour.
pub fn flat_texture(color: u16) -> Rc<Texture> {
    Rc::new(Texture::new(4, 4, vec![color; 16]).unwrap())
}

/// 32x32 texture whose texel at `(x, y)` is `y * 32 + x`.
pub fn ramp_texture() -> Texture {
    Texture::new(32, 32, (0..32 * 32).collect()).unwrap()
}

pub fn test_background() -> BackgroundTable {
    BackgroundTable::band(0x134, 0x001)
}

pub fn built_program() -> (ProgramBuffer, ProgramLayout) {
    copper::build(0, &test_background(), 0x134).unwrap()
}

fn bitmap(size: SizeClass, base: u32) -> Bitmap {
    let height = size.height() as usize;
    let plane_bytes = (height * BITMAP_ROW_BYTES) as u32;
    Bitmap {
        width: BITMAP_WIDTH,
        height,
        row_bytes: BITMAP_ROW_BYTES,
        planes: std::array::from_fn(|p| base + p as u32 * plane_bytes),
    }
}

pub fn test_bitmaps() -> BallBitmaps {
    BallBitmaps {
        small: bitmap(SizeClass::Small, 0x1_0000),
        large: bitmap(SizeClass::Large, 0x4_0000),
    }
}

/// Balls with default animation, centred horizontally, at the given rows.
pub fn balls_at(rows: [(SizeClass, i32); BALLS]) -> [Ball; BALLS] {
    let texture = flat_texture(0x0f0);
    rows.map(|(size, y)| Ball::new(Rc::clone(&texture), size, y))
}

/// Vertical position of the wait at `index`.
pub fn wait_line(program: &ProgramBuffer, index: usize) -> u16 {
    match program.get(index) {
        Some(Instruction::Wait { vp, .. }) => *vp,
        other => panic!("instruction {index} is not a wait: {other:?}"),
    }
}
