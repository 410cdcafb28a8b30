//! Procedural assets: the rotozoom texture and the ball bitmaps.
//!
//! A ball bitmap does not carry colours. Each pixel holds the colour register
//! of the texture column it belongs to, so rewriting the registers per
//! half-row paints the texture onto the disc. The disc is centred at
//! `BITMAP_CENTER` and spans the body rows of its size class; a one pixel
//! ring in colour 1 outlines it.

use crate::background::Rgb12;
use crate::ball::SizeClass;
use crate::copper::layout::column_color;
use crate::emulator::{ChipMemory, EmulatorFault};
use crate::fixed::sin;
use crate::screen::{BITMAP_CENTER, BITMAP_ROW_BYTES, BITMAP_WIDTH, DEPTH, HALF_ROWS, ROTZOOM_W};
use crate::texture::{BallBitmaps, Bitmap, Texture, TextureError};

pub const TEXTURE_SIZE: usize = 128;
/// Colour register of the disc outline.
pub const OUTLINE_COLOR: usize = 1;

/// 128x128 pattern: a warped checkerboard over a slow colour gradient.
pub fn texture() -> Result<Texture, TextureError> {
    let mut texels = Vec::with_capacity(TEXTURE_SIZE * TEXTURE_SIZE);
    for y in 0..TEXTURE_SIZE as i32 {
        for x in 0..TEXTURE_SIZE as i32 {
            let warp = sin(y * 64) >> 10;
            let checker = (((x + warp) >> 4) ^ (y >> 4)) & 1;
            let r = (x >> 3) as Rgb12 & 0xf;
            let g = (y >> 3) as Rgb12 & 0xf;
            let texel = if checker == 0 {
                (r << 8) | (g << 4) | 0x4
            } else {
                ((15 - r) << 4) | 0xf
            };
            texels.push(texel);
        }
    }
    Texture::new(TEXTURE_SIZE, TEXTURE_SIZE, texels)
}

/// Rows of the disc within the bitmap: the body of the size class.
fn disc_rows(size: SizeClass) -> (i32, i32) {
    let top = size.pad_top() as i32;
    (top, top + HALF_ROWS as i32 * size.y_inc())
}

/// Colour register for bitmap pixel `(px, row)`, 0 outside the disc.
pub fn ball_pixel(size: SizeClass, px: i32, row: i32) -> usize {
    let (top, bottom) = disc_rows(size);
    let radius_x = size.diameter() as i32 / 2;
    let radius_y = (bottom - top) / 2;
    let dx = px - BITMAP_CENTER;
    let dy = row - (top + radius_y);

    // Ellipse test in integer form: dx²/rx² + dy²/ry² <= 1.
    let rx2 = (radius_x * radius_x) as i64;
    let ry2 = (radius_y * radius_y) as i64;
    let lhs = dx as i64 * dx as i64 * ry2 + dy as i64 * dy as i64 * rx2;
    let edge = rx2 * ry2;
    if lhs > edge {
        return 0;
    }
    let inner_x = (radius_x - 1) as i64;
    let inner_y = (radius_y - 1) as i64;
    if dx as i64 * dx as i64 * inner_y * inner_y + dy as i64 * dy as i64 * inner_x * inner_x
        > inner_x * inner_x * inner_y * inner_y
    {
        return OUTLINE_COLOR;
    }

    let left = BITMAP_CENTER - radius_x;
    let col = ((px - left) * ROTZOOM_W as i32 / size.diameter() as i32).clamp(0, ROTZOOM_W as i32 - 1);
    column_color(col as usize)
}

/// Planar data for one size class: `DEPTH` planes of `height` rows.
pub fn ball_planes(size: SizeClass) -> Vec<Vec<u8>> {
    let height = size.height() as usize;
    let mut planes = vec![vec![0u8; height * BITMAP_ROW_BYTES]; DEPTH];
    for row in 0..height {
        for px in 0..BITMAP_WIDTH {
            let index = ball_pixel(size, px as i32, row as i32);
            if index == 0 {
                continue;
            }
            let at = row * BITMAP_ROW_BYTES + px / 8;
            let bit = 0x80 >> (px % 8);
            for (plane, data) in planes.iter_mut().enumerate() {
                if index & (1 << plane) != 0 {
                    data[at] |= bit;
                }
            }
        }
    }
    planes
}

pub fn upload_ball(memory: &mut ChipMemory, size: SizeClass) -> Result<Bitmap, EmulatorFault> {
    let mut bases = [0u32; DEPTH];
    for (base, data) in bases.iter_mut().zip(ball_planes(size)) {
        *base = memory.upload(&data)?;
    }
    Ok(Bitmap {
        width: BITMAP_WIDTH,
        height: size.height() as usize,
        row_bytes: BITMAP_ROW_BYTES,
        planes: bases,
    })
}

/// Generate and upload both ball bitmaps.
pub fn upload_balls(memory: &mut ChipMemory) -> Result<BallBitmaps, EmulatorFault> {
    let bitmaps = BallBitmaps {
        small: upload_ball(memory, SizeClass::Small)?,
        large: upload_ball(memory, SizeClass::Large)?,
    };
    log::info!(
        "[Assets] Uploaded ball bitmaps, {} bytes of chip memory left",
        memory.free()
    );
    Ok(bitmaps)
}
