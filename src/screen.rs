//! Screen geometry shared by the program builder, scheduler and emulator.
//!
//! Rows are screen rows relative to the top of the display window. Beam lines
//! are absolute (what WAIT instructions compare against).

/// Display window width in pixels.
pub const WIDTH: usize = 320;
/// Display window height in rows.
pub const WINDOW_HEIGHT: i32 = 280;
/// Beam line of screen row 0.
pub const DIW_TOP: i32 = 0x2c - 12;
/// Beam lines per frame.
pub const BEAM_LINES: u16 = 313;

/// Bitplanes used by the balls.
pub const DEPTH: usize = 5;
/// Number of balls (and program slots).
pub const BALLS: usize = 3;

/// First row of the background gradient band.
pub const BAND_TOP: i32 = 200;
/// Row where the fixed bottom program takes over.
pub const BAND_BOTTOM: i32 = 256;
/// Rows in the background band.
pub const BAND_ROWS: usize = (BAND_BOTTOM - BAND_TOP) as usize;

/// Balls are visible inside `[WINDOW_TOP, WINDOW_BOTTOM)`.
pub const WINDOW_TOP: i32 = 0;
pub const WINDOW_BOTTOM: i32 = BAND_BOTTOM;

/// Texture cells per ball row and texture rows per ball.
pub const ROTZOOM_W: usize = 24;
pub const ROTZOOM_H: usize = 24;
/// Colour writes per half-row (one column phase).
pub const HALFROW_COLORS: usize = ROTZOOM_W / 2;
/// Each texture row is shown as two half-rows with alternating column phase.
pub const HALF_ROWS: usize = ROTZOOM_H * 2;

/// Ball bitmaps are twice the window wide so horizontal placement is a pointer offset.
pub const BITMAP_WIDTH: usize = WIDTH * 2;
pub const BITMAP_ROW_BYTES: usize = BITMAP_WIDTH / 8;
/// Bytes fetched per plane per row.
pub const FETCH_BYTES: usize = WIDTH / 8;
/// Modulo added after each fetched row.
pub const BITMAP_MODULO: i16 = (BITMAP_ROW_BYTES - FETCH_BYTES) as i16;
/// Bitmap column at which the ball disc is centred.
pub const BITMAP_CENTER: i32 = (BITMAP_WIDTH / 2) as i32;
/// Horizontal scroll origin: `x = BALL_ORIGIN - screen_x` puts the disc centre
/// at window column `WIDTH / 2 + screen_x` once the 15-pixel shift is applied.
pub const BALL_ORIGIN: i32 = BITMAP_CENTER - (WIDTH / 2) as i32 + 15;
/// Limits for the horizontal offset of a ball.
pub const MAX_OFFSET_X: i16 = 100;

/// Horizontal WAIT positions.
pub const COPWAIT_X: u16 = 1;
pub const COPWAIT_X_BALLSTART: u16 = 160;
pub const COPWAIT_X_BAND: u16 = 7;

/// Beam line for a screen row; rows above the window clamp to row 0.
#[inline]
pub fn beam_line(row: i32) -> u16 {
    (DIW_TOP + row.max(0)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_lines_clamp_above_window() {
        assert_eq!(beam_line(0), DIW_TOP as u16);
        assert_eq!(beam_line(-40), DIW_TOP as u16);
        assert_eq!(beam_line(BAND_TOP), (DIW_TOP + BAND_TOP) as u16);
    }

    #[test]
    fn band_fits_in_window() {
        assert!(BAND_TOP < BAND_BOTTOM);
        assert!(BAND_BOTTOM < WINDOW_HEIGHT);
        assert!(((DIW_TOP + WINDOW_HEIGHT) as u16) < BEAM_LINES);
    }
}
