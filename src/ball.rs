/*!
Ball state and the rules that move it.

- Balls are kept top-to-bottom in a fixed array of `BALLS`. They never overlap
  vertically, so array order is depth order.
- Each frame every ball scrolls up. When the top ball has left the window it is
  rotated to the bottom of the array and re-randomized below the last ball,
  so the array always holds `BALLS` balls.
- Zoom bounces between `MIN_ZOOM` and `MAX_ZOOM`. A zoom outside the bounds is
  clamped back in on the next step and its direction points inward, so it
  cannot oscillate outside.
*/

use std::rc::Rc;

use crate::fixed::{SIN_MASK, normfx, sin};
use crate::rng::Random;
use crate::screen::{BALLS, HALF_ROWS, MAX_OFFSET_X, WINDOW_BOTTOM, WINDOW_TOP};
use crate::texture::Texture;

pub const MIN_ZOOM: i16 = 2;
pub const MAX_ZOOM: i16 = 80;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    /// Rows between `wait_before` and the first body half-row.
    pub const fn pad_top(self) -> usize {
        match self {
            SizeClass::Small => 5,
            SizeClass::Large => 6,
        }
    }

    /// Rows between the last body half-row and `wait_after`.
    pub const fn pad_bottom(self) -> usize {
        match self {
            SizeClass::Small => 8,
            SizeClass::Large => 10,
        }
    }

    /// Screen rows covered by one body half-row.
    pub const fn y_inc(self) -> i32 {
        match self {
            SizeClass::Small => 1,
            SizeClass::Large => 2,
        }
    }

    /// Disc diameter in pixels.
    pub const fn diameter(self) -> usize {
        match self {
            SizeClass::Small => 58,
            SizeClass::Large => 110,
        }
    }

    /// Rows from `wait_before` to `wait_after`.
    pub const fn height(self) -> i32 {
        (self.pad_top() + self.pad_bottom()) as i32 + HALF_ROWS as i32 * self.y_inc()
    }
}

/// Secondary zoom oscillation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Wobble {
    pub amplitude: i16,
    pub phase: i16,
    pub step: i16,
}

impl Wobble {
    pub fn offset(&self) -> i16 {
        normfx(self.amplitude as i32 * sin(self.phase as i32)) as i16
    }
}

#[derive(Clone, Debug)]
pub struct Ball {
    pub texture: Rc<Texture>,
    pub size: SizeClass,
    /// Horizontal offset from the window centre.
    pub screen_x: i16,
    /// Screen row of `wait_before`.
    pub screen_y: i32,
    pub angle: i16,
    pub angle_step: i16,
    pub zoom: i16,
    pub zoom_step: i16,
    pub wobble: Wobble,
    /// 8.8 texture origin and its per-frame drift.
    pub u: i16,
    pub v: i16,
    pub u_step: i16,
    pub v_step: i16,
}

/// One zoom step with bouncing at the bounds.
pub fn bounce_zoom(zoom: i16, step: i16) -> (i16, i16) {
    let next = zoom.saturating_add(step);
    if next < MIN_ZOOM {
        (MIN_ZOOM, step.saturating_abs().max(1))
    } else if next > MAX_ZOOM {
        (MAX_ZOOM, -step.saturating_abs().max(1))
    } else {
        (next, step)
    }
}

fn random_sign<R: Random>(rng: &mut R) -> i32 {
    if rng.chance() { 1 } else { -1 }
}

impl Ball {
    pub fn new(texture: Rc<Texture>, size: SizeClass, screen_y: i32) -> Self {
        Self {
            texture,
            size,
            screen_x: 0,
            screen_y,
            angle: 0,
            angle_step: 0,
            zoom: MIN_ZOOM,
            zoom_step: 1,
            wobble: Wobble::default(),
            u: 0,
            v: 0,
            u_step: 0,
            v_step: 0,
        }
    }

    /// A ball with randomized size, zoom, angle, velocities and horizontal offset.
    pub fn random<R: Random>(rng: &mut R, texture: Rc<Texture>, screen_y: i32) -> Self {
        let size = if rng.chance() {
            SizeClass::Large
        } else {
            SizeClass::Small
        };
        Self {
            texture,
            size,
            screen_x: rng.range(-(MAX_OFFSET_X as i32), MAX_OFFSET_X as i32) as i16,
            screen_y,
            angle: rng.range(0, SIN_MASK) as i16,
            angle_step: (rng.range(8, 32) * random_sign(rng)) as i16,
            zoom: rng.range(MIN_ZOOM as i32, MAX_ZOOM as i32) as i16,
            zoom_step: random_sign(rng) as i16,
            wobble: Wobble {
                amplitude: rng.range(0, 12) as i16,
                phase: rng.range(0, SIN_MASK) as i16,
                step: rng.range(24, 64) as i16,
            },
            u: rng.range(0, i16::MAX as i32) as i16,
            v: rng.range(0, i16::MAX as i32) as i16,
            u_step: rng.range(-192, 192) as i16,
            v_step: rng.range(-192, 192) as i16,
        }
    }

    pub fn height(&self) -> i32 {
        self.size.height()
    }

    /// First row below the ball.
    pub fn bottom(&self) -> i32 {
        self.screen_y + self.height()
    }

    pub fn is_visible(&self) -> bool {
        self.bottom() >= WINDOW_TOP && self.screen_y < WINDOW_BOTTOM
    }

    /// Fully scrolled out over the top of the window.
    pub fn is_above_window(&self) -> bool {
        self.bottom() < WINDOW_TOP
    }

    /// Zoom handed to the texture writer: base zoom plus wobble and `boost`, clamped.
    pub fn effective_zoom(&self, boost: i16) -> i16 {
        self.zoom
            .saturating_add(self.wobble.offset())
            .saturating_add(boost)
            .clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Per-frame texture animation: rotation, drift, zoom bounce, wobble.
    pub fn step_texture(&mut self) {
        self.angle = self.angle.wrapping_add(self.angle_step);
        self.u = self.u.wrapping_add(self.u_step);
        self.v = self.v.wrapping_add(self.v_step);
        (self.zoom, self.zoom_step) = bounce_zoom(self.zoom, self.zoom_step);
        self.wobble.phase = self.wobble.phase.wrapping_add(self.wobble.step);
    }
}

/// Vertical gap range used when placing a recycled ball.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spacing {
    pub min_gap: i32,
    pub max_gap: i32,
}

/// Initial set: randomized balls stacked from `first_row` downwards.
pub fn spawn<R: Random>(rng: &mut R, texture: &Rc<Texture>, first_row: i32, spacing: Spacing) -> [Ball; BALLS] {
    let mut row = first_row;
    std::array::from_fn(|_| {
        let ball = Ball::random(rng, Rc::clone(texture), row);
        row = ball.bottom() + rng.range(spacing.min_gap, spacing.max_gap);
        ball
    })
}

/// Scroll every ball up by `rows` and recycle balls that left the window.
///
/// Returns how many balls were recycled.
pub fn scroll<R: Random>(balls: &mut [Ball; BALLS], rows: i32, rng: &mut R, spacing: Spacing) -> usize {
    for ball in balls.iter_mut() {
        ball.screen_y -= rows;
    }

    let mut recycled = 0;
    while recycled < BALLS && balls[0].is_above_window() {
        balls.rotate_left(1);
        let below = balls[BALLS - 2].bottom() + rng.range(spacing.min_gap, spacing.max_gap);
        let texture = Rc::clone(&balls[BALLS - 1].texture);
        balls[BALLS - 1] = Ball::random(rng, texture, below.max(WINDOW_BOTTOM));
        log::debug!(
            "[Ball] Recycled top ball to row {} ({:?}, zoom {})",
            balls[BALLS - 1].screen_y,
            balls[BALLS - 1].size,
            balls[BALLS - 1].zoom
        );
        recycled += 1;
    }
    recycled
}

/// Pointer override for the top ball: horizontal offset and row, kept above the next ball.
pub fn steer(balls: &mut [Ball; BALLS], offset_x: i32, row: i32) {
    let limit = balls[1].screen_y - balls[0].height();
    let top = &mut balls[0];
    top.screen_x = offset_x.clamp(-(MAX_OFFSET_X as i32), MAX_OFFSET_X as i32) as i16;
    top.screen_y = row.min(limit);
}
