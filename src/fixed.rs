/*!
Fixed-point helpers shared by the timeline engine and the rotozoom writer.

- Angles are expressed in `SIN_PERIOD` steps per full turn (4096).
- Sine/cosine values are 12-bit fixed point: `FX12_ONE` (4096) is 1.0.
- The table is computed once on first use.
*/

use std::sync::OnceLock;

/// Fractional bits of the sine table values.
pub const FX12_SHIFT: u32 = 12;
/// 1.0 in 12-bit fixed point.
pub const FX12_ONE: i32 = 1 << FX12_SHIFT;
/// Number of angle steps per full turn.
pub const SIN_PERIOD: usize = 4096;
/// Angle mask (period is a power of two).
pub const SIN_MASK: i32 = SIN_PERIOD as i32 - 1;
/// Quarter turn.
pub const SIN_HALF_PI: i32 = SIN_PERIOD as i32 / 4;

static SINTAB: OnceLock<Vec<i16>> = OnceLock::new();

fn sintab() -> &'static [i16] {
    SINTAB.get_or_init(|| {
        (0..SIN_PERIOD)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / SIN_PERIOD as f64;
                (a.sin() * FX12_ONE as f64).round() as i16
            })
            .collect()
    })
}

/// Sine of `angle` (wraps), 12-bit fixed point.
#[inline]
pub fn sin(angle: i32) -> i32 {
    sintab()[(angle & SIN_MASK) as usize] as i32
}

/// Cosine of `angle` (wraps), 12-bit fixed point.
#[inline]
pub fn cos(angle: i32) -> i32 {
    sin(angle + SIN_HALF_PI)
}

/// Drop the 12 fractional bits of a product.
#[inline]
pub fn normfx(x: i32) -> i32 {
    x >> FX12_SHIFT
}

/// Integer division truncating toward zero; a zero divisor yields zero.
#[inline]
pub fn div_or_zero(num: i64, den: i64) -> i64 {
    if den == 0 { 0 } else { num / den }
}
