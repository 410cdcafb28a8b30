//! Effect parameters with their defaults. `main` overrides some of them from
//! the command line.

use crate::background::Rgb12;
use crate::ball::Spacing;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectConfig {
    pub seed: u64,
    /// Frames rendered by a headless run.
    pub frames: u32,
    /// Rows every ball scrolls up per frame when no `scroll` track is present.
    pub scroll_step: i32,
    /// Screen row of the first ball at start.
    pub first_row: i32,
    pub base_color: Rgb12,
    pub band_from: Rgb12,
    pub band_to: Rgb12,
    pub spacing: Spacing,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            seed: 0x1994,
            frames: 200,
            scroll_step: 1,
            first_row: 16,
            base_color: 0x134,
            band_from: 0x134,
            band_to: 0x001,
            spacing: Spacing {
                min_gap: 6,
                max_gap: 40,
            },
        }
    }
}
