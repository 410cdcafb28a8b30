//! Seedable pseudo-random source used when recycling balls.
//!
//! The driver owns one generator and passes it down; nothing here is global,
//! so two runs with the same seed produce the same frames.

/// Source of pseudo-random numbers.
pub trait Random {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `lo..=hi`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as u32 + 1;
        lo + (self.next_u32() % span) as i32
    }

    /// Fair coin.
    fn chance(&mut self) -> bool {
        self.next_u32() & 0x8000 != 0
    }
}

/// xorshift64* generator.
#[derive(Clone, Debug)]
pub struct XorShift {
    state: u64,
}

impl XorShift {
    pub fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s >> 12;
        s ^= s << 25;
        s ^= s >> 27;
        self.state = s;
        s.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl Random for XorShift {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}
