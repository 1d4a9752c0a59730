//! Deterministic RNG based on splitmix64.
//! Per-day draws come from one sub-stream per grid row, so the assignment of
//! draws to cells does not depend on how rows are split across workers.

pub const SALT_INIT: u64 = 0x5EED_1417_0000_0001;
const SALT_DAY: u64 = 0x5EED_DA75_0000_0002;

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seed of the draw stream for one row on one day.
#[inline]
pub fn row_stream(seed: u64, day: usize, row: usize) -> u64 {
    let mut h = splitmix64(seed ^ SALT_DAY);
    h = splitmix64(h ^ (day as u64).wrapping_mul(0x85EBCA6B_C2B2AE35));
    splitmix64(h ^ (row as u64).wrapping_mul(0xC2B2AE3D_27D4EB4F))
}

/// Sequential splitmix64 stream.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = splitmix64(self.state);
        self.state
    }

    /// Uniform in [0, 1) with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    pub fn range_usize(&mut self, max: usize) -> usize {
        (self.next_u64() % max as u64) as usize
    }
}
