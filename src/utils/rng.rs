//! Simple random number generator for reproducibility.
//!
//! This module provides a lightweight xorshift-based PRNG so that networks
//! can be constructed deterministically and independently of each other.
//! Every constructor that randomizes parameters takes an explicit `SimpleRng`
//! instance; there is no process-global random state.

/// Simple RNG for reproducible weight initialization.
///
/// Uses the xorshift algorithm for fast, deterministic random number
/// generation. Two generators created with the same seed produce identical
/// sequences, so two networks built from them have identical parameters.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    /// Basic xorshift to generate u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Convert to [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        // Use the top 53 bits so the value fits the f64 mantissa exactly.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}
