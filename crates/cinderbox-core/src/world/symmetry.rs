//! Symmetry-breaking noise for the simulation passes
//!
//! All randomness in the core is a pure function of position and a per-tick
//! seed, never accumulated generator state. Re-running a tick with the same
//! seed and input generation reproduces the same output bit for bit, and
//! cells can be evaluated in any order (or in parallel) without changing
//! the result.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::SplitMix64;

/// Raw 64-bit noise for a position under a seed
pub fn position_noise(x: i32, y: i32, seed: u64) -> u64 {
    let packed = ((x as u32 as u64) << 32) | (y as u32 as u64);
    let key = seed ^ packed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    SplitMix64::seed_from_u64(key).next_u64()
}

/// Pick between two mirror-image rule arrangements at a block.
///
/// `salt` decorrelates distinct decision points at the same position.
pub fn tie_break(x: i32, y: i32, seed: u64, salt: u64) -> bool {
    position_noise(x, y, seed ^ salt) & 1 == 1
}

/// Uniform value in [0, 1) for probabilistic rules and jitter
pub fn unit_noise(x: i32, y: i32, seed: u64, salt: u64) -> f32 {
    // Top 24 bits keep full f32 precision
    (position_noise(x, y, seed ^ salt) >> 40) as f32 / (1u64 << 24) as f32
}

/// Derive a per-tick seed from the world seed and a tick counter
pub fn tick_seed(base: u64, tick: u64) -> u64 {
    SplitMix64::seed_from_u64(base ^ tick.wrapping_mul(0xd129_0d3b_53b7_56e5)).next_u64()
}
