//! Random sources shared by every engine.
//!
//! All randomness flows through one [`RandomSource`] owned by the session, so
//! a seed (or a scripted roll sequence) fully determines the outcome of a run.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from an empty pool");
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let index = (self.roll() * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }

    /// True with probability `chance`.
    fn chance(&mut self, chance: f64) -> bool {
        self.roll() < chance
    }
}

/// Deterministic ChaCha20 stream keyed by a user-visible seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    rng: ChaCha20Rng,
    draws: u64,
}

impl SeededRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha20Rng::from_seed(seed_bytes(seed)),
            draws: 0,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws taken from this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SeededRng {
    fn roll(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.gen_range(0.0..1.0)
    }
}

fn seed_bytes(seed: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (chunk_index, chunk) in bytes.chunks_exact_mut(8).enumerate() {
        let mixed = seed ^ (chunk_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        chunk.copy_from_slice(&mixed.to_be_bytes());
    }
    bytes
}

/// Scripted rolls for tests and replays.
///
/// Rolls are served in order; once the script is exhausted the last value
/// repeats forever.
#[derive(Debug, Clone)]
pub struct FixedRolls {
    script: VecDeque<f64>,
    last: f64,
    draws: u64,
}

impl FixedRolls {
    /// Always return `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            script: VecDeque::new(),
            last: value,
            draws: 0,
        }
    }

    /// Serve `values` in order, then repeat the final one.
    #[must_use]
    pub fn sequence<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let script: VecDeque<f64> = values.into_iter().collect();
        let last = script.back().copied().unwrap_or(0.0);
        Self {
            script,
            last,
            draws: 0,
        }
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for FixedRolls {
    fn roll(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.script.pop_front().unwrap_or(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_are_reproducible() {
        let mut a = SeededRng::new(0xC0FFEE);
        let mut b = SeededRng::new(0xC0FFEE);
        for _ in 0..16 {
            assert!((a.roll() - b.roll()).abs() <= f64::EPSILON);
        }
        assert_eq!(a.draws(), 16);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let left: Vec<f64> = (0..4).map(|_| a.roll()).collect();
        let right: Vec<f64> = (0..4).map(|_| b.roll()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn rolls_stay_in_unit_interval() {
        let mut rng = SeededRng::new(99);
        for _ in 0..1_000 {
            let value = rng.roll();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn fixed_rolls_repeat_last_value() {
        let mut rolls = FixedRolls::sequence([0.2, 0.8]);
        assert!((rolls.roll() - 0.2).abs() <= f64::EPSILON);
        assert!((rolls.roll() - 0.8).abs() <= f64::EPSILON);
        assert!((rolls.roll() - 0.8).abs() <= f64::EPSILON);
        assert_eq!(rolls.draws(), 3);
    }

    #[test]
    fn pick_maps_rolls_onto_indices() {
        let mut rolls = FixedRolls::sequence([0.0, 0.5, 0.999]);
        assert_eq!(rolls.pick(4), 0);
        assert_eq!(rolls.pick(4), 2);
        assert_eq!(rolls.pick(4), 3);
    }
}
