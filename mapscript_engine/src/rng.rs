//! Random numbers for dice rolls, spinners, traps and random awards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform integer in `min..=max`. Returns `min` when `max < min`.
    fn random_int(&mut self, min: u32, max: u32) -> u32;

    /// Percentile roll in `0..=99`.
    fn roll_dice100(&mut self) -> u32 {
        self.random_int(0, 99)
    }
}

/// Seedable RNG backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct GameRng(StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Seeded when `seed` is given, otherwise from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os, Self::seeded)
    }
}

impl RandomSource for GameRng {
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.0.random_range(min..=max)
    }
}

/// Replays a fixed list of values, cycling. Used by tests to script rolls.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRng {
    fn random_int(&mut self, min: u32, max: u32) -> u32 {
        if self.values.is_empty() {
            return min;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(min, max.max(min))
    }
}
