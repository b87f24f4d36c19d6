//! Random rolls for combat.
//!
//! Every random number the combat engine consumes goes through a
//! [`DamageRoller`], so a test can pin the roll and assert exact damage
//! while a real session uses a seeded [`SeededRoller`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive integer range, e.g. `-3..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRange {
    pub low: i32,
    pub high: i32,
}

impl RollRange {
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Clamp `value` into the range.
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.low, self.high)
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.low..=self.high).contains(&value)
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }
}

impl fmt::Display for RollRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low, self.high)
    }
}

/// Source of the random offsets used in damage formulas.
///
/// Implementations must return a value inside `range`.
pub trait DamageRoller {
    fn roll(&mut self, range: RollRange) -> i32;
}

/// The default roller, backed by a seedable [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRoller {
    rng: StdRng,
}

impl SeededRoller {
    /// Deterministic roller; the same seed replays the same fight.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for SeededRoller {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl DamageRoller for SeededRoller {
    fn roll(&mut self, range: RollRange) -> i32 {
        if !range.is_valid() {
            return range.low;
        }
        self.rng.gen_range(range.low..=range.high)
    }
}

impl<R: DamageRoller + ?Sized> DamageRoller for Box<R> {
    fn roll(&mut self, range: RollRange) -> i32 {
        (**self).roll(range)
    }
}
