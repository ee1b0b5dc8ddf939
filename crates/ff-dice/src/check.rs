//! d20 checks against a difficulty class.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// How the d20 is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    /// A single die.
    #[default]
    Normal,
    /// Roll twice, keep the higher die.
    Advantage,
    /// Roll twice, keep the lower die.
    Disadvantage,
}

/// The full detail of one resolved check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The kept die face, 1..=20.
    pub roll: u32,
    /// Flat bonus or penalty added to the roll.
    pub modifier: i64,
    /// `roll + modifier`.
    pub total: i64,
    /// The difficulty class the total was compared against.
    pub dc: i64,
    /// Whether `total >= dc`. Meeting the DC exactly succeeds.
    pub success: bool,
    /// How the die was rolled.
    pub mode: RollMode,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d20{:+} vs DC {}: rolled {}, total {}",
            self.modifier, self.dc, self.roll, self.total
        )?;
        match self.mode {
            RollMode::Normal => Ok(()),
            RollMode::Advantage => write!(f, " (advantage)"),
            RollMode::Disadvantage => write!(f, " (disadvantage)"),
        }
    }
}

/// The standard stat modifier: floor((value - 10) / 2), rounding
/// toward negative infinity. A stat of 9 gives -1, not 0.
pub fn stat_modifier(stat_value: i64) -> i64 {
    (stat_value - 10).div_euclid(2)
}

fn roll_d20(mode: RollMode, rng: &mut StdRng) -> u32 {
    let first: u32 = rng.random_range(1..=20);
    match mode {
        RollMode::Normal => first,
        RollMode::Advantage => first.max(rng.random_range(1..=20)),
        RollMode::Disadvantage => first.min(rng.random_range(1..=20)),
    }
}

/// Roll a d20 with a flat modifier against a difficulty class.
///
/// A single roll is final; there are no retries and no side effects.
pub fn check_with_modifier(
    modifier: i64,
    difficulty_class: i64,
    mode: RollMode,
    rng: &mut StdRng,
) -> CheckResult {
    let roll = roll_d20(mode, rng);
    let total = i64::from(roll) + modifier;
    CheckResult {
        roll,
        modifier,
        total,
        dc: difficulty_class,
        success: total >= difficulty_class,
        mode,
    }
}

/// Roll a raw d20 (modifier 0) against a difficulty class, for checks
/// not tied to any stat.
pub fn roll_check(difficulty_class: i64, mode: RollMode, rng: &mut StdRng) -> CheckResult {
    check_with_modifier(0, difficulty_class, mode, rng)
}

/// Roll a d20 with the modifier derived from a stat value.
pub fn stat_check(
    stat_value: i64,
    difficulty_class: i64,
    mode: RollMode,
    rng: &mut StdRng,
) -> CheckResult {
    check_with_modifier(stat_modifier(stat_value), difficulty_class, mode, rng)
}
