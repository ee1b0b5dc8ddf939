//! d20 check resolution.
//!
//! Pure functions: a stat value or flat modifier plus a difficulty
//! class go in, a pass/fail verdict with full roll detail comes out.
//! Nothing here persists or logs; callers decide what to do with a
//! result. All randomness flows through a caller-supplied `StdRng`,
//! so tests seed and replay rolls deterministically.

/// Check resolution: rolls, modifiers, and verdicts.
pub mod check;
/// Stat-block generation for character creation.
pub mod generate;

/// Re-export check types and entry points.
pub use check::{CheckResult, RollMode, check_with_modifier, roll_check, stat_check, stat_modifier};
/// Re-export stat-block rolling.
pub use generate::roll_stat_block;
