//! XP and Level system
//!
//! Defines how the level-up threshold grows and what happens to surplus XP
//! when a level is reached.

use serde::{Deserialize, Serialize};

/// What happens to `exp` beyond the threshold when leveling up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Subtract the threshold and keep the rest (allows multi-level jumps)
    #[default]
    Carry,
    /// Drop the surplus, `exp` restarts at 0 on every level-up
    Reset,
}

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub exp_to_next_level: u64,
}

/// Threshold growth and remainder handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCurve {
    pub base_exp_to_next_level: u64,
    pub growth_factor: f64,
    pub remainder: RemainderPolicy,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_exp_to_next_level: 100,
            growth_factor: 1.5,
            remainder: RemainderPolicy::Carry,
        }
    }
}

impl LevelCurve {
    /// Threshold for the level after the one `current` applies to.
    ///
    /// Always strictly larger than `current`, so the level-up loop terminates
    /// even for growth factors that floor back to the same value.
    pub fn next_threshold(&self, current: u64) -> u64 {
        let grown = (current as f64 * self.growth_factor).floor();
        let grown = if grown >= u64::MAX as f64 {
            u64::MAX
        } else {
            grown as u64
        };
        grown.max(current.saturating_add(1))
    }

    /// Apply level-ups until `exp < exp_to_next_level`.
    ///
    /// Returns `None` when no level was gained.
    pub fn apply(&self, level: &mut u32, exp: &mut u64, exp_to_next_level: &mut u64) -> Option<LevelUp> {
        let old_level = *level;

        while *exp >= *exp_to_next_level {
            *level = level.saturating_add(1);
            *exp = match self.remainder {
                RemainderPolicy::Carry => *exp - *exp_to_next_level,
                RemainderPolicy::Reset => 0,
            };
            *exp_to_next_level = self.next_threshold(*exp_to_next_level);
        }

        (*level > old_level).then(|| LevelUp {
            old_level,
            new_level: *level,
            exp_to_next_level: *exp_to_next_level,
        })
    }
}

/// XP rewards for the actions the portfolio screens grant directly
pub struct XpRewards;

impl XpRewards {
    /// Pressing "start journey" on the home screen
    pub const START_JOURNEY: u32 = 5;

    /// Practicing a skill from its detail page
    pub const SKILL_PRACTICE: u32 = 50;

    /// Solving the code puzzle that unlocks the contact form
    pub const CONTACT_PUZZLE: u32 = 50;

    /// Sending the contact form
    pub const CONTACT_SENT: u32 = 30;
}
