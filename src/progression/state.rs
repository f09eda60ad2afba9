//! Progression state model

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::levels::{LevelCurve, LevelUp};
use super::streaks::StreakInfo;

/// Complete progression state.
///
/// The store owns the canonical copy; readers and subscribers only ever see
/// owned snapshots of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub level: u32,
    /// XP within the current level
    pub exp: u64,
    pub exp_to_next_level: u64,
    /// Lifetime XP, never reset
    pub total_exp: u64,
    /// Unlocked achievement ids in unlock order
    pub unlocked_achievement_ids: Vec<String>,
    pub viewed_project_ids: BTreeSet<String>,
    pub viewed_skill_ids: BTreeSet<String>,
    /// Not deduplicated, every career history view counts
    pub experience_view_count: u32,
    /// Project quests whose reward was already claimed
    pub claimed_project_ids: BTreeSet<String>,
    pub daily_streak: StreakInfo,
}

impl ProgressionState {
    /// Fresh state at level 1 with the given first threshold
    pub fn new(base_exp_to_next_level: u64) -> Self {
        Self {
            level: 1,
            exp: 0,
            exp_to_next_level: base_exp_to_next_level,
            total_exp: 0,
            unlocked_achievement_ids: Vec::new(),
            viewed_project_ids: BTreeSet::new(),
            viewed_skill_ids: BTreeSet::new(),
            experience_view_count: 0,
            claimed_project_ids: BTreeSet::new(),
            daily_streak: StreakInfo::default(),
        }
    }

    /// Add XP and apply any level-ups it causes.
    ///
    /// The store only grants amounts that leave room for every catalog reward,
    /// so these additions never reach the saturation point in practice.
    pub(crate) fn add_exp(&mut self, amount: u64, curve: &LevelCurve) -> Option<LevelUp> {
        self.exp = self.exp.saturating_add(amount);
        self.total_exp = self.total_exp.saturating_add(amount);
        curve.apply(&mut self.level, &mut self.exp, &mut self.exp_to_next_level)
    }

    /// Progress towards the next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        if self.exp_to_next_level == 0 {
            return 1.0;
        }
        (self.exp as f32 / self.exp_to_next_level as f32).min(1.0)
    }

    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.unlocked_achievement_ids
            .iter()
            .any(|id| id == achievement_id)
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(100)
    }
}
