//! Achievement checking logic
//!
//! Sweeps the catalog in definition order and unlocks every achievement whose
//! condition holds. Rewards are granted immediately, so entries later in the
//! same sweep already observe them (a reward can push `total_exp` or `level`
//! over another entry's threshold).

use serde::{Deserialize, Serialize};
use tracing::info;

use super::definitions::{Catalog, ConditionContext};
use super::events::{ExpSource, ProgressionEvent, UnlockedAchievement};
use super::levels::LevelCurve;
use super::state::ProgressionState;

/// How many sweeps one evaluation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// One sweep per evaluation; results depend on catalog order
    #[default]
    SinglePass,
    /// Repeat sweeps until one unlocks nothing
    FixedPoint,
}

/// One sweep over the catalog. Returns the number of achievements unlocked.
fn sweep(
    state: &mut ProgressionState,
    catalog: &Catalog,
    curve: &LevelCurve,
    events: &mut Vec<ProgressionEvent>,
) -> usize {
    let mut unlocked = 0;

    for achievement in catalog.iter() {
        if state.is_unlocked(&achievement.id) {
            continue;
        }

        let ctx = ConditionContext {
            state: &*state,
            catalog_len: catalog.len(),
        };
        if !achievement.condition.is_met(&ctx) {
            continue;
        }

        info!(
            achievement = %achievement.id,
            reward = achievement.exp_reward,
            "Achievement unlocked"
        );
        state.unlocked_achievement_ids.push(achievement.id.clone());
        events.push(ProgressionEvent::AchievementUnlocked(
            UnlockedAchievement::from(achievement),
        ));
        unlocked += 1;

        if achievement.exp_reward > 0 {
            let amount = u64::from(achievement.exp_reward);
            events.push(ProgressionEvent::ExpGranted {
                amount,
                source: ExpSource::Achievement(achievement.id.clone()),
            });
            if let Some(level_up) = state.add_exp(amount, curve) {
                info!(level = level_up.new_level, "Level up from achievement reward");
                events.push(ProgressionEvent::LevelUp(level_up));
            }
        }
    }

    unlocked
}

/// Unlock every achievement whose condition currently holds
pub fn evaluate_achievements(
    state: &mut ProgressionState,
    catalog: &Catalog,
    curve: &LevelCurve,
    mode: EvaluationMode,
) -> Vec<ProgressionEvent> {
    let mut events = Vec::new();

    match mode {
        EvaluationMode::SinglePass => {
            sweep(state, catalog, curve, &mut events);
        }
        EvaluationMode::FixedPoint => {
            // Bounded by the catalog size: each productive sweep unlocks one or more
            while sweep(state, catalog, curve, &mut events) > 0 {}
        }
    }

    events
}
