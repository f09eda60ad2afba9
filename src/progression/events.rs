//! Events produced by progression mutations

use serde::Serialize;

use super::definitions::Achievement;
use super::levels::LevelUp;

/// Where granted XP came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ExpSource {
    /// Direct grant from a screen action
    Action,
    /// One-time project quest reward
    ProjectQuest(String),
    /// Achievement unlock reward
    Achievement(String),
}

/// An achievement that was just unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub exp_reward: u32,
}

impl From<&Achievement> for UnlockedAchievement {
    fn from(achievement: &Achievement) -> Self {
        Self {
            id: achievement.id.clone(),
            name: achievement.name.clone(),
            icon: achievement.icon.clone(),
            exp_reward: achievement.exp_reward,
        }
    }
}

/// Something noteworthy that happened during a mutation, in occurrence order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressionEvent {
    ExpGranted { amount: u64, source: ExpSource },
    LevelUp(LevelUp),
    AchievementUnlocked(UnlockedAchievement),
    StreakExtended { count: u32 },
}

impl std::fmt::Display for ProgressionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpGranted { amount, source } => match source {
                ExpSource::Action => write!(f, "+{amount} EXP"),
                ExpSource::ProjectQuest(id) => write!(f, "+{amount} EXP (project {id})"),
                ExpSource::Achievement(id) => write!(f, "+{amount} EXP (achievement {id})"),
            },
            Self::LevelUp(up) => write!(f, "Level up! {} -> {}", up.old_level, up.new_level),
            Self::AchievementUnlocked(a) => {
                write!(f, "Achievement unlocked: {} {} (+{} EXP)", a.icon, a.name, a.exp_reward)
            }
            Self::StreakExtended { count } => write!(f, "Daily streak: {count}"),
        }
    }
}
