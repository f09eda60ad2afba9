//! Achievement definitions and metadata
//!
//! Definitions are immutable data: unlock status lives in the progression
//! state, keyed by id, never on the definition itself.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ProgressionError;
use super::state::ProgressionState;

/// Everything a condition may read while being evaluated
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub state: &'a ProgressionState,
    /// Number of entries in the catalog being evaluated
    pub catalog_len: usize,
}

impl ConditionContext<'_> {
    pub fn unlocked_count(&self) -> usize {
        self.state.unlocked_achievement_ids.len()
    }
}

/// Unlock condition of an achievement
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    ProjectsViewed { at_least: usize },
    SkillsViewed { at_least: usize },
    ExperienceViews { at_least: u32 },
    Level { at_least: u32 },
    TotalExp { at_least: u64 },
    /// Every other catalog entry is unlocked
    AllOthersUnlocked,
    /// Arbitrary predicate, only available to catalogs built in code
    #[serde(skip)]
    Custom(fn(&ConditionContext<'_>) -> bool),
}

impl Condition {
    /// Evaluate against the current state. Never mutates anything.
    pub fn is_met(&self, ctx: &ConditionContext<'_>) -> bool {
        let state = ctx.state;
        match self {
            Self::ProjectsViewed { at_least } => state.viewed_project_ids.len() >= *at_least,
            Self::SkillsViewed { at_least } => state.viewed_skill_ids.len() >= *at_least,
            Self::ExperienceViews { at_least } => state.experience_view_count >= *at_least,
            Self::Level { at_least } => state.level >= *at_least,
            Self::TotalExp { at_least } => state.total_exp >= *at_least,
            Self::AllOthersUnlocked => ctx.unlocked_count() + 1 >= ctx.catalog_len,
            Self::Custom(predicate) => predicate(ctx),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectsViewed { at_least } => write!(f, "ProjectsViewed(>= {at_least})"),
            Self::SkillsViewed { at_least } => write!(f, "SkillsViewed(>= {at_least})"),
            Self::ExperienceViews { at_least } => write!(f, "ExperienceViews(>= {at_least})"),
            Self::Level { at_least } => write!(f, "Level(>= {at_least})"),
            Self::TotalExp { at_least } => write!(f, "TotalExp(>= {at_least})"),
            Self::AllOthersUnlocked => write!(f, "AllOthersUnlocked"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectsViewed { at_least } => write!(f, "view {at_least} project(s)"),
            Self::SkillsViewed { at_least } => write!(f, "view {at_least} skill(s)"),
            Self::ExperienceViews { at_least } => {
                write!(f, "open career history {at_least} time(s)")
            }
            Self::Level { at_least } => write!(f, "reach level {at_least}"),
            Self::TotalExp { at_least } => write!(f, "earn {at_least} EXP"),
            Self::AllOthersUnlocked => write!(f, "unlock every other achievement"),
            Self::Custom(_) => write!(f, "custom"),
        }
    }
}

/// Achievement definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    /// Granted once, at the moment of unlock
    #[serde(default)]
    pub exp_reward: u32,
    pub condition: Condition,
}

impl Achievement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        exp_reward: u32,
        condition: Condition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            icon: String::new(),
            exp_reward,
            condition,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }
}

/// Achievements shipped with the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAchievement {
    FirstProject,
    ProjectMaster,
    SkillExplorer,
    CareerHistorian,
    Level5,
    Level10,
    ExpMaster,
    PortfolioComplete,
}

impl BuiltinAchievement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstProject => "first_project",
            Self::ProjectMaster => "project_master",
            Self::SkillExplorer => "skill_explorer",
            Self::CareerHistorian => "career_historian",
            Self::Level5 => "level_5",
            Self::Level10 => "level_10",
            Self::ExpMaster => "exp_master",
            Self::PortfolioComplete => "portfolio_complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.as_str() == s)
    }

    /// All builtin achievements in evaluation order
    pub fn all() -> &'static [BuiltinAchievement] {
        &[
            Self::FirstProject,
            Self::ProjectMaster,
            Self::SkillExplorer,
            Self::CareerHistorian,
            Self::Level5,
            Self::Level10,
            Self::ExpMaster,
            Self::PortfolioComplete,
        ]
    }

    pub fn definition(&self) -> Achievement {
        let (name, description, icon, exp_reward, condition) = match self {
            Self::FirstProject => (
                "Project Explorer",
                "View your first project",
                "🚀",
                50,
                Condition::ProjectsViewed { at_least: 1 },
            ),
            Self::ProjectMaster => (
                "Project Master",
                "View every project",
                "📂",
                100,
                Condition::ProjectsViewed { at_least: 3 },
            ),
            Self::SkillExplorer => (
                "Skill Explorer",
                "Explore the skill tree",
                "🎯",
                75,
                Condition::SkillsViewed { at_least: 5 },
            ),
            Self::CareerHistorian => (
                "Career Historian",
                "Read through the whole work history",
                "📜",
                80,
                Condition::ExperienceViews { at_least: 4 },
            ),
            Self::Level5 => (
                "Rising Star",
                "Reach level 5",
                "⭐",
                150,
                Condition::Level { at_least: 5 },
            ),
            Self::Level10 => (
                "Code Wizard",
                "Reach level 10",
                "⚡",
                200,
                Condition::Level { at_least: 10 },
            ),
            Self::ExpMaster => (
                "EXP Master",
                "Earn 500 EXP",
                "💎",
                100,
                Condition::TotalExp { at_least: 500 },
            ),
            Self::PortfolioComplete => (
                "Portfolio Master",
                "Complete every other achievement",
                "🏆",
                300,
                Condition::AllOthersUnlocked,
            ),
        };

        Achievement::new(self.as_str(), name, exp_reward, condition)
            .with_description(description)
            .with_icon(icon)
    }
}

/// Ordered, id-unique list of achievement definitions
#[derive(Debug, Clone)]
pub struct Catalog {
    achievements: Vec<Achievement>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(achievements: Vec<Achievement>) -> Result<Self, ProgressionError> {
        let mut seen = HashSet::new();
        for achievement in &achievements {
            if !seen.insert(achievement.id.as_str()) {
                return Err(ProgressionError::DuplicateAchievement(
                    achievement.id.clone(),
                ));
            }
        }
        Ok(Self { achievements })
    }

    /// The portfolio's own achievements
    pub fn builtin() -> Self {
        Self {
            achievements: BuiltinAchievement::all()
                .iter()
                .map(BuiltinAchievement::definition)
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    /// Total possible XP from all achievements
    pub fn total_exp(&self) -> u64 {
        self.achievements.iter().map(|a| u64::from(a.exp_reward)).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order_and_ids() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "first_project",
                "project_master",
                "skill_explorer",
                "career_historian",
                "level_5",
                "level_10",
                "exp_master",
                "portfolio_complete",
            ]
        );
        assert_eq!(catalog.total_exp(), 1055);
    }

    #[test]
    fn test_builtin_id_roundtrip() {
        for builtin in BuiltinAchievement::all() {
            assert_eq!(BuiltinAchievement::from_str(builtin.as_str()), Some(*builtin));
        }
        assert_eq!(BuiltinAchievement::from_str("nope"), None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Catalog::new(vec![
            Achievement::new("a", "A", 10, Condition::Level { at_least: 2 }),
            Achievement::new("a", "A again", 10, Condition::Level { at_least: 3 }),
        ])
        .unwrap_err();
        assert_eq!(err, ProgressionError::DuplicateAchievement("a".to_string()));
    }

    #[test]
    fn test_all_others_unlocked_counts_siblings() {
        let mut state = ProgressionState::default();
        state.unlocked_achievement_ids = vec!["a".into(), "b".into()];
        let ctx = ConditionContext {
            state: &state,
            catalog_len: 4,
        };
        assert!(!Condition::AllOthersUnlocked.is_met(&ctx));

        state.unlocked_achievement_ids.push("c".into());
        let ctx = ConditionContext {
            state: &state,
            catalog_len: 4,
        };
        assert!(Condition::AllOthersUnlocked.is_met(&ctx));
    }

    #[test]
    fn test_custom_condition() {
        fn two_skills_and_a_project(ctx: &ConditionContext<'_>) -> bool {
            ctx.state.viewed_skill_ids.len() >= 2 && !ctx.state.viewed_project_ids.is_empty()
        }

        let mut state = ProgressionState::default();
        state.viewed_skill_ids.insert("rust".into());
        state.viewed_skill_ids.insert("go".into());
        let condition = Condition::Custom(two_skills_and_a_project);
        let ctx = ConditionContext {
            state: &state,
            catalog_len: 1,
        };
        assert!(!condition.is_met(&ctx));

        state.viewed_project_ids.insert("p1".into());
        let ctx = ConditionContext {
            state: &state,
            catalog_len: 1,
        };
        assert!(condition.is_met(&ctx));
    }
}
