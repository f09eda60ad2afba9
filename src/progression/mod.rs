//! Gamification engine: XP, levels, achievements and the daily streak
//!
//! # Architecture
//!
//! ```text
//!   screens ──track/grant──▶ ProgressionStore ──evaluate──▶ Catalog (checker)
//!      ▲                            │                          │
//!      └───────── snapshot ◀────────┴──── rewards / level-ups ◀┘
//! ```
//!
//! # Usage
//!
//! ```
//! use questfolio::progression::ProgressionStore;
//!
//! let store = ProgressionStore::default();
//! let subscription = store.subscribe(|state| println!("level {}", state.level));
//!
//! store.track_project_viewed("portfolio-app");
//! assert!(store.snapshot().is_unlocked("first_project"));
//!
//! subscription.unsubscribe();
//! ```

mod checker;
mod definitions;
mod error;
mod events;
mod levels;
mod state;
mod store;
mod streaks;
mod subscribers;

pub use checker::{evaluate_achievements, EvaluationMode};
pub use definitions::{Achievement, BuiltinAchievement, Catalog, Condition, ConditionContext};
pub use error::ProgressionError;
pub use events::{ExpSource, ProgressionEvent, UnlockedAchievement};
pub use levels::{LevelCurve, LevelUp, RemainderPolicy, XpRewards};
pub use state::ProgressionState;
pub use store::{AchievementStatus, AchievementSummary, CheckInOutcome, ClaimOutcome, ProgressionStore};
pub use streaks::{today, StreakInfo};
pub use subscribers::{Listener, Subscribers, Subscription};
