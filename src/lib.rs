//! Questfolio - progression engine of a gamified developer portfolio
//!
//! The portfolio screens (home, skills, projects, experience, achievements,
//! contact) report what the visitor does; this crate turns those actions into
//! XP, levels, achievement unlocks and a daily streak, and notifies every
//! subscribed screen with a fresh snapshot after each change.
//!
//! ## Entry points
//!
//! 1. **[`progression::ProgressionStore`]**: the state container screens
//!    share. Built directly or from a [`config::Config`].
//!
//! 2. **`questfolio` binary**: lists the catalog and replays action scripts
//!    for inspecting the leveling curve.

pub mod config;
pub mod progression;

pub use progression::{ProgressionError, ProgressionState, ProgressionStore};
