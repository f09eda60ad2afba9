//! Progression Store - single source of truth for XP, level and unlocks
//!
//! Every mutation runs under one lock: the base change, the achievement
//! evaluation it triggers and the snapshot all happen before the lock is
//! released. The snapshot is queued for subscribers before the lock is
//! released and delivered afterwards, exactly once per mutation that changed
//! something. A mutation made from inside a listener is delivered once the
//! current snapshot has reached every listener.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::checker::{evaluate_achievements, EvaluationMode};
use super::definitions::{Achievement, Catalog};
use super::error::ProgressionError;
use super::events::{ExpSource, ProgressionEvent};
use super::levels::LevelCurve;
use super::state::ProgressionState;
use super::subscribers::{Subscribers, Subscription};

/// Result of claiming a project quest reward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed(Vec<ProgressionEvent>),
    AlreadyClaimed,
}

/// Result of a daily check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    CheckedIn {
        streak: u32,
        events: Vec<ProgressionEvent>,
    },
    AlreadyCheckedIn,
}

/// Catalog entry paired with its unlock status
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}

/// Achievement progress overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementSummary {
    pub unlocked: usize,
    pub total: usize,
    /// XP earned from unlocked achievements
    pub earned_exp: u64,
}

struct Engine {
    state: ProgressionState,
    catalog: Catalog,
    curve: LevelCurve,
    mode: EvaluationMode,
}

/// Owns the progression state and fans out changes to subscribers.
///
/// Construct one at the application root and share it (`Arc`) with every
/// screen that needs it.
pub struct ProgressionStore {
    engine: Mutex<Engine>,
    subscribers: Subscribers,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self::new(Catalog::builtin(), LevelCurve::default(), EvaluationMode::default())
    }
}

impl ProgressionStore {
    pub fn new(catalog: Catalog, curve: LevelCurve, mode: EvaluationMode) -> Self {
        Self {
            engine: Mutex::new(Engine {
                state: ProgressionState::new(curve.base_exp_to_next_level),
                catalog,
                curve,
                mode,
            }),
            subscribers: Subscribers::new(),
        }
    }

    fn engine(&self) -> MutexGuard<'_, Engine> {
        // Nothing panics while the lock is held; listeners run after release
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `change` under the lock. `Ok(None)` means nothing changed: no
    /// evaluation, no notification.
    fn mutate<F, E>(&self, change: F) -> Result<Option<Vec<ProgressionEvent>>, E>
    where
        F: FnOnce(&mut Engine) -> Result<Option<Vec<ProgressionEvent>>, E>,
    {
        let events = {
            let mut engine = self.engine();
            let Some(mut events) = change(&mut *engine)? else {
                return Ok(None);
            };

            let Engine {
                state,
                catalog,
                curve,
                mode,
            } = &mut *engine;
            events.extend(evaluate_achievements(state, catalog, curve, *mode));

            debug!(
                level = state.level,
                total_exp = state.total_exp,
                "Queueing progression snapshot"
            );
            self.subscribers.publish(state.clone());
            events
        };

        self.subscribers.deliver();
        Ok(Some(events))
    }

    // ========================================
    // XP
    // ========================================

    /// Grant XP. Negative amounts are rejected without touching the state.
    ///
    /// Zero is accepted and still notifies subscribers.
    pub fn grant_exp(&self, amount: i64) -> Result<Vec<ProgressionEvent>, ProgressionError> {
        let events = self.mutate::<_, ProgressionError>(|engine| {
            let amount = u64::try_from(amount).map_err(|_| {
                warn!(amount, "Rejected negative XP grant");
                ProgressionError::InvalidArgument(format!(
                    "XP amount must not be negative, got {amount}"
                ))
            })?;
            ensure_headroom(engine, amount)?;
            Ok(Some(grant(engine, amount, ExpSource::Action)))
        })?;

        Ok(events.unwrap_or_default())
    }

    /// Grant a project quest's reward, once per project.
    ///
    /// Fails like [`grant_exp`](Self::grant_exp) when the reward would
    /// overflow the lifetime total; the project stays unclaimed.
    pub fn claim_project_reward(
        &self,
        project_id: &str,
        reward: u32,
    ) -> Result<ClaimOutcome, ProgressionError> {
        let result = self.mutate::<_, ProgressionError>(|engine| {
            if engine.state.claimed_project_ids.contains(project_id) {
                debug!(project = project_id, "Project reward already claimed");
                return Ok(None);
            }
            let amount = u64::from(reward);
            ensure_headroom(engine, amount)?;
            engine.state.claimed_project_ids.insert(project_id.to_string());
            let source = ExpSource::ProjectQuest(project_id.to_string());
            Ok(Some(grant(engine, amount, source)))
        })?;

        Ok(match result {
            Some(events) => ClaimOutcome::Claimed(events),
            None => ClaimOutcome::AlreadyClaimed,
        })
    }

    // ========================================
    // TRACKING
    // ========================================

    /// Record that a project was viewed. Repeat views change nothing.
    pub fn track_project_viewed(&self, project_id: &str) -> Vec<ProgressionEvent> {
        self.track(|state| {
            let inserted = state.viewed_project_ids.insert(project_id.to_string());
            if inserted {
                debug!(project = project_id, "Project viewed");
            }
            inserted
        })
    }

    /// Record that a skill was viewed. Repeat views change nothing.
    pub fn track_skill_viewed(&self, skill_id: &str) -> Vec<ProgressionEvent> {
        self.track(|state| {
            let inserted = state.viewed_skill_ids.insert(skill_id.to_string());
            if inserted {
                debug!(skill = skill_id, "Skill viewed");
            }
            inserted
        })
    }

    /// Record a career history view. Every call counts.
    pub fn track_experience_viewed(&self) -> Vec<ProgressionEvent> {
        self.track(|state| {
            state.experience_view_count = state.experience_view_count.saturating_add(1);
            debug!(count = state.experience_view_count, "Experience viewed");
            true
        })
    }

    fn track<F>(&self, change: F) -> Vec<ProgressionEvent>
    where
        F: FnOnce(&mut ProgressionState) -> bool,
    {
        let result: Result<_, Infallible> =
            self.mutate(|engine| Ok(change(&mut engine.state).then(Vec::new)));
        match result {
            Ok(events) => events.unwrap_or_default(),
            Err(never) => match never {},
        }
    }

    /// Record the daily check-in for `today`
    pub fn check_in(&self, today: NaiveDate) -> CheckInOutcome {
        let mut streak = 0;
        let result: Result<_, Infallible> = self.mutate(|engine| {
            let Some(count) = engine.state.daily_streak.check_in(today) else {
                return Ok(None);
            };
            info!(streak = count, "Daily check-in");
            streak = count;
            Ok(Some(vec![ProgressionEvent::StreakExtended { count }]))
        });

        match result {
            Ok(Some(events)) => CheckInOutcome::CheckedIn { streak, events },
            Ok(None) => CheckInOutcome::AlreadyCheckedIn,
            Err(never) => match never {},
        }
    }

    // ========================================
    // READS
    // ========================================

    /// Owned copy of the current state
    pub fn snapshot(&self) -> ProgressionState {
        self.engine().state.clone()
    }

    /// Catalog entries with their unlock status, in catalog order
    pub fn achievements(&self) -> Vec<AchievementStatus> {
        let engine = self.engine();
        engine
            .catalog
            .iter()
            .map(|achievement| AchievementStatus {
                achievement: achievement.clone(),
                unlocked: engine.state.is_unlocked(&achievement.id),
            })
            .collect()
    }

    pub fn summary(&self) -> AchievementSummary {
        let engine = self.engine();
        let unlocked: Vec<&Achievement> = engine
            .catalog
            .iter()
            .filter(|a| engine.state.is_unlocked(&a.id))
            .collect();

        AchievementSummary {
            unlocked: unlocked.len(),
            total: engine.catalog.len(),
            earned_exp: unlocked.iter().map(|a| u64::from(a.exp_reward)).sum(),
        }
    }

    // ========================================
    // SUBSCRIPTIONS
    // ========================================

    /// Register a listener called with a snapshot after every change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressionState) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Reject `amount` unless the lifetime total can still absorb it plus every
/// catalog reward, so later unlocks never saturate `total_exp`.
fn ensure_headroom(engine: &Engine, amount: u64) -> Result<(), ProgressionError> {
    let fits = engine
        .state
        .total_exp
        .checked_add(amount)
        .and_then(|total| total.checked_add(engine.catalog.total_exp()))
        .is_some();
    if !fits {
        warn!(amount, "Rejected XP grant overflowing total");
        return Err(ProgressionError::InvalidArgument(format!(
            "XP amount {amount} overflows the lifetime total"
        )));
    }
    Ok(())
}

/// Add `amount` through the level curve, recording what happened
fn grant(engine: &mut Engine, amount: u64, source: ExpSource) -> Vec<ProgressionEvent> {
    let mut events = Vec::new();
    if amount > 0 {
        events.push(ProgressionEvent::ExpGranted { amount, source });
    }
    if let Some(level_up) = engine.state.add_exp(amount, &engine.curve) {
        info!(
            old_level = level_up.old_level,
            new_level = level_up.new_level,
            "Level up"
        );
        events.push(ProgressionEvent::LevelUp(level_up));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::definitions::Condition;
    use crate::progression::levels::RemainderPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(store: &ProgressionStore) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    fn empty_catalog_store(curve: LevelCurve) -> ProgressionStore {
        ProgressionStore::new(Catalog::new(Vec::new()).unwrap(), curve, EvaluationMode::SinglePass)
    }

    #[test]
    fn test_grant_exp_levels_up_with_carry() {
        let store = empty_catalog_store(LevelCurve::default());
        let events = store.grant_exp(150).unwrap();

        let state = store.snapshot();
        assert_eq!(state.level, 2);
        assert_eq!(state.exp, 50);
        assert_eq!(state.exp_to_next_level, 150);
        assert_eq!(state.total_exp, 150);
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressionEvent::LevelUp(up) if up.new_level == 2)));
    }

    #[test]
    fn test_grant_exp_reset_policy() {
        let store = empty_catalog_store(LevelCurve {
            remainder: RemainderPolicy::Reset,
            ..LevelCurve::default()
        });
        store.grant_exp(150).unwrap();

        let state = store.snapshot();
        assert_eq!((state.level, state.exp, state.total_exp), (2, 0, 150));
    }

    #[test]
    fn test_negative_grant_rejected_without_notification() {
        let store = ProgressionStore::default();
        let (count, _sub) = counting(&store);

        let err = store.grant_exp(-5).unwrap_err();
        assert!(matches!(err, ProgressionError::InvalidArgument(_)));
        assert_eq!(store.snapshot(), ProgressionState::default());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_overflowing_grant_rejected() {
        let store = empty_catalog_store(LevelCurve::default());
        store.grant_exp(i64::MAX).unwrap();
        store.grant_exp(i64::MAX).unwrap();
        let before = store.snapshot();

        assert!(store.grant_exp(i64::MAX).is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_zero_grant_notifies() {
        let store = ProgressionStore::default();
        let (count, _sub) = counting(&store);

        let events = store.grant_exp(0).unwrap();
        assert!(events.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeat_project_view_is_silent() {
        let store = ProgressionStore::default();
        let (count, _sub) = counting(&store);

        store.track_project_viewed("p1");
        let events = store.track_project_viewed("p1");

        assert!(events.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.snapshot().viewed_project_ids.len(), 1);
    }

    #[test]
    fn test_experience_views_all_count() {
        let store = ProgressionStore::default();
        for _ in 0..4 {
            store.track_experience_viewed();
        }

        let state = store.snapshot();
        assert_eq!(state.experience_view_count, 4);
        assert!(state.is_unlocked("career_historian"));
    }

    #[test]
    fn test_claim_project_reward_once() {
        let store = empty_catalog_store(LevelCurve::default());

        assert!(matches!(
            store.claim_project_reward("portfolio-app", 150).unwrap(),
            ClaimOutcome::Claimed(_)
        ));
        assert_eq!(
            store.claim_project_reward("portfolio-app", 150).unwrap(),
            ClaimOutcome::AlreadyClaimed
        );
        assert_eq!(store.snapshot().total_exp, 150);
    }

    #[test]
    fn test_check_in_streak() {
        let store = ProgressionStore::default();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

        assert!(matches!(
            store.check_in(day(9)),
            CheckInOutcome::CheckedIn { streak: 1, .. }
        ));
        assert!(matches!(
            store.check_in(day(10)),
            CheckInOutcome::CheckedIn { streak: 2, .. }
        ));
        assert_eq!(store.check_in(day(10)), CheckInOutcome::AlreadyCheckedIn);
        assert_eq!(store.snapshot().daily_streak.best, 2);
    }

    #[test]
    fn test_summary_and_statuses() {
        let store = ProgressionStore::default();
        store.track_project_viewed("p1");

        let summary = store.summary();
        assert_eq!(summary.unlocked, 1);
        assert_eq!(summary.total, 8);
        assert_eq!(summary.earned_exp, 50);

        let statuses = store.achievements();
        assert!(statuses[0].unlocked);
        assert!(statuses[1..].iter().all(|s| !s.unlocked));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ProgressionStore::default();
        let mut snapshot = store.snapshot();
        snapshot.level = 99;
        snapshot.unlocked_achievement_ids.push("forged".into());

        assert_eq!(store.snapshot(), ProgressionState::default());
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = Arc::new(ProgressionStore::default());
        let levels = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&store);
        let seen = Arc::clone(&levels);
        let _sub = store.subscribe(move |state| {
            assert_eq!(reader.snapshot(), *state);
            seen.lock().unwrap().push(state.level);
        });

        store.grant_exp(100).unwrap();
        assert_eq!(*levels.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_custom_catalog_reward_cascades_level() {
        let catalog = Catalog::new(vec![Achievement::new(
            "big",
            "Big",
            250,
            Condition::SkillsViewed { at_least: 1 },
        )])
        .unwrap();
        let store = ProgressionStore::new(catalog, LevelCurve::default(), EvaluationMode::SinglePass);

        store.track_skill_viewed("rust");
        let state = store.snapshot();
        assert_eq!(state.level, 3);
        assert_eq!(state.exp, 0);
        assert_eq!(state.total_exp, 250);
    }

    #[test]
    fn test_grant_keeps_room_for_catalog_rewards() {
        let catalog = Catalog::new(vec![Achievement::new(
            "viewer",
            "Viewer",
            50,
            Condition::ProjectsViewed { at_least: 1 },
        )])
        .unwrap();
        let store = ProgressionStore::new(catalog, LevelCurve::default(), EvaluationMode::SinglePass);
        let rest = i64::try_from(u64::MAX - 50 - i64::MAX as u64).unwrap();
        store.grant_exp(i64::MAX).unwrap();
        store.grant_exp(rest).unwrap();
        let before = store.snapshot();
        assert_eq!(before.total_exp, u64::MAX - 50);

        assert!(store.grant_exp(1).is_err());
        assert!(store.claim_project_reward("late", 1).is_err());
        assert_eq!(store.snapshot(), before);

        store.track_project_viewed("p1");
        assert_eq!(store.snapshot().total_exp, u64::MAX);
    }

    #[test]
    fn test_mutation_from_listener_reaches_later_listeners_last() {
        let store = Arc::new(ProgressionStore::new(
            Catalog::new(Vec::new()).unwrap(),
            LevelCurve::default(),
            EvaluationMode::SinglePass,
        ));
        let totals = Arc::new(Mutex::new(Vec::new()));

        let granter = Arc::clone(&store);
        let _bonus = store.subscribe(move |state| {
            if state.total_exp == 10 {
                granter.grant_exp(5).unwrap();
            }
        });
        let seen = Arc::clone(&totals);
        let _view = store.subscribe(move |state| {
            seen.lock().unwrap().push(state.total_exp);
        });

        store.grant_exp(10).unwrap();

        assert_eq!(*totals.lock().unwrap(), vec![10, 15]);
        assert_eq!(totals.lock().unwrap().last().copied(), Some(store.snapshot().total_exp));
    }
}
