//! Simulate command implementation
//!
//! Replays a list of screen actions against a fresh store and reports what
//! happened.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use questfolio::config::Config;
use questfolio::progression::{
    today, AchievementSummary, CheckInOutcome, ClaimOutcome, ProgressionEvent, ProgressionState,
};

/// One simulated screen action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `grant:<amount>`
    Grant(i64),
    /// `project:<id>`
    Project(String),
    /// `skill:<id>`
    Skill(String),
    /// `experience`
    Experience,
    /// `claim:<project>:<reward>`
    Claim(String, u32),
    /// `checkin[:<YYYY-MM-DD>]`, today when no date is given
    CheckIn(NaiveDate),
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };
        let require = |what: &str| {
            arg.filter(|a| !a.is_empty())
                .ok_or_else(|| anyhow!("Action '{}' needs {}", s, what))
        };

        let action = match kind {
            "grant" => Action::Grant(
                require("an amount")?
                    .parse()
                    .with_context(|| format!("Invalid XP amount in '{}'", s))?,
            ),
            "project" => Action::Project(require("a project id")?.to_string()),
            "skill" => Action::Skill(require("a skill id")?.to_string()),
            "experience" => match arg {
                None => Action::Experience,
                Some(_) => bail!("Action 'experience' takes no argument, got '{}'", s),
            },
            "claim" => {
                let (project, reward) = require("a project and reward")?
                    .rsplit_once(':')
                    .ok_or_else(|| anyhow!("Expected claim:<project>:<reward>, got '{}'", s))?;
                let reward = reward
                    .parse()
                    .with_context(|| format!("Invalid reward in '{}'", s))?;
                Action::Claim(project.to_string(), reward)
            }
            "checkin" => Action::CheckIn(match arg {
                None => today(),
                Some(day) => NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date in '{}'", s))?,
            }),
            _ => bail!("Unknown action: {}", s),
        };
        Ok(action)
    }
}

#[derive(Serialize)]
struct StepReport<'a> {
    action: &'a str,
    events: Vec<ProgressionEvent>,
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    steps: Vec<StepReport<'a>>,
    notifications: usize,
    snapshot: ProgressionState,
    summary: AchievementSummary,
    streak_active: bool,
}

/// Replay `actions` and print events plus the final state
pub fn simulate_command(config: &Config, actions: &[String], json: bool) -> Result<()> {
    let parsed: Vec<Action> = actions
        .iter()
        .map(|a| a.parse())
        .collect::<Result<_>>()?;

    let store = config.build_store()?;
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let subscription = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut steps = Vec::with_capacity(parsed.len());
    for (raw, action) in actions.iter().zip(parsed) {
        let events = match action {
            Action::Grant(amount) => store.grant_exp(amount)?,
            Action::Project(id) => store.track_project_viewed(&id),
            Action::Skill(id) => store.track_skill_viewed(&id),
            Action::Experience => store.track_experience_viewed(),
            Action::Claim(project, reward) => match store.claim_project_reward(&project, reward)? {
                ClaimOutcome::Claimed(events) => events,
                ClaimOutcome::AlreadyClaimed => Vec::new(),
            },
            Action::CheckIn(day) => match store.check_in(day) {
                CheckInOutcome::CheckedIn { events, .. } => events,
                CheckInOutcome::AlreadyCheckedIn => Vec::new(),
            },
        };
        steps.push(StepReport {
            action: raw,
            events,
        });
    }
    subscription.unsubscribe();

    let snapshot = store.snapshot();
    let report = SimulationReport {
        steps,
        notifications: notifications.load(Ordering::SeqCst),
        streak_active: snapshot.daily_streak.is_active(today()),
        snapshot,
        summary: store.summary(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        println!("> {}", step.action);
        if step.events.is_empty() {
            println!("    (no change)");
        }
        for event in &step.events {
            println!("    {}", event);
        }
    }

    let state = &report.snapshot;
    println!();
    println!(
        "Level {}  {}/{} EXP ({:.0}%)  total {} EXP",
        state.level,
        state.exp,
        state.exp_to_next_level,
        state.progress_to_next() * 100.0,
        state.total_exp
    );
    println!(
        "Achievements: {}/{} (+{} EXP)",
        report.summary.unlocked, report.summary.total, report.summary.earned_exp
    );
    let streak = &state.daily_streak;
    println!(
        "Daily streak: {} (best {}, {})",
        streak.current,
        streak.best,
        if report.streak_active { "active" } else { "inactive" }
    );
    println!("Notifications: {}", report.notifications);

    Ok(())
}
