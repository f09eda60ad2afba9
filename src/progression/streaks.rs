//! Daily check-in streak

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Daily check-in streak
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current: u32,
    pub best: u32,
    pub last_check_in: Option<NaiveDate>,
}

impl StreakInfo {
    /// Check if the streak is still alive on `today` (check-in today or yesterday)
    pub fn is_active(&self, today: NaiveDate) -> bool {
        let Some(last) = self.last_check_in else {
            return false;
        };
        let days_since = (today - last).num_days();
        (0..=1).contains(&days_since)
    }

    pub fn checked_in_on(&self, day: NaiveDate) -> bool {
        self.last_check_in == Some(day)
    }

    /// Record a check-in for `today`.
    ///
    /// Returns the new streak length, or `None` if `today` was already counted.
    /// A check-in the day after the previous one extends the streak; any gap
    /// (or a date going backwards) starts over at 1.
    pub fn check_in(&mut self, today: NaiveDate) -> Option<u32> {
        if self.checked_in_on(today) {
            return None;
        }

        let extends = self
            .last_check_in
            .and_then(|last| last.succ_opt())
            .is_some_and(|next_day| next_day == today);

        self.current = if extends { self.current + 1 } else { 1 };
        self.best = self.best.max(self.current);
        self.last_check_in = Some(today);
        Some(self.current)
    }
}

/// Today's local date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
