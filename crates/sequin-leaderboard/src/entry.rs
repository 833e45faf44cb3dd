// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user leaderboard record and its rollover rule.

use sequin_core::{Period, PeriodKeys, UserId};

/// A counter tagged with the bucket key it was accumulated under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodCount {
    pub key: String,
    pub count: u64,
}

impl PeriodCount {
    /// Adds `amount`, restarting from zero when `key` names a new bucket.
    pub fn add(&mut self, key: &str, amount: u64) {
        if self.key != key {
            self.key = key.to_string();
            self.count = 0;
        }
        self.count += amount;
    }

    /// The count if it belongs to bucket `key`, otherwise zero.
    pub fn current(&self, key: &str) -> u64 {
        if self.key == key { self.count } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub today: PeriodCount,
    pub week: PeriodCount,
    pub month: PeriodCount,
    pub all_time: u64,
}

impl LeaderboardEntry {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            today: PeriodCount::default(),
            week: PeriodCount::default(),
            month: PeriodCount::default(),
            all_time: 0,
        }
    }

    pub fn record(&mut self, keys: &PeriodKeys, amount: u64) {
        self.today.add(&keys.day, amount);
        self.week.add(&keys.week, amount);
        self.month.add(&keys.month, amount);
        self.all_time += amount;
    }

    /// Count for `period` as of `keys`; stale buckets read as zero.
    pub fn count_for(&self, period: Period, keys: &PeriodKeys) -> u64 {
        match period {
            Period::Today => self.today.current(&keys.day),
            Period::Week => self.week.current(&keys.week),
            Period::Month => self.month.current(&keys.month),
            Period::AllTime => self.all_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(day: &str, week: &str, month: &str) -> PeriodKeys {
        PeriodKeys {
            day: day.into(),
            week: week.into(),
            month: month.into(),
        }
    }

    #[test]
    fn stale_key_resets_to_increment_amount() {
        let mut entry = LeaderboardEntry::new(UserId(7), "seven");
        entry.record(&keys("2026-04-01", "2026-W14", "2026-04"), 10);
        entry.record(&keys("2026-04-02", "2026-W14", "2026-04"), 3);

        assert_eq!(entry.today, PeriodCount { key: "2026-04-02".into(), count: 3 });
        assert_eq!(entry.week.count, 13);
        assert_eq!(entry.month.count, 13);
        assert_eq!(entry.all_time, 13);
    }

    #[test]
    fn stale_buckets_read_as_zero() {
        let mut entry = LeaderboardEntry::new(UserId(7), "seven");
        entry.record(&keys("2026-04-30", "2026-W18", "2026-04"), 6);
        let may = keys("2026-05-01", "2026-W18", "2026-05");

        assert_eq!(entry.count_for(Period::Today, &may), 0);
        assert_eq!(entry.count_for(Period::Week, &may), 6);
        assert_eq!(entry.count_for(Period::Month, &may), 0);
        assert_eq!(entry.count_for(Period::AllTime, &may), 6);
    }
}
