// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Longest maintenance window an admin may configure (366 days).
pub const MAX_TOTAL_SECONDS: i64 = 366 * 86_400;

/// Offset from page load to the end of the maintenance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            days: 2,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

impl DurationConfig {
    pub fn zero() -> Self {
        Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        i64::from(self.days) * 86_400
            + i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds)
    }

    pub fn is_within_limit(&self) -> bool {
        self.total_seconds() <= MAX_TOTAL_SECONDS
    }

    /// Countdown target when the window starts at `start`. `None` if the
    /// result is outside the representable date range.
    pub fn target_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_signed(Duration::try_seconds(self.total_seconds())?)
    }

    /// Time left until `target`, broken down for display. Zero once passed.
    pub fn remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let left = (target - now).num_seconds().max(0);
        let days = u32::try_from(left / 86_400).unwrap_or(u32::MAX);
        let rest = left % 86_400;
        Self {
            days,
            hours: (rest / 3_600) as u32,
            minutes: (rest % 3_600 / 60) as u32,
            seconds: (rest % 60) as u32,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.total_seconds() == 0
    }
}
