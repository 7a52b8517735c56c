//! Day-Window Issuance Counters
//!
//! Mint and burn ceilings apply per UTC day (`floor(timestamp / 86400)`).
//! The counter resets lazily: whenever an access observes a newer day index
//! than the stored one, the running total is treated as zero. No background
//! timer exists.

use serde::{Deserialize, Serialize};

use lib_types::{day_index, Amount, Timestamp};

/// Running issuance total for one UTC day window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    day_index: u64,
    used: Amount,
}

impl DayWindow {
    /// Create a counter with nothing consumed
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount consumed within the day containing `now`.
    ///
    /// Zero if the stored total belongs to an older day.
    pub fn used_today(&self, now: Timestamp) -> Amount {
        if self.day_index == day_index(now) {
            self.used
        } else {
            0
        }
    }

    /// Headroom left under `limit` for the day containing `now`
    pub fn remaining(&self, now: Timestamp, limit: Amount) -> Amount {
        limit.saturating_sub(self.used_today(now))
    }

    /// Record consumption at `now`, rolling the window first if the day
    /// index moved on. Callers must have checked the limit beforehand.
    pub fn consume(&mut self, now: Timestamp, amount: Amount) {
        let today = day_index(now);
        if self.day_index != today {
            self.day_index = today;
            self.used = 0;
        }
        self.used = self.used.saturating_add(amount);
    }
}
