//! Process-wide daily request quota for the demo endpoints.
//!
//! One counter for all callers, keyed by UTC date. The date check and the
//! increment happen under the same lock, so a rollover resets the count before
//! the first request of the new day is counted.

use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    day: NaiveDate,
    used: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded {
    pub limit: u32,
}

#[derive(Debug)]
pub struct DailyQuota {
    limit: u32,
    window: Mutex<Window>,
}

impl DailyQuota {
    pub fn new(limit: u32) -> Self {
        Self::starting_on(limit, today())
    }

    pub fn starting_on(limit: u32, day: NaiveDate) -> Self {
        Self {
            limit,
            window: Mutex::new(Window { day, used: 0 }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Consumes one unit of today's quota, returning how many remain.
    pub fn try_acquire(&self) -> Result<u32, QuotaExceeded> {
        self.try_acquire_on(today())
    }

    pub fn try_acquire_on(&self, day: NaiveDate) -> Result<u32, QuotaExceeded> {
        let mut window = self.lock();
        roll_over(&mut window, day);
        if window.used >= self.limit {
            return Err(QuotaExceeded { limit: self.limit });
        }
        window.used += 1;
        Ok(self.limit - window.used)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_on(today())
    }

    pub fn remaining_on(&self, day: NaiveDate) -> u32 {
        let window = self.lock();
        if window.day != day {
            return self.limit;
        }
        self.limit.saturating_sub(window.used)
    }

    // A poisoned lock only means another request panicked mid-update;
    // the counter itself is always consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Window> {
        self.window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn roll_over(window: &mut Window, day: NaiveDate) {
    if window.day != day {
        *window = Window { day, used: 0 };
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_counts_down_then_rejects() {
        let quota = DailyQuota::starting_on(2, day(1));
        assert_eq!(quota.try_acquire_on(day(1)), Ok(1));
        assert_eq!(quota.try_acquire_on(day(1)), Ok(0));
        assert_eq!(
            quota.try_acquire_on(day(1)),
            Err(QuotaExceeded { limit: 2 })
        );
        assert_eq!(quota.remaining_on(day(1)), 0);
    }

    #[test]
    fn test_resets_on_date_rollover() {
        let quota = DailyQuota::starting_on(1, day(1));
        assert!(quota.try_acquire_on(day(1)).is_ok());
        assert!(quota.try_acquire_on(day(1)).is_err());

        assert_eq!(quota.remaining_on(day(2)), 1);
        assert_eq!(quota.try_acquire_on(day(2)), Ok(0));
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let quota = DailyQuota::starting_on(0, day(1));
        assert_eq!(
            quota.try_acquire_on(day(1)),
            Err(QuotaExceeded { limit: 0 })
        );
    }

    #[test]
    fn test_concurrent_acquires_never_exceed_limit() {
        let quota = Arc::new(DailyQuota::starting_on(50, day(1)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let quota = Arc::clone(&quota);
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| quota.try_acquire_on(day(1)).is_ok())
                        .count()
                })
            })
            .collect();
        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 50);
        assert_eq!(quota.remaining_on(day(1)), 0);
    }
}
