//! Once-a-day reset of local, role-level UI state.
//!
//! The marker only says "this context has been seen today". It never decides
//! whether anyone's attendance was recorded; that is `last_attendance_date`.

use crate::attendance::clock::{Clock, format_calendar_date, parse_calendar_date};
use crate::config::marker_store::LocalStore;
use crate::logger;

const KEY_PREFIX: &str = "submission-marker:";

pub struct SubmissionGuard<S, C> {
    store: S,
    clock: C,
}

impl<S: LocalStore, C: Clock> SubmissionGuard<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        SubmissionGuard { store, clock }
    }

    /// True the first time it is asked on a calendar day, and stamps the
    /// marker with today. A marker that cannot be read counts as stale; a
    /// failed write still reports a reset.
    pub fn should_reset_daily_state(&mut self, context_key: &str) -> bool {
        let today = self.clock.today();
        let key = format!("{}{}", KEY_PREFIX, context_key);

        let stored = match self.store.get(&key) {
            Ok(value) => value,
            Err(e) => {
                logger::warn(format!("Marker '{}' unreadable, resetting: {}", context_key, e));
                None
            }
        };

        if stored.as_deref().and_then(parse_calendar_date) == Some(today) {
            return false;
        }

        if let Err(e) = self.store.set(&key, &format_calendar_date(today)) {
            logger::error(format!("Could not write marker '{}': {}", context_key, e));
        }
        logger::info(format!("Daily state reset for '{}' on {}", context_key, today));
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::clock::FixedClock;
    use crate::config::marker_store::MemoryStore;
    use crate::error::{Error, Result};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_true_then_false_then_true_after_rollover() {
        let clock = Arc::new(FixedClock::new(d("2024-03-10")));
        let mut guard = SubmissionGuard::new(MemoryStore::new(), clock.clone());

        assert!(guard.should_reset_daily_state("staff"));
        assert!(!guard.should_reset_daily_state("staff"));

        clock.advance_days(1);
        assert!(guard.should_reset_daily_state("staff"));
        assert!(!guard.should_reset_daily_state("staff"));
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut guard = SubmissionGuard::new(MemoryStore::new(), FixedClock::new(d("2024-03-10")));
        assert!(guard.should_reset_daily_state("student"));
        assert!(guard.should_reset_daily_state("staff"));
        assert!(!guard.should_reset_daily_state("student"));
    }

    #[test]
    fn test_marker_written_as_plain_date() {
        let mut guard = SubmissionGuard::new(MemoryStore::new(), FixedClock::new(d("2024-03-10")));
        guard.should_reset_daily_state("self");
        assert_eq!(
            guard.store().get("submission-marker:self").unwrap().as_deref(),
            Some("2024-03-10")
        );
    }

    #[test]
    fn test_garbage_marker_counts_as_stale() {
        let mut store = MemoryStore::new();
        store.set("submission-marker:staff", "yesterday-ish").unwrap();
        let mut guard = SubmissionGuard::new(store, FixedClock::new(d("2024-03-10")));
        assert!(guard.should_reset_daily_state("staff"));
        assert!(!guard.should_reset_daily_state("staff"));
    }

    struct BrokenStore;

    impl LocalStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Store("disk gone".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Store("disk gone".into()))
        }
    }

    #[test]
    fn test_broken_store_always_resets() {
        let mut guard = SubmissionGuard::new(BrokenStore, FixedClock::new(d("2024-03-10")));
        assert!(guard.should_reset_daily_state("staff"));
        assert!(guard.should_reset_daily_state("staff"));
    }
}
