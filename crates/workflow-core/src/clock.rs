// SPDX-FileCopyrightText: 2026 Workflow Engine Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strictly monotonic wall clock used for entity timestamps.
//!
//! Two calls never return the same instant, so `created_at` ordering within a
//! session is total and every mutator strictly advances `updated_at`.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock that never repeats or goes backwards.
///
/// Returns `max(system_now, last + 1ns)` at nanosecond resolution.
#[derive(Debug)]
pub struct MonotonicClock {
    last_nanos: AtomicI64,
}

impl MonotonicClock {
    pub const fn new() -> Self {
        Self {
            last_nanos: AtomicI64::new(i64::MIN),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        // timestamp_nanos_opt is None only after year 2262.
        let system = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX - 1);
        let mut prev = self.last_nanos.load(Ordering::Acquire);
        loop {
            let next = system.max(prev.saturating_add(1));
            match self.last_nanos.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return DateTime::<Utc>::from_timestamp_nanos(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

static GLOBAL: MonotonicClock = MonotonicClock::new();

/// Current time from the process-wide monotonic clock.
pub fn now() -> DateTime<Utc> {
    GLOBAL.now()
}

/// A timestamp strictly later than `prev`.
///
/// Rehydrated entities may carry a stored timestamp ahead of this process's
/// clock; mutators use this so `updated_at` still advances.
pub fn after(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > prev {
        now
    } else {
        prev + TimeDelta::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_reads_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn global_clock_is_shared_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..1_000).map(|_| now()).collect::<Vec<_>>()))
            .collect();
        let mut all: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total, "no two reads may share an instant");
    }

    #[test]
    fn after_advances_past_future_timestamps() {
        let future = now() + TimeDelta::days(1);
        assert!(after(future) > future);
    }
}
