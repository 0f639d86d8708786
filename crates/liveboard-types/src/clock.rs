//! Monotonic start instants.
//!
//! A match's start instant is part of its identity and of the board's
//! ranking order, so two matches must never share one. Wall-clock
//! nanoseconds alone cannot guarantee that under rapid successive starts;
//! [`MatchClock`] pushes them through an atomic high-water mark so every
//! call returns a strictly greater instant than the one before.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The instant a match was started, in nanoseconds since the Unix epoch.
///
/// Strictly increasing per [`MatchClock`]: a later start always compares
/// greater. Printed as a plain integer so it can be embedded in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct StartInstant(u64);

impl StartInstant {
    /// Reconstruct an instant from raw nanoseconds.
    #[must_use]
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Raw nanoseconds since the Unix epoch.
    #[must_use]
    pub fn as_nanos(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StartInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collision-free monotonic instant source.
///
/// `now()` returns the current wall-clock nanoseconds, bumped past the last
/// value handed out if the wall clock has not advanced (or has gone
/// backwards). Safe to share across threads.
#[derive(Debug, Default)]
pub struct MatchClock {
    last: AtomicU64,
}

impl MatchClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next start instant: wall time, strictly greater than any instant
    /// previously returned by this clock.
    pub fn now(&self) -> StartInstant {
        let wall = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);

        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return StartInstant(next),
                Err(observed) => last = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants_strictly_increase() {
        let clock = MatchClock::new();
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next > prev, "clock went backwards: {next} <= {prev}");
            prev = next;
        }
    }

    #[test]
    fn instants_unique_across_threads() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let clock = Arc::new(MatchClock::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || {
                    (0..1_000).map(|_| clock.now()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for instant in handle.join().unwrap() {
                assert!(seen.insert(instant), "duplicate instant: {instant}");
            }
        }
    }

    #[test]
    fn instant_tracks_wall_clock() {
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        let instant = MatchClock::new().now();
        let after = Utc::now().timestamp_nanos_opt().unwrap();
        let nanos = i64::try_from(instant.as_nanos()).unwrap();
        assert!(
            nanos >= before && nanos <= after,
            "nanos={nanos}, before={before}, after={after}"
        );
    }

    #[test]
    fn from_nanos_roundtrip() {
        let instant = StartInstant::from_nanos(12);
        assert_eq!(instant.as_nanos(), 12);
        assert_eq!(format!("{instant}"), "12");
    }
}
