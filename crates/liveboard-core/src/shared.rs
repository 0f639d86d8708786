//! Thread-safe facade over the scoreboard.
//!
//! Callers on different threads must never observe a half-applied
//! operation, so every public call holds one exclusive lock for the whole
//! in-memory operation. Nothing blocks on I/O under the lock and there is
//! no internal retry: each call either completes or fails synchronously.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use liveboard_types::{Match, MatchToken, Result, Team};

use crate::{BoardPosition, ScoreBoard};

/// Cloneable, `Send + Sync` handle to a shared [`ScoreBoard`].
///
/// Clones address the same board. Operations are linearizable: each takes
/// the single exclusive lock for its full duration.
#[derive(Debug, Clone, Default)]
pub struct SharedScoreBoard {
    inner: Arc<Mutex<ScoreBoard>>,
}

impl SharedScoreBoard {
    /// Create a new empty shared scoreboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScoreBoard> {
        // A poisoned lock still guards a consistent board: operations are
        // all-or-nothing and do not panic mid-mutation.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`ScoreBoard::start_match`].
    pub fn start_match(&self, home: Team, away: Team) -> Result<MatchToken> {
        self.lock().start_match(home, away)
    }

    /// See [`ScoreBoard::update_match`].
    pub fn update_match(&self, token: &MatchToken, home_score: u32, away_score: u32) -> Result<()> {
        self.lock().update_match(token, home_score, away_score)
    }

    /// See [`ScoreBoard::remove_match`].
    pub fn remove_match(&self, token: &MatchToken) -> Result<Match> {
        self.lock().remove_match(token)
    }

    /// See [`ScoreBoard::snapshot`]. The copy is taken atomically with
    /// respect to concurrent mutation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BoardPosition> {
        self.lock().snapshot()
    }

    /// See [`ScoreBoard::leader`].
    #[must_use]
    pub fn leader(&self) -> Option<BoardPosition> {
        self.lock().leader()
    }

    /// Number of live matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no match is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Check whether a token addresses a live match.
    #[must_use]
    pub fn contains_match(&self, token: &MatchToken) -> bool {
        self.lock().contains_match(token)
    }
}
