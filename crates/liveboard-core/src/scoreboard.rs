//! The ranked registry of live matches.
//!
//! Uses `BTreeMap` for ranking order:
//! - **Ordered index**: `BTreeMap<Reverse<RankKey>, MatchToken>` -- highest
//!   combined score first, ties broken by most recent start
//! - **Lookup index**: `HashMap<MatchToken, Match>` owning every live match
//! - **Occupied set**: `HashSet<Team>` enables the O(1) one-match-per-team
//!   conflict check
//!
//! The trade-off favors retrieval: start/update/remove pay O(log N) so that
//! the board itself is always sorted and readable in O(N).

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use liveboard_types::{BoardError, Match, MatchClock, MatchToken, Result, StartInstant, Team};

use crate::board_position::BoardPosition;

/// Ordered-index key: combined score, then start instant.
///
/// Wrapped in `Reverse`, BTreeMap iteration yields higher totals first and,
/// on equal totals, later starts first. Instants are unique per clock, so no
/// two live matches ever share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    total: u64,
    started: StartInstant,
}

impl RankKey {
    fn of(m: &Match) -> Self {
        Self {
            total: m.total(),
            started: m.started(),
        }
    }
}

/// The live scoreboard.
///
/// Holds every ongoing match, enforces that no team appears in two live
/// matches at once, and keeps the board order current under every mutation.
/// All operations are all-or-nothing: a rejected call leaves the board
/// untouched.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    /// Fast lookup: token -> match. Owns the matches.
    matches: HashMap<MatchToken, Match>,
    /// Ranking order: best position first (`Reverse` key).
    order: BTreeMap<Reverse<RankKey>, MatchToken>,
    /// Teams currently in a live match.
    occupied: HashSet<Team>,
    /// Start-instant source for new matches.
    clock: MatchClock,
}

impl ScoreBoard {
    /// Create a new empty scoreboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Start
    // =================================================================

    /// Start a new 0–0 match and put it on the board.
    ///
    /// The returned token is the sole handle for later update/removal, in
    /// the format `Home/Away/<start nanos>`.
    ///
    /// # Errors
    /// - `SameTeams` if home and away are the same team
    /// - `TeamAlreadyPlaying` if either team is already in a live match
    pub fn start_match(&mut self, home: Team, away: Team) -> Result<MatchToken> {
        if home == away {
            return Err(BoardError::SameTeams);
        }
        if self.occupied.contains(&home) {
            return Err(BoardError::TeamAlreadyPlaying(home.name().to_owned()));
        }
        if self.occupied.contains(&away) {
            return Err(BoardError::TeamAlreadyPlaying(away.name().to_owned()));
        }

        let m = Match::new(home.clone(), away.clone(), self.clock.now())?;
        let token = m.token();

        self.occupied.insert(home);
        self.occupied.insert(away);
        self.order.insert(Reverse(RankKey::of(&m)), token.clone());
        self.matches.insert(token.clone(), m);

        tracing::debug!(token = %token, live = self.matches.len(), "match started");
        Ok(token)
    }

    // =================================================================
    // Update
    // =================================================================

    /// Overwrite a live match's scores.
    ///
    /// Works as removing the ranked entry and reinserting it under the new
    /// total, so the board order is never stale. The lookup entry (and the
    /// token) are untouched.
    ///
    /// # Errors
    /// Returns `MatchNotFound` if the token does not address a live match.
    pub fn update_match(
        &mut self,
        token: &MatchToken,
        home_score: u32,
        away_score: u32,
    ) -> Result<()> {
        let Some(m) = self.matches.get_mut(token) else {
            return Err(BoardError::MatchNotFound(token.clone()));
        };

        let stale = Reverse(RankKey::of(m));
        self.order.remove(&stale);
        m.set_score(home_score, away_score);
        self.order.insert(Reverse(RankKey::of(m)), token.clone());

        tracing::debug!(token = %token, home_score, away_score, "score updated");
        Ok(())
    }

    // =================================================================
    // Remove
    // =================================================================

    /// Take a finished match off the board. Returns the removed match.
    ///
    /// # Errors
    /// Returns `MatchNotFound` if the token does not address a live match.
    pub fn remove_match(&mut self, token: &MatchToken) -> Result<Match> {
        let Some(m) = self.matches.remove(token) else {
            return Err(BoardError::MatchNotFound(token.clone()));
        };

        self.order.remove(&Reverse(RankKey::of(&m)));
        self.occupied.remove(m.home());
        self.occupied.remove(m.away());

        tracing::debug!(token = %token, live = self.matches.len(), "match removed");
        Ok(m)
    }

    // =================================================================
    // Snapshot & queries
    // =================================================================

    /// The board as it stands: independent copies of every live match in
    /// ranking order (more total goals first, ties most recent first).
    #[must_use]
    pub fn snapshot(&self) -> Vec<BoardPosition> {
        self.order
            .values()
            .filter_map(|token| self.matches.get(token))
            .map(BoardPosition::of)
            .collect()
    }

    /// The current top of the board, or `None` if no match is live.
    #[must_use]
    pub fn leader(&self) -> Option<BoardPosition> {
        self.order
            .values()
            .next()
            .and_then(|token| self.matches.get(token))
            .map(BoardPosition::of)
    }

    /// Number of live matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` if no match is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Check whether a token addresses a live match.
    #[must_use]
    pub fn contains_match(&self, token: &MatchToken) -> bool {
        self.matches.contains_key(token)
    }
}
