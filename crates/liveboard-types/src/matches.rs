//! The live-match entity.
//!
//! A match pairs two distinct teams with a score pair and the instant it was
//! started. Identity is (home, away, start instant) — scores are mutable
//! state and take no part in equality or hashing.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{BoardError, MatchToken, Result, StartInstant, Team};

/// A live match between two teams.
///
/// Constructed by the scoreboard's start operation; scores are overwritten
/// by its update operation. The scoreboard exclusively owns every match it
/// holds — callers only ever see copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    home: Team,
    away: Team,
    started: StartInstant,
    home_score: u32,
    away_score: u32,
}

impl Match {
    /// Create a fresh 0–0 match started at the given instant.
    ///
    /// # Errors
    /// Returns `SameTeams` if home and away are the same team.
    pub fn new(home: Team, away: Team, started: StartInstant) -> Result<Self> {
        if home == away {
            return Err(BoardError::SameTeams);
        }
        Ok(Self {
            home,
            away,
            started,
            home_score: 0,
            away_score: 0,
        })
    }

    #[must_use]
    pub fn home(&self) -> &Team {
        &self.home
    }

    #[must_use]
    pub fn away(&self) -> &Team {
        &self.away
    }

    #[must_use]
    pub fn started(&self) -> StartInstant {
        self.started
    }

    #[must_use]
    pub fn home_score(&self) -> u32 {
        self.home_score
    }

    #[must_use]
    pub fn away_score(&self) -> u32 {
        self.away_score
    }

    /// Overwrite both scores.
    pub fn set_score(&mut self, home_score: u32, away_score: u32) {
        self.home_score = home_score;
        self.away_score = away_score;
    }

    /// Combined score, widened so the sum cannot overflow.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.home_score) + u64::from(self.away_score)
    }

    /// The match's plain token: `Home/Away/<nanos>`.
    ///
    /// Derived from identity only — updating scores never changes it.
    #[must_use]
    pub fn token(&self) -> MatchToken {
        MatchToken::from_parts(self.home.name(), self.away.name(), self.started)
    }
}

// Identity is (home, away, started); scores are excluded on purpose.
impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.started == other.started && self.home == other.home && self.away == other.away
    }
}

impl Eq for Match {}

impl Hash for Match {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.home.hash(state);
        self.away.hash(state);
        self.started.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str) -> Team {
        Team::new(name).unwrap()
    }

    #[test]
    fn starts_at_nil_nil() {
        let m = Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(12)).unwrap();
        assert_eq!(m.home_score(), 0);
        assert_eq!(m.away_score(), 0);
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn same_teams_rejected() {
        let result = Match::new(team("Poland"), team("poland"), StartInstant::from_nanos(12));
        assert!(matches!(result, Err(BoardError::SameTeams)));
    }

    #[test]
    fn identity_ignores_scores() {
        let mut a =
            Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(12)).unwrap();
        let b = Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(12)).unwrap();
        a.set_score(3, 1);
        assert_eq!(a, b);

        let c = Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(13)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn token_ignores_scores() {
        let mut m =
            Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(12)).unwrap();
        let before = m.token();
        m.set_score(4, 2);
        assert_eq!(m.token(), before);
        assert_eq!(before.as_str(), "Poland/Germany/12");
    }

    #[test]
    fn total_cannot_overflow() {
        let mut m =
            Match::new(team("Poland"), team("Germany"), StartInstant::from_nanos(12)).unwrap();
        m.set_score(u32::MAX, u32::MAX);
        assert_eq!(m.total(), u64::from(u32::MAX) * 2);
    }
}
