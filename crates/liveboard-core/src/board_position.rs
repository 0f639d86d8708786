//! A single row of the rendered board.

use serde::{Deserialize, Serialize};

use liveboard_types::Match;

/// Read-only projection of a live match, used only for display.
///
/// Owns its data: later mutation of the board never changes a position
/// already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPosition {
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl BoardPosition {
    /// Copy the displayable fields out of a match.
    #[must_use]
    pub fn of(m: &Match) -> Self {
        Self {
            home: m.home().name().to_owned(),
            away: m.away().name().to_owned(),
            home_score: m.home_score(),
            away_score: m.away_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use liveboard_types::{StartInstant, Team};

    use super::*;

    #[test]
    fn copies_are_independent() {
        let mut m = Match::new(
            Team::new("Poland").unwrap(),
            Team::new("Germany").unwrap(),
            StartInstant::from_nanos(12),
        )
        .unwrap();

        let pos = BoardPosition::of(&m);
        m.set_score(3, 1);

        assert_eq!(pos.home, "Poland");
        assert_eq!(pos.away, "Germany");
        assert_eq!(pos.home_score, 0);
        assert_eq!(pos.away_score, 0);
    }
}
