//! Error types for the LiveBoard scoreboard.
//!
//! All errors use the `LB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Team errors
//! - 2xx: Match errors
//! - 3xx: Board / registry errors
//! - 4xx: Tokenizer errors

use thiserror::Error;

use crate::MatchToken;

/// Central error enum for all LiveBoard operations.
#[derive(Debug, Error)]
pub enum BoardError {
    // =================================================================
    // Team Errors (1xx)
    // =================================================================
    /// The team name was empty or whitespace-only.
    #[error("LB_ERR_100: Team name must not be blank")]
    BlankTeamName,

    // =================================================================
    // Match Errors (2xx)
    // =================================================================
    /// A match cannot pair a team against itself.
    #[error("LB_ERR_200: Home and away teams must differ")]
    SameTeams,

    /// The token does not address a live match.
    #[error("LB_ERR_201: Match not found: {0}")]
    MatchNotFound(MatchToken),

    // =================================================================
    // Board Errors (3xx)
    // =================================================================
    /// The team already appears in a live match on the board.
    #[error("LB_ERR_300: Team already in a live match: {0}")]
    TeamAlreadyPlaying(String),

    // =================================================================
    // Tokenizer Errors (4xx)
    // =================================================================
    /// No ISO 3166-1 alpha-2 code is known for this country name.
    #[error("LB_ERR_400: No ISO code for country: {0}")]
    UnknownCountry(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BoardError>;
