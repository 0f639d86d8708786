//! Opaque match tokens.
//!
//! A token is the sole means of addressing a live match for update and
//! removal. It is derived once from (home, away, start instant) at creation
//! and never recomputed: score updates do not change it, and nothing ever
//! parses it back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{StartInstant, constants::TOKEN_SEPARATOR};

/// Opaque handle addressing one live match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchToken(String);

impl MatchToken {
    /// Format a token from its three identity parts, e.g. `Poland/Germany/12`.
    #[must_use]
    pub fn from_parts(home: &str, away: &str, started: StartInstant) -> Self {
        Self(format!(
            "{home}{TOKEN_SEPARATOR}{away}{TOKEN_SEPARATOR}{started}"
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MatchToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for MatchToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_identity_parts() {
        let token = MatchToken::from_parts("Poland", "Germany", StartInstant::from_nanos(12));
        assert_eq!(token.as_str(), "Poland/Germany/12");
    }

    #[test]
    fn equal_parts_equal_tokens() {
        let a = MatchToken::from_parts("Poland", "Germany", StartInstant::from_nanos(12));
        let b = MatchToken::from_parts("Poland", "Germany", StartInstant::from_nanos(12));
        assert_eq!(a, b);

        let c = MatchToken::from_parts("Poland", "Germany", StartInstant::from_nanos(13));
        assert_ne!(a, c);
    }

    #[test]
    fn serde_roundtrip() {
        let token = MatchToken::from("England/India/77");
        let json = serde_json::to_string(&token).unwrap();
        let back: MatchToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
    }
}
