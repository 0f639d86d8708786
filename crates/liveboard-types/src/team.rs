//! Team identity.
//!
//! A team is identified by its country name alone. Names are normalized at
//! construction so that case-insensitive duplicates collapse to one identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BoardError, Result};

/// A team, identified by its normalized country name.
///
/// Normalization is "first letter uppercase, rest lowercase" of the trimmed
/// input: `poland`, `POLAND` and `pOlAnD` all construct the same `Team`.
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Team(String);

impl Team {
    /// Construct a team from a raw country name.
    ///
    /// # Errors
    /// Returns `BlankTeamName` if the trimmed input is empty.
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BoardError::BlankTeamName);
        }
        let lower = trimmed.to_lowercase();
        let mut chars = lower.chars();
        let first = chars.next().ok_or(BoardError::BlankTeamName)?;
        let normalized: String = first.to_uppercase().chain(chars).collect();
        Ok(Self(normalized))
    }

    /// The normalized country name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
