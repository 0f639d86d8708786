//! # liveboard-types
//!
//! Shared types and errors for the **LiveBoard** scoreboard.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Team identity**: [`Team`]
//! - **Match entity**: [`Match`]
//! - **Start instants**: [`StartInstant`], [`MatchClock`]
//! - **Tokens**: [`MatchToken`]
//! - **Errors**: [`BoardError`] with `LB_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod clock;
pub mod constants;
pub mod error;
pub mod matches;
pub mod team;
pub mod token;

// Re-export all primary types at crate root for ergonomic imports:
//   use liveboard_types::{Team, Match, MatchToken, ...};

pub use clock::*;
pub use error::*;
pub use matches::*;
pub use team::*;
pub use token::*;

// Constants are accessed via `liveboard_types::constants::FOO`
// (not re-exported to avoid name collisions).
