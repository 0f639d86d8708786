//! # liveboard-core
//!
//! **The ranked registry of live matches.**
//!
//! The scoreboard tracks every ongoing match and keeps the board sorted at
//! all times: more total goals first, ties broken by most recent start. It
//! guarantees:
//!
//! - **One match per team**: no team appears twice among live matches
//! - **Never-stale order**: every score update re-ranks atomically
//! - **Value snapshots**: readers get independent copies, never references
//!   into the registry
//!
//! [`ScoreBoard`] is the single-owner core; [`SharedScoreBoard`] wraps it
//! in one exclusive lock for concurrent callers.

pub mod board_position;
pub mod scoreboard;
pub mod shared;

pub use board_position::BoardPosition;
pub use scoreboard::ScoreBoard;
pub use shared::SharedScoreBoard;
