//! System-wide constants for the LiveBoard scoreboard.

/// Separator between the parts of a match token (`Home/Away/<nanos>`).
pub const TOKEN_SEPARATOR: char = '/';

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "LiveBoard";
