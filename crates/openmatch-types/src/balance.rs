//! Balance tracking types for the OpenMatch escrow model.
//!
//! Every user has an `available` balance (usable for new orders)
//! and a `frozen` balance (locked by active orders' escrow).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single balance entry for a (user, asset) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    /// Available for new orders / withdrawal.
    pub available: Decimal,
    /// Frozen / escrowed for active orders awaiting matching or settlement.
    pub frozen: Decimal,
}

impl BalanceEntry {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: Decimal::ZERO,
            frozen: Decimal::ZERO,
        }
    }

    /// Total balance (available + frozen).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.frozen
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.frozen.is_zero()
    }
}

impl Default for BalanceEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for asset identifiers (e.g., "BTC", "USDT", "ETH").
pub type Asset = String;
