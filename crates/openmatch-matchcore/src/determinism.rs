//! Determinism verification utilities for cross-node consistency.
//!
//! Every node processing the same `SealedBatch` must produce the exact
//! same `TradeBundle`. The `trade_root` is a Merkle-style hash over all
//! trades that enables quick verification without comparing full payloads.

use openmatch_types::Trade;
use sha2::{Digest, Sha256};

/// Compute the trade root hash over a set of trades.
///
/// This is a deterministic hash that depends on:
/// - Trade IDs (in order)
/// - Prices and quantities
/// - Taker/maker user IDs
///
/// The same set of trades in the same order always produces the same root.
#[must_use]
pub fn compute_trade_root(trades: &[Trade]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"openmatch:trade_root:v2:");
    hasher.update((trades.len() as u64).to_le_bytes());

    for trade in trades {
        // Hash each trade deterministically
        hasher.update(trade.id.0.as_bytes());
        hasher.update(trade.epoch_id.0.to_le_bytes());
        hasher.update(trade.taker_order_id.0.as_bytes());
        hasher.update(trade.maker_order_id.0.as_bytes());
        hasher.update(trade.taker_user_id.0.as_bytes());
        hasher.update(trade.maker_user_id.0.as_bytes());
        hasher.update(trade.price.to_string().as_bytes());
        hasher.update(trade.quantity.to_string().as_bytes());
        hasher.update(trade.quote_amount.to_string().as_bytes());
    }

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Verify that a given trade root matches the expected hash.
///
/// Recomputes the hash from the trades and compares with the expected root.
#[must_use]
pub fn verify_trade_root(trades: &[Trade], expected_root: &[u8; 32]) -> bool {
    let actual = compute_trade_root(trades);
    actual == *expected_root
}
