//! Deterministic batch matcher for the OpeniMatch epoch-based auction.
//!
//! The [`BatchMatcher`] takes a sealed [`PendingBuffer`] and produces a
//! deterministic set of [`Trade`]s using the uniform clearing price algorithm.
//!
//! # Determinism Contract
//!
//! Given the same sealed buffer (same orders, same sequence numbers, same batch ID),
//! **every node** will produce:
//! - The same set of trades (same IDs, prices, quantities)
//! - The same `result_hash`
//!
//! This is critical for cross-node consensus verification.

use openmatch_types::*;
use sha2::{Digest, Sha256};

use crate::clearing::compute_clearing_price;
use crate::pending_buffer::PendingBuffer;

/// Result of a single batch matching round.
#[derive(Debug)]
pub struct BatchResult {
    /// The batch that was matched.
    pub batch_id: BatchId,
    /// Trades produced by the matching algorithm.
    pub trades: Vec<Trade>,
    /// SHA-256 hash of the deterministic trade output.
    pub result_hash: [u8; 32],
    /// The sealed buffer hash (input hash, for verification).
    pub input_hash: [u8; 32],
    /// Orders that remain unmatched (partially filled or no crossing).
    pub remaining_orders: Vec<Order>,
    /// The uniform clearing price used, if any.
    pub clearing_price: Option<rust_decimal::Decimal>,
}

/// The deterministic batch matcher.
///
/// # Algorithm
///
/// 1. Take orders from sealed buffer
/// 2. Separate into buys/sells, exclude cancels
/// 3. Compute uniform clearing price
/// 4. Walk buys (highest price first) × sells (lowest price first)
/// 5. Fill at clearing price, emit trades
/// 6. Compute `result_hash` over trade output
///
/// See [`compute_clearing_price`] for the clearing algorithm details.
#[derive(Debug)]
pub struct BatchMatcher {
    /// This node's identity (included in trade metadata).
    pub node_id: NodeId,
}

impl BatchMatcher {
    /// Create a new matcher for the given node.
    #[must_use]
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }

    /// Run deterministic matching on a sealed pending buffer.
    ///
    /// # Errors
    /// Returns `MatchingFailed` if the buffer is not sealed.
    pub fn match_batch(&self, buffer: PendingBuffer) -> Result<BatchResult> {
        let batch_id = buffer.batch_id();
        let (orders, input_hash) = buffer.take_orders()?;

        // Partition into buys and sells, excluding cancel-type orders
        let mut buys: Vec<Order> = orders
            .iter()
            .filter(|o| o.side == OrderSide::Buy && o.order_type != OrderType::Cancel)
            .cloned()
            .collect();

        let mut sells: Vec<Order> = orders
            .iter()
            .filter(|o| o.side == OrderSide::Sell && o.order_type != OrderType::Cancel)
            .cloned()
            .collect();

        // Enforce deterministic sort order:
        // Buys: highest effective_price first, then lowest sequence
        buys.sort_by(|a, b| {
            b.effective_price()
                .cmp(&a.effective_price())
                .then_with(|| a.sequence.cmp(&b.sequence))
        });

        // Sells: lowest effective_price first, then lowest sequence
        sells.sort_by(|a, b| {
            a.effective_price()
                .cmp(&b.effective_price())
                .then_with(|| a.sequence.cmp(&b.sequence))
        });

        // Compute clearing price
        let clearing = compute_clearing_price(&buys, &sells);

        let mut trades = Vec::new();
        let mut clearing_price_used = None;

        if let Some(clearing_result) = clearing {
            let cp = clearing_result.price;
            clearing_price_used = Some(cp);

            let mut sell_idx = 0;
            let mut fill_sequence: u64 = 0;

            for buy in &mut buys {
                if buy.remaining_qty.is_zero() {
                    continue;
                }
                // Only buys willing to pay >= clearing price are eligible
                if buy.effective_price() < cp {
                    break;
                }

                while sell_idx < sells.len() && buy.remaining_qty > rust_decimal::Decimal::ZERO {
                    let sell = &mut sells[sell_idx];

                    // Only sells willing to accept <= clearing price are eligible
                    if sell.effective_price() > cp {
                        break;
                    }

                    if sell.remaining_qty.is_zero() {
                        sell_idx += 1;
                        continue;
                    }

                    // ── SELF-TRADE PREVENTION (OM_ERR_502) ──────────────────
                    // An attacker with source code knows the matching order.
                    // They could place both buy and sell to wash-trade and
                    // manipulate volume/price signals. We skip same-user pairs.
                    // This is deterministic: every node skips the same pairs.
                    if buy.user_id == sell.user_id {
                        tracing::warn!(
                            user = %buy.user_id,
                            buy_order = %buy.id,
                            sell_order = %sell.id,
                            "Self-trade blocked: same user on both sides"
                        );
                        sell_idx += 1;
                        continue;
                    }

                    let fill_qty = buy.remaining_qty.min(sell.remaining_qty);
                    let quote_amount = cp
                        .checked_mul(fill_qty)
                        .unwrap_or(rust_decimal::Decimal::MAX);

                    // Deterministic trade ID: same batch + fill sequence → same ID
                    let trade_id = TradeId::deterministic(batch_id.0, fill_sequence);
                    fill_sequence += 1;

                    let trade = Trade {
                        id: trade_id,
                        batch_id,
                        market: buy.market.clone(),
                        taker_order_id: buy.id,
                        taker_user_id: buy.user_id,
                        maker_order_id: sell.id,
                        maker_user_id: sell.user_id,
                        price: cp,
                        quantity: fill_qty,
                        quote_amount,
                        taker_side: OrderSide::Buy,
                        matcher_node: self.node_id,
                        executed_at: chrono::Utc::now(),
                    };

                    buy.remaining_qty -= fill_qty;
                    sell.remaining_qty -= fill_qty;

                    tracing::debug!(
                        trade_id = %trade.id,
                        buyer = %trade.taker_user_id,
                        seller = %trade.maker_user_id,
                        price = %trade.price,
                        qty = %trade.quantity,
                        "Trade matched"
                    );

                    trades.push(trade);

                    if sell.remaining_qty.is_zero() {
                        sell_idx += 1;
                    }
                }
            }
        }

        // Compute deterministic result hash
        let result_hash = Self::compute_result_hash(batch_id, &trades);

        // Collect remaining (unfilled / partially filled) orders
        let remaining_orders: Vec<Order> = buys
            .into_iter()
            .chain(sells)
            .filter(|o| o.remaining_qty > rust_decimal::Decimal::ZERO)
            .collect();

        tracing::info!(
            batch = batch_id.0,
            trades = trades.len(),
            remaining = remaining_orders.len(),
            clearing_price = ?clearing_price_used,
            result_hash = hex::encode(result_hash),
            "Batch matching complete"
        );

        Ok(BatchResult {
            batch_id,
            trades,
            result_hash,
            input_hash,
            remaining_orders,
            clearing_price: clearing_price_used,
        })
    }

    /// Compute the deterministic result hash over the trade output.
    ///
    /// `SHA-256(domain_sep || batch_id || num_trades || for each trade: id || price || qty)`
    fn compute_result_hash(batch_id: BatchId, trades: &[Trade]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"openmatch:result:v1:");
        hasher.update(batch_id.0.to_le_bytes());
        hasher.update((trades.len() as u64).to_le_bytes());
        for trade in trades {
            hasher.update(trade.id.0.as_bytes());
            hasher.update(trade.price.to_string().as_bytes());
            hasher.update(trade.quantity.to_string().as_bytes());
            hasher.update(trade.taker_order_id.0.as_bytes());
            hasher.update(trade.maker_order_id.0.as_bytes());
        }
        hasher.finalize().into()
    }
}
