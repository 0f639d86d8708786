//! Pure deterministic batch matcher.
//!
//! The core matching function: takes a `SealedBatch` and produces a
//! `TradeBundle`. This is the **only** function that MatchCore exposes —
//! no side effects, no DB writes, no balance checks.
//!
//! ```text
//! match_sealed_batch(SealedBatch) -> TradeBundle
//! ```
//!
//! ## Self-Trade Prevention
//!
//! If a buy and sell order have the same `user_id`, the match is skipped
//! (wash trading prevention). The aggressive order continues to match
//! against the next passive order at that level.

use chrono::Utc;
use openmatch_types::{
    NodeId, Order, OrderSide, OrderType, SealedBatch, Trade, TradeBundle, TradeId,
};
use rust_decimal::Decimal;

use crate::{OrderBook, clearing::compute_clearing_price, determinism::compute_trade_root};

/// Pure deterministic matching: takes a sealed batch, produces a trade bundle.
///
/// ## Algorithm
///
/// 1. Insert all orders from the sealed batch into a fresh order book
/// 2. Compute the uniform clearing price
/// 3. Walk crossing orders and produce trades at the clearing price
/// 4. Self-trade prevention: skip fills where buyer == seller
/// 5. Compute trade_root hash for cross-node verification
/// 6. Return the `TradeBundle`
///
/// ## Determinism Guarantee
///
/// Given the same `SealedBatch` (same orders in same order with same
/// `batch_hash`), this function produces the **exact same** `TradeBundle`
/// on every node — same trades, same trade_root, same clearing price.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn match_sealed_batch(batch: &SealedBatch) -> TradeBundle {
    let Some(first) = batch.orders.first() else {
        // Empty batch → empty bundle
        return TradeBundle {
            epoch_id: batch.epoch_id,
            trades: vec![],
            trade_root: compute_trade_root(&[]),
            input_hash: batch.batch_hash,
            clearing_price: None,
            remaining_orders: vec![],
        };
    };
    let market = first.market.clone();

    // 1. Build the order book from the sealed batch
    let mut book = OrderBook::new(market);
    for order in &batch.orders {
        // Skip non-matchable orders (cancel orders)
        if order.order_type == OrderType::Cancel {
            continue;
        }
        // Ignore insert errors (duplicate order IDs in a sealed batch shouldn't happen)
        let _ = book.insert_order(order.clone());
    }

    // 2. Compute the clearing price
    let clearing = compute_clearing_price(&book);

    let Some(clearing_price) = clearing.clearing_price else {
        // No crossing: all orders remain unmatched
        let remaining = book.drain_all();
        return TradeBundle {
            epoch_id: batch.epoch_id,
            trades: vec![],
            trade_root: compute_trade_root(&[]),
            input_hash: batch.batch_hash,
            clearing_price: None,
            remaining_orders: remaining,
        };
    };

    // 3. Walk crossing orders and produce trades
    let mut trades: Vec<Trade> = Vec::new();
    let mut fill_seq: u64 = 0;

    // Collect bids and asks that cross at the clearing price
    let mut bids: Vec<Order> = Vec::new();
    for level in book.bid_levels() {
        if level.price >= clearing_price {
            bids.extend(level.orders.iter().cloned());
        }
    }
    // Sort bids by sequence (deterministic order)
    bids.sort_by_key(|o| o.sequence);

    let mut asks: Vec<Order> = Vec::new();
    for level in book.ask_levels() {
        if level.price <= clearing_price {
            asks.extend(level.orders.iter().cloned());
        }
    }
    // Sort asks by sequence (deterministic order)
    asks.sort_by_key(|o| o.sequence);

    // Match bids against asks at the clearing price
    let mut ask_idx = 0;
    for bid in &mut bids {
        while ask_idx < asks.len() && bid.remaining_qty > Decimal::ZERO {
            let ask = &mut asks[ask_idx];

            if ask.remaining_qty.is_zero() {
                ask_idx += 1;
                continue;
            }

            // Self-trade prevention: skip if same user
            if bid.user_id == ask.user_id {
                ask_idx += 1;
                continue;
            }

            // Compute fill quantity
            let fill_qty = bid.remaining_qty.min(ask.remaining_qty);
            let quote_amount = clearing_price * fill_qty;

            // Create the trade
            let trade = Trade {
                id: TradeId::deterministic(batch.epoch_id.0, fill_seq),
                epoch_id: batch.epoch_id,
                market: bid.market.clone(),
                taker_order_id: bid.id,
                taker_user_id: bid.user_id,
                maker_order_id: ask.id,
                maker_user_id: ask.user_id,
                price: clearing_price,
                quantity: fill_qty,
                quote_amount,
                taker_side: OrderSide::Buy,
                matcher_node: NodeId([0u8; 32]),
                executed_at: Utc::now(),
            };

            trades.push(trade);
            fill_seq += 1;

            bid.remaining_qty -= fill_qty;
            ask.remaining_qty -= fill_qty;

            if ask.remaining_qty.is_zero() {
                ask_idx += 1;
            }
        }
    }

    // 4. Compute trade root for determinism verification
    let trade_root = compute_trade_root(&trades);

    // 5. Collect remaining (unmatched or partially filled) orders
    let mut remaining = Vec::new();
    for order in bids.into_iter().chain(asks.into_iter()) {
        if order.remaining_qty > Decimal::ZERO {
            remaining.push(order);
        }
    }
    // Also collect orders that were completely on the non-crossing side
    // (bids below clearing price, asks above clearing price)
    let all_remaining = book.drain_all();
    for order in all_remaining {
        // Only add orders that weren't already included in bids/asks
        if !remaining.iter().any(|o| o.id == order.id)
            && !trades
                .iter()
                .any(|t| t.taker_order_id == order.id || t.maker_order_id == order.id)
        {
            remaining.push(order);
        }
    }

    TradeBundle {
        epoch_id: batch.epoch_id,
        trades,
        trade_root,
        input_hash: batch.batch_hash,
        clearing_price: Some(clearing_price),
        remaining_orders: remaining,
    }
}
