//! Uniform clearing price computation for batch auctions.
//!
//! The clearing price maximizes matched volume. At this price:
//! - All buy orders with `effective_price >= clearing_price` are eligible
//! - All sell orders with `effective_price <= clearing_price` are eligible
//! - The matched volume is `min(eligible_demand, eligible_supply)`
//!
//! Ties are broken by choosing the price with smallest demand/supply imbalance,
//! then by preferring the higher price (benefits existing book liquidity).

use std::collections::BTreeSet;

use openmatch_types::Order;
use rust_decimal::Decimal;

/// Result of clearing price computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearingResult {
    /// The uniform clearing price.
    pub price: Decimal,
    /// The total volume that can be matched at this price.
    pub volume: Decimal,
    /// Total demand (buy quantity) at the clearing price.
    pub demand: Decimal,
    /// Total supply (sell quantity) at the clearing price.
    pub supply: Decimal,
}

/// Compute the uniform clearing price for a batch of buy and sell orders.
///
/// # Algorithm
///
/// 1. Collect all distinct prices from both sides
/// 2. For each candidate price `p`:
///    - `demand(p)` = sum of qty for buys where `effective_price >= p`
///    - `supply(p)` = sum of qty for sells where `effective_price <= p`
///    - `matchable(p)` = `min(demand(p), supply(p))`
/// 3. Choose the price that maximizes `matchable`
/// 4. Tie-break: smallest `|demand - supply|`, then highest price
///
/// # Returns
///
/// `Some(ClearingResult)` if there's a valid crossing, `None` if no match.
#[must_use]
pub fn compute_clearing_price(buys: &[Order], sells: &[Order]) -> Option<ClearingResult> {
    if buys.is_empty() || sells.is_empty() {
        return None;
    }

    // Collect all distinct price levels from both sides
    let mut price_set = BTreeSet::new();
    for order in buys.iter().chain(sells.iter()) {
        let p = order.effective_price();
        // Skip Decimal::MAX (market buy) as a candidate price level —
        // it would make all sells eligible but isn't a real price
        if p != Decimal::MAX {
            price_set.insert(p);
        }
    }

    if price_set.is_empty() {
        return None;
    }

    let mut best: Option<ClearingResult> = None;

    for &p in &price_set {
        // Demand at price p: sum of qty for all buys willing to pay >= p
        let demand: Decimal = buys
            .iter()
            .filter(|b| b.effective_price() >= p)
            .map(|b| b.remaining_qty)
            .sum();

        // Supply at price p: sum of qty for all sells willing to sell <= p
        let supply: Decimal = sells
            .iter()
            .filter(|s| s.effective_price() <= p)
            .map(|s| s.remaining_qty)
            .sum();

        let matchable = demand.min(supply);

        if matchable.is_zero() {
            continue;
        }

        let candidate = ClearingResult {
            price: p,
            volume: matchable,
            demand,
            supply,
        };

        let is_better = match &best {
            None => true,
            Some(current) => {
                if matchable > current.volume {
                    true
                } else if matchable == current.volume {
                    // Tie-break: prefer smallest imbalance
                    let new_imbalance = (demand - supply).abs();
                    let cur_imbalance = (current.demand - current.supply).abs();
                    if new_imbalance < cur_imbalance {
                        true
                    } else if new_imbalance == cur_imbalance {
                        // Second tie-break: prefer higher price
                        p > current.price
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
        };

        if is_better {
            best = Some(candidate);
        }
    }

    best
}
