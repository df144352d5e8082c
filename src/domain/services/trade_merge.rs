use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::entities::trade::{Trade, TradeKey};

/// Merge freshly fetched trades into an existing set.
///
/// Trades are keyed by (time, coin, side). A fetched trade replaces a cached
/// one with the same key, so venue revisions within one bucket win. The
/// result is ascending by time; equal timestamps are ordered by coin then side.
pub fn merge_trades(existing: Vec<Trade>, fetched: Vec<Trade>) -> Vec<Trade> {
    let mut by_key: BTreeMap<TradeKey, Trade> = BTreeMap::new();

    for trade in existing.into_iter().chain(fetched) {
        by_key.insert(trade.key(), trade);
    }

    by_key.into_values().collect()
}

/// Trades at or after `cutoff`, in their original relative order.
pub fn filter_trades_since(trades: &[Trade], cutoff: DateTime<Utc>) -> Vec<Trade> {
    trades
        .iter()
        .filter(|trade| trade.time >= cutoff)
        .cloned()
        .collect()
}
