//! Daily realized P&L aggregation
//!
//! Realized P&L for a day is computed per coin as total sell notional minus
//! total buy notional, then summed across coins. Open positions are not
//! marked, so a day with only buys reports a loss equal to what was spent.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::entities::daily_pnl::{DailyPnL, PnLSummary};
use crate::domain::entities::trade::{Trade, TradeSide};

/// Buy and sell notional accumulated for one coin on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoinFlow {
    pub buy_value: f64,
    pub sell_value: f64,
}

impl CoinFlow {
    pub fn record(&mut self, trade: &Trade) {
        match trade.side {
            TradeSide::Buy => self.buy_value += trade.value,
            TradeSide::Sell => self.sell_value += trade.value,
        }
    }

    pub fn realized(&self) -> f64 {
        self.sell_value - self.buy_value
    }
}

/// Realized P&L for a set of trades that all fall on the same day.
pub fn pnl_for_day(trades: &[&Trade]) -> f64 {
    let mut flows: HashMap<&str, CoinFlow> = HashMap::new();

    for trade in trades {
        flows.entry(trade.coin.as_str()).or_default().record(trade);
    }

    flows.values().map(CoinFlow::realized).sum()
}

/// Group trades by UTC calendar day and compute each day's realized P&L.
pub fn daily_pnl_from_trades(trades: &[Trade]) -> BTreeMap<NaiveDate, DailyPnL> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Trade>> = BTreeMap::new();

    for trade in trades {
        by_date.entry(trade.time.date_naive()).or_default().push(trade);
    }

    by_date
        .into_iter()
        .map(|(date, day_trades)| {
            let pnl = pnl_for_day(&day_trades);
            (date, DailyPnL::new(date, day_trades.len(), pnl))
        })
        .collect()
}

/// Build the read model: running cumulative P&L in date order, presented
/// most recent first.
pub fn summarize(daily: &BTreeMap<NaiveDate, DailyPnL>) -> PnLSummary {
    let mut cumulative = 0.0;
    let mut records: Vec<DailyPnL> = daily
        .values()
        .map(|record| {
            cumulative += record.daily_pnl;
            DailyPnL {
                cumulative_pnl: cumulative,
                ..record.clone()
            }
        })
        .collect();
    records.reverse();

    let total_pnl = records.iter().map(|record| record.daily_pnl).sum();

    PnLSummary {
        daily_records: records,
        total_pnl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn trade(time: &str, coin: &str, side: TradeSide, price: f64, size: f64) -> Trade {
        let time = DateTime::parse_from_rfc3339(time).unwrap().with_timezone(&Utc);
        Trade::new(time, coin, side, price, size).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_buy_then_sell_same_day() {
        let trades = vec![
            trade("2025-01-01T10:00:00Z", "BTC", TradeSide::Buy, 50000.0, 1.0),
            trade("2025-01-01T11:00:00Z", "BTC", TradeSide::Sell, 51000.0, 1.0),
        ];

        let daily = daily_pnl_from_trades(&trades);

        assert_eq!(daily.len(), 1);
        let record = &daily[&date("2025-01-01")];
        assert_eq!(record.trade_count, 2);
        assert_eq!(record.daily_pnl, 1000.0);
    }

    #[test]
    fn test_only_buys_is_negative() {
        let trades = vec![
            trade("2025-01-01T10:00:00Z", "BTC", TradeSide::Buy, 50000.0, 1.0),
            trade("2025-01-01T11:00:00Z", "ETH", TradeSide::Buy, 3000.0, 2.0),
        ];

        let daily = daily_pnl_from_trades(&trades);

        assert_eq!(daily[&date("2025-01-01")].daily_pnl, -56000.0);
    }

    #[test]
    fn test_only_sells_is_positive() {
        let trades = vec![trade("2025-01-01T10:00:00Z", "ETH", TradeSide::Sell, 3000.0, 2.0)];

        let daily = daily_pnl_from_trades(&trades);

        assert_eq!(daily[&date("2025-01-01")].daily_pnl, 6000.0);
    }

    #[test]
    fn test_multiple_coins_are_summed() {
        let trades = vec![
            trade("2025-01-01T10:00:00Z", "BTC", TradeSide::Buy, 50000.0, 1.0),
            trade("2025-01-01T11:00:00Z", "BTC", TradeSide::Sell, 51000.0, 1.0),
            trade("2025-01-01T12:00:00Z", "ETH", TradeSide::Buy, 3000.0, 1.0),
            trade("2025-01-01T13:00:00Z", "ETH", TradeSide::Sell, 2900.0, 1.0),
        ];

        let daily = daily_pnl_from_trades(&trades);

        assert_eq!(daily[&date("2025-01-01")].daily_pnl, 900.0);
        assert_eq!(daily[&date("2025-01-01")].trade_count, 4);
    }

    #[test]
    fn test_days_split_on_utc_boundary() {
        let trades = vec![
            trade("2025-01-01T23:59:59.999Z", "BTC", TradeSide::Buy, 100.0, 1.0),
            trade("2025-01-02T00:00:00Z", "BTC", TradeSide::Sell, 110.0, 1.0),
        ];

        let daily = daily_pnl_from_trades(&trades);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[&date("2025-01-01")].daily_pnl, -100.0);
        assert_eq!(daily[&date("2025-01-02")].daily_pnl, 110.0);
    }

    #[test]
    fn test_cumulative_and_descending_order() {
        let trades = vec![
            trade("2025-01-01T10:00:00Z", "BTC", TradeSide::Buy, 50000.0, 1.0),
            trade("2025-01-01T11:00:00Z", "BTC", TradeSide::Sell, 51000.0, 1.0),
            trade("2025-01-02T10:00:00Z", "ETH", TradeSide::Buy, 3000.0, 1.0),
            trade("2025-01-02T11:00:00Z", "ETH", TradeSide::Sell, 3100.0, 1.0),
            trade("2025-01-03T10:00:00Z", "SOL", TradeSide::Buy, 100.0, 5.0),
            trade("2025-01-03T11:00:00Z", "SOL", TradeSide::Sell, 200.0, 5.0),
        ];

        let summary = summarize(&daily_pnl_from_trades(&trades));

        let dates: Vec<NaiveDate> = summary.daily_records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-01-03"), date("2025-01-02"), date("2025-01-01")]
        );
        let daily: Vec<f64> = summary.daily_records.iter().map(|r| r.daily_pnl).collect();
        assert_eq!(daily, vec![500.0, 100.0, 1000.0]);
        let cumulative: Vec<f64> = summary
            .daily_records
            .iter()
            .map(|r| r.cumulative_pnl)
            .collect();
        assert_eq!(cumulative, vec![1600.0, 1100.0, 1000.0]);
        assert_eq!(summary.total_pnl, 1600.0);
    }

    #[test]
    fn test_total_matches_sum_of_days() {
        let trades = vec![
            trade("2025-01-01T10:00:00Z", "BTC", TradeSide::Buy, 100.0, 1.0),
            trade("2025-01-02T10:00:00Z", "BTC", TradeSide::Sell, 250.0, 1.0),
            trade("2025-01-04T10:00:00Z", "ETH", TradeSide::Buy, 40.0, 1.0),
        ];

        let summary = summarize(&daily_pnl_from_trades(&trades));

        let sum: f64 = summary.daily_records.iter().map(|r| r.daily_pnl).sum();
        assert_eq!(summary.total_pnl, sum);
        assert_eq!(summary.total_pnl, 110.0);
        assert_eq!(summary.daily_records[0].cumulative_pnl, summary.total_pnl);
    }

    #[test]
    fn test_empty_input() {
        let daily = daily_pnl_from_trades(&[]);
        assert!(daily.is_empty());

        let summary = summarize(&daily);
        assert!(summary.daily_records.is_empty());
        assert_eq!(summary.total_pnl, 0.0);
    }
}
