use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Realized P&L for one UTC calendar day.
///
/// `cumulative_pnl` is only meaningful in a [`PnLSummary`]; freshly
/// aggregated records carry zero until the summary is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnL {
    pub date: NaiveDate,
    #[serde(rename = "tradeCount")]
    pub trade_count: usize,
    #[serde(rename = "dailyPnL")]
    pub daily_pnl: f64,
    #[serde(rename = "cumulativePnL")]
    pub cumulative_pnl: f64,
}

impl DailyPnL {
    pub fn new(date: NaiveDate, trade_count: usize, daily_pnl: f64) -> Self {
        Self {
            date,
            trade_count,
            daily_pnl,
            cumulative_pnl: 0.0,
        }
    }
}

/// Read model handed to callers: most recent day first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PnLSummary {
    #[serde(rename = "dailyRecords")]
    pub daily_records: Vec<DailyPnL>,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
}
