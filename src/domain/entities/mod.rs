pub mod daily_pnl;
pub mod trade;
