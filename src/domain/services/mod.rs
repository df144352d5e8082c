pub mod pnl_calculator;
pub mod trade_merge;
