//! Hyperliquid trade reconciliation
//!
//! Fetches an account's fill history, keeps it in a per-account cache and
//! derives a daily realized P&L report from it.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
