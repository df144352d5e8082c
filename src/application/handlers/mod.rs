pub mod pnl_handler;
