pub mod hyperliquid_client;
