use std::time::Duration;

use crate::application::services::reconciliation_service::{RefreshPolicy, StalePolicy};
use crate::domain::value_objects::history_days::HistoryDays;
use crate::infrastructure::hyperliquid_client::HyperliquidConfig;

const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz/info";

/// Runtime configuration for the reconciliation server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub api_url: String,
    pub api_timeout_seconds: u64,
    pub trade_history_days: u32, // Window used when a refresh omits `days`
    pub max_trades_per_batch: usize,
    pub rate_limit_delay_ms: u64, // Pause between paginated requests
    pub cache_freshness_seconds: u64,
    pub stale_policy: StalePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_port: 8080,
            api_url: HYPERLIQUID_API_URL.to_string(),
            api_timeout_seconds: 30,
            trade_history_days: 10,
            max_trades_per_batch: 2000,
            rate_limit_delay_ms: 300,
            cache_freshness_seconds: 3600, // 1 hour
            stale_policy: StalePolicy::FullRefetch,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults for
    /// missing or out-of-range values.
    pub fn from_lookup<F>(lookup: F) -> AppConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(port) = lookup("SERVER_PORT") {
            match port.parse::<u16>() {
                Ok(value) if value > 0 => config.server_port = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid SERVER_PORT '{}', using default: {}",
                        port,
                        config.server_port
                    );
                }
            }
        }

        if let Some(url) = lookup("HYPERLIQUID_API_URL") {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_url = url;
            } else {
                tracing::warn!(
                    "Invalid HYPERLIQUID_API_URL '{}', using default: {}",
                    url,
                    config.api_url
                );
            }
        }

        if let Some(timeout) = lookup("API_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) if (1..=300).contains(&value) => config.api_timeout_seconds = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid API_TIMEOUT_SECONDS '{}' (expected 1-300), using default: {}",
                        timeout,
                        config.api_timeout_seconds
                    );
                }
            }
        }

        if let Some(days) = lookup("TRADE_HISTORY_DAYS") {
            match days.parse::<u32>() {
                Ok(value) if HistoryDays::new(value).is_ok() => config.trade_history_days = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid TRADE_HISTORY_DAYS '{}', using default: {}",
                        days,
                        config.trade_history_days
                    );
                }
            }
        }

        if let Some(batch) = lookup("MAX_TRADES_PER_BATCH") {
            match batch.parse::<usize>() {
                Ok(value) if (1..=10_000).contains(&value) => config.max_trades_per_batch = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid MAX_TRADES_PER_BATCH '{}' (expected 1-10000), using default: {}",
                        batch,
                        config.max_trades_per_batch
                    );
                }
            }
        }

        if let Some(delay) = lookup("RATE_LIMIT_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(value) if value <= 10_000 => config.rate_limit_delay_ms = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid RATE_LIMIT_DELAY_MS '{}' (expected 0-10000), using default: {}",
                        delay,
                        config.rate_limit_delay_ms
                    );
                }
            }
        }

        if let Some(freshness) = lookup("CACHE_FRESHNESS_SECONDS") {
            match freshness.parse::<u64>() {
                Ok(value) if value > 0 => config.cache_freshness_seconds = value,
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        "Invalid CACHE_FRESHNESS_SECONDS '{}', using default: {}",
                        freshness,
                        config.cache_freshness_seconds
                    );
                }
            }
        }

        if let Some(policy) = lookup("STALE_POLICY") {
            match policy.to_lowercase().as_str() {
                "full" => config.stale_policy = StalePolicy::FullRefetch,
                "incremental" => config.stale_policy = StalePolicy::IncrementalCatchUp,
                other => {
                    tracing::warn!(
                        "Unknown STALE_POLICY '{}' (expected 'full' or 'incremental'), using default: {:?}",
                        other,
                        config.stale_policy
                    );
                }
            }
        }

        config
    }

    pub fn hyperliquid(&self) -> HyperliquidConfig {
        HyperliquidConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.api_timeout_seconds),
            max_trades_per_batch: self.max_trades_per_batch,
            rate_limit_delay: Duration::from_millis(self.rate_limit_delay_ms),
        }
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            freshness: chrono::Duration::seconds(self.cache_freshness_seconds as i64),
            stale_policy: self.stale_policy,
        }
    }
}
