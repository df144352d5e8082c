//! # Hyperliquid Fill Source
//!
//! Reads an account's fills through the public `info` endpoint using the
//! `userFillsByTime` request. The venue caps each response, so a window is
//! walked with a time cursor: after a full page the cursor moves to one
//! millisecond past the last fill and the next page is requested after a
//! short pause.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::entities::trade::{Trade, TradeSide};
use crate::domain::errors::{SourceError, ValidationError};
use crate::domain::repositories::trade_source::{SourceResult, TradeSource};

const HYPERLIQUID_INFO_URL: &str = "https://api.hyperliquid.xyz/info";

/// Hyperliquid client configuration
#[derive(Debug, Clone)]
pub struct HyperliquidConfig {
    pub api_url: String,
    pub timeout: Duration,
    /// Page size the venue returns at most per request.
    pub max_trades_per_batch: usize,
    /// Pause between consecutive page requests.
    pub rate_limit_delay: Duration,
}

impl Default for HyperliquidConfig {
    fn default() -> Self {
        Self {
            api_url: HYPERLIQUID_INFO_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_trades_per_batch: 2000,
            rate_limit_delay: Duration::from_millis(300),
        }
    }
}

/// Request body for `userFillsByTime`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFillsRequest<'a> {
    pub r#type: &'static str,
    pub user: &'a str,
    pub start_time: i64,
    pub end_time: i64,
    pub aggregate_by_time: bool,
}

/// A single fill as reported by the venue
#[derive(Debug, Clone, Deserialize)]
pub struct FillResponse {
    pub time: i64,
    pub coin: String,
    pub side: String,
    pub px: String,
    pub sz: String,
}

impl TryFrom<&FillResponse> for Trade {
    type Error = ValidationError;

    fn try_from(fill: &FillResponse) -> Result<Self, Self::Error> {
        let price = fill
            .px
            .parse::<f64>()
            .map_err(|e| ValidationError::InvalidPrice(format!("'{}': {}", fill.px, e)))?;
        let size = fill
            .sz
            .parse::<f64>()
            .map_err(|e| ValidationError::InvalidSize(format!("'{}': {}", fill.sz, e)))?;
        let side = TradeSide::from_venue_code(&fill.side)?;
        let time = Utc
            .timestamp_millis_opt(fill.time)
            .single()
            .ok_or(ValidationError::InvalidTimestamp(fill.time))?;

        Trade::new(time, fill.coin.clone(), side, price, size)
    }
}

/// Hyperliquid client for fill history
pub struct HyperliquidClient {
    client: Client,
    config: HyperliquidConfig,
}

impl HyperliquidClient {
    pub fn new(config: HyperliquidConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Fetch a single page of fills in `[start_ms, end_ms]`.
    async fn fetch_batch(
        &self,
        account: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> SourceResult<Vec<FillResponse>> {
        let request = UserFillsRequest {
            r#type: "userFillsByTime",
            user: account,
            start_time: start_ms,
            end_time: end_ms,
            aggregate_by_time: true,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                SourceError::RateLimited {
                    status: status.as_u16(),
                    body,
                }
            } else {
                SourceError::Status {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::Decode(format!("Failed to parse fills: {}", e)))
    }
}

#[async_trait]
impl TradeSource for HyperliquidClient {
    fn name(&self) -> &str {
        "hyperliquid"
    }

    async fn fetch_range(
        &self,
        account: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SourceResult<Vec<Trade>> {
        let end_ms = end.timestamp_millis();
        let mut cursor = start.timestamp_millis();

        info!(
            "Fetching trades for {} from {} to {}",
            account,
            start.to_rfc3339(),
            end.to_rfc3339()
        );

        let mut trades = Vec::new();
        let mut batch_count = 0usize;

        loop {
            if batch_count > 0 {
                tokio::time::sleep(self.config.rate_limit_delay).await;
            }
            batch_count += 1;

            let fills = match self.fetch_batch(account, cursor, end_ms).await {
                Ok(fills) => fills,
                Err(e) => {
                    warn!("Failed to fetch batch {} for {}: {}", batch_count, account, e);
                    return Err(e);
                }
            };
            debug!("Batch {} for {}: {} fills", batch_count, account, fills.len());

            let Some(last) = fills.last() else {
                break;
            };
            let last_time = last.time;

            for fill in &fills {
                match Trade::try_from(fill) {
                    Ok(trade) => trades.push(trade),
                    Err(e) => warn!("Skipping fill at {} for {}: {}", fill.time, fill.coin, e),
                }
            }

            if fills.len() < self.config.max_trades_per_batch {
                break;
            }

            // A full page that ends before the cursor would be requested forever.
            if last_time < cursor {
                return Err(SourceError::Decode(format!(
                    "non-advancing page for {}: last fill at {} is before cursor {}",
                    account, last_time, cursor
                )));
            }

            match last_time.checked_add(1) {
                Some(next) if next <= end_ms => cursor = next,
                _ => break,
            }
        }

        info!("Fetched {} trades in {} batches", trades.len(), batch_count);
        Ok(trades)
    }
}
