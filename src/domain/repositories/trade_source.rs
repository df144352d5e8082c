//! Trade Source Trait
//!
//! Abstraction over the venue that reports an account's fills. The
//! reconciliation store only talks to this trait, which keeps it independent
//! of the HTTP client and lets tests drive it with an in-memory source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::trade::Trade;
use crate::domain::errors::SourceError;

pub type SourceResult<T> = Result<T, SourceError>;

#[async_trait]
pub trait TradeSource: Send + Sync {
    /// Name of the venue, for logging.
    fn name(&self) -> &str;

    /// Fetch every fill for `account` with `start <= time <= end`.
    ///
    /// # Returns
    /// Trades in ascending time order. Implementations page through the
    /// venue until the window is exhausted; they never truncate silently.
    async fn fetch_range(
        &self,
        account: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SourceResult<Vec<Trade>>;
}
