//! Reconciliation Service
//!
//! Owns the per-account trade caches and the daily P&L table derived from
//! the most recent reconciliation. Each refresh decides between a full
//! historical fetch and an incremental catch-up, merges the result into the
//! cache and recomputes the P&L table from scratch.
//!
//! All state sits behind one `RwLock`. Summary reads share it; a reconcile
//! holds it exclusively for its whole duration, network I/O included, so
//! refreshes of different accounts are serialized.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::entities::daily_pnl::{DailyPnL, PnLSummary};
use crate::domain::entities::trade::Trade;
use crate::domain::errors::SourceError;
use crate::domain::repositories::trade_source::TradeSource;
use crate::domain::services::pnl_calculator::{daily_pnl_from_trades, summarize};
use crate::domain::services::trade_merge::{filter_trades_since, merge_trades};
use crate::domain::value_objects::history_days::HistoryDays;

/// What to do with a cache that has outlived the freshness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    /// Throw the cache away and fetch the whole window again.
    FullRefetch,
    /// Fetch only what happened since the last fetch, as for a fresh cache.
    IncrementalCatchUp,
}

/// Decides how a refresh request is served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshPolicy {
    pub freshness: Duration,
    pub stale_policy: StalePolicy,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            freshness: Duration::hours(1),
            stale_policy: StalePolicy::FullRefetch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Fetch `[now - days, now]` and replace the cache.
    Full,
    /// Fetch `[last_fetch_time, now]` and merge. P&L covers only
    /// `[now - days, now]` of the merged cache; `narrowed` marks a request
    /// shorter than the cached window.
    Incremental { narrowed: bool },
}

impl RefreshPolicy {
    pub fn plan(
        &self,
        cache: Option<&AccountCache>,
        requested: HistoryDays,
        now: DateTime<Utc>,
    ) -> FetchPlan {
        let Some(cache) = cache else {
            return FetchPlan::Full;
        };

        // A larger window needs history the cache never saw.
        if requested > cache.cached_days {
            return FetchPlan::Full;
        }

        let stale = now - cache.last_fetch_time >= self.freshness;
        if stale && self.stale_policy == StalePolicy::FullRefetch {
            return FetchPlan::Full;
        }

        FetchPlan::Incremental {
            narrowed: requested < cache.cached_days,
        }
    }
}

/// Trades known for one account.
#[derive(Debug, Clone)]
pub struct AccountCache {
    trades: Vec<Trade>,
    last_fetch_time: DateTime<Utc>,
    cached_days: HistoryDays,
}

impl AccountCache {
    fn new(fetched: Vec<Trade>, fetched_at: DateTime<Utc>, days: HistoryDays) -> Self {
        Self {
            trades: merge_trades(Vec::new(), fetched),
            last_fetch_time: fetched_at,
            cached_days: days,
        }
    }

    fn absorb(&mut self, fetched: Vec<Trade>, fetched_at: DateTime<Utc>) {
        if !fetched.is_empty() {
            let existing = std::mem::take(&mut self.trades);
            self.trades = merge_trades(existing, fetched);
        }
        self.last_fetch_time = fetched_at;
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn last_fetch_time(&self) -> DateTime<Utc> {
        self.last_fetch_time
    }

    pub fn cached_days(&self) -> HistoryDays {
        self.cached_days
    }
}

/// Outcome of a successful reconcile, mostly useful for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub plan: FetchPlan,
    pub fetched_trades: usize,
    pub cached_trades: usize,
    pub reconciled_trades: usize,
    pub days_reported: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<String, AccountCache>,
    daily_pnl: BTreeMap<NaiveDate, DailyPnL>,
}

impl StoreState {
    /// Fold a successful fetch into the cache and rebuild the P&L table.
    fn apply(
        &mut self,
        account: &str,
        plan: FetchPlan,
        fetched: Vec<Trade>,
        requested: HistoryDays,
        now: DateTime<Utc>,
    ) -> ReconcileReport {
        let fetched_trades = fetched.len();

        let (cached_trades, reconciled_trades, daily) = match self.accounts.get_mut(account) {
            Some(cache) => match plan {
                FetchPlan::Incremental { .. } => {
                    cache.absorb(fetched, now);
                    // The cache keeps older trades; the report never does.
                    let window = filter_trades_since(&cache.trades, now - requested.duration());
                    (cache.trades.len(), window.len(), daily_pnl_from_trades(&window))
                }
                FetchPlan::Full => {
                    *cache = AccountCache::new(fetched, now, requested);
                    let daily = daily_pnl_from_trades(&cache.trades);
                    (cache.trades.len(), cache.trades.len(), daily)
                }
            },
            None => {
                let cache = AccountCache::new(fetched, now, requested);
                let daily = daily_pnl_from_trades(&cache.trades);
                let count = cache.trades.len();
                self.accounts.insert(account.to_string(), cache);
                (count, count, daily)
            }
        };

        self.daily_pnl = daily;

        ReconcileReport {
            plan,
            fetched_trades,
            cached_trades,
            reconciled_trades,
            days_reported: self.daily_pnl.len(),
        }
    }
}

/// Per-account trade cache plus the P&L table of the last reconciliation.
pub struct ReconciliationService {
    source: Arc<dyn TradeSource>,
    policy: RefreshPolicy,
    state: RwLock<StoreState>,
}

impl ReconciliationService {
    pub fn new(source: Arc<dyn TradeSource>) -> Self {
        Self::with_policy(source, RefreshPolicy::default())
    }

    pub fn with_policy(source: Arc<dyn TradeSource>, policy: RefreshPolicy) -> Self {
        Self {
            source,
            policy,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Refresh `account` for the last `days` days and rebuild the P&L table.
    ///
    /// On error nothing is modified: the previous cache and table survive.
    pub async fn reconcile(
        &self,
        account: &str,
        days: HistoryDays,
    ) -> Result<ReconcileReport, SourceError> {
        self.reconcile_at(account, days, Utc::now()).await
    }

    /// [`reconcile`](Self::reconcile) with an explicit notion of "now".
    pub async fn reconcile_at(
        &self,
        account: &str,
        days: HistoryDays,
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport, SourceError> {
        let mut state = self.state.write().await;

        let cache = state.accounts.get(account);
        let plan = self.policy.plan(cache, days, now);

        let fetched = match (plan, cache) {
            (FetchPlan::Incremental { narrowed }, Some(cache)) => {
                if narrowed {
                    info!(
                        "Cache reuse for {}: requested {} days, have {} days cached",
                        account,
                        days.days(),
                        cache.cached_days.days()
                    );
                } else {
                    info!(
                        "Incremental fetch for {}: new trades since {}",
                        account,
                        cache.last_fetch_time.to_rfc3339()
                    );
                }
                let since = cache.last_fetch_time;
                self.source.fetch_range(account, since, now).await?
            }
            _ => {
                info!(
                    "Full fetch for {} from {}: all trades for last {} days",
                    account,
                    self.source.name(),
                    days.days()
                );
                self.source
                    .fetch_range(account, now - days.duration(), now)
                    .await?
            }
        };

        let report = state.apply(account, plan, fetched, days, now);

        info!(
            "Reconciliation complete for {}: {:?}, {} fetched, {} cached, {} used, {} days",
            account,
            report.plan,
            report.fetched_trades,
            report.cached_trades,
            report.reconciled_trades,
            report.days_reported
        );

        Ok(report)
    }

    /// Daily records of the last reconciliation, most recent first.
    pub async fn summary(&self) -> PnLSummary {
        let state = self.state.read().await;
        summarize(&state.daily_pnl)
    }

    /// Copy of the cache entry for `account`, if one exists.
    pub async fn cached_account(&self, account: &str) -> Option<AccountCache> {
        self.state.read().await.accounts.get(account).cloned()
    }
}
