use chrono::{DateTime, Utc};

use crate::domain::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Parse the venue side code (`B` for buy, `A` for sell/ask).
    pub fn from_venue_code(code: &str) -> Result<Self, ValidationError> {
        match code {
            "B" => Ok(TradeSide::Buy),
            "A" => Ok(TradeSide::Sell),
            other => Err(ValidationError::InvalidSide(other.to_string())),
        }
    }
}

/// Identity of a fill for deduplication.
///
/// Field order matters: the derived `Ord` sorts by time first, so a
/// `BTreeMap<TradeKey, _>` iterates in time order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeKey {
    pub time_ms: i64,
    pub coin: String,
    pub side: TradeSide,
}

/// A single executed fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub time: DateTime<Utc>,
    pub coin: String,
    pub side: TradeSide,
    pub price: f64,
    pub size: f64,
    pub value: f64,
}

impl Trade {
    /// Build a trade, validating price and size and deriving the notional value.
    pub fn new(
        time: DateTime<Utc>,
        coin: impl Into<String>,
        side: TradeSide,
        price: f64,
        size: f64,
    ) -> Result<Self, ValidationError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(ValidationError::InvalidPrice(price.to_string()));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(ValidationError::InvalidSize(size.to_string()));
        }

        Ok(Trade {
            time,
            coin: coin.into(),
            side,
            price,
            size,
            value: price * size,
        })
    }

    pub fn key(&self) -> TradeKey {
        TradeKey {
            time_ms: self.time.timestamp_millis(),
            coin: self.coin.clone(),
            side: self.side,
        }
    }
}
