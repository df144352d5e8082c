use chrono::Duration;

use crate::domain::errors::ValidationError;

/// Longest window accepted for a history request (ten years).
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Number of days of trade history a caller asks for.
///
/// Always at least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HistoryDays(u32);

impl HistoryDays {
    pub fn new(days: u32) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::EmptyHistoryWindow);
        }
        if days > MAX_HISTORY_DAYS {
            return Err(ValidationError::HistoryWindowTooLarge(days));
        }
        Ok(HistoryDays(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    /// The window as a span of 24-hour days.
    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.0))
    }
}

impl std::fmt::Display for HistoryDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0)
    }
}
