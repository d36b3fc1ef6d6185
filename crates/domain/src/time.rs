//! Epoch-millisecond helpers.

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// One hour in milliseconds.
pub const HOUR_MS: EpochMillis = 60 * 60 * 1000;
/// One day in milliseconds.
pub const DAY_MS: EpochMillis = 24 * HOUR_MS;
/// One week in milliseconds.
pub const WEEK_MS: EpochMillis = 7 * DAY_MS;

/// Earliest timestamp the log accepts: the BCH chain split, 2017-08-01T00:00:00Z.
pub const LOG_EPOCH_MS: EpochMillis = 1_501_545_600_000;
/// How far ahead of server time a recorded entry may be stamped.
pub const MAX_FUTURE_SKEW_MS: EpochMillis = 5 * 60 * 1000;

/// Current wall-clock time.
#[must_use]
pub fn now_millis() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}

/// Number of `days` in milliseconds, saturating.
#[must_use]
pub fn days(days: u32) -> EpochMillis {
    DAY_MS.saturating_mul(EpochMillis::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_epoch_is_chain_split() {
        let split = chrono::DateTime::from_timestamp_millis(LOG_EPOCH_MS).map(|dt| dt.to_rfc3339());
        assert_eq!(split.as_deref(), Some("2017-08-01T00:00:00+00:00"));
        assert_eq!(days(2), 2 * DAY_MS);
        assert_eq!(days(u32::MAX), DAY_MS * EpochMillis::from(u32::MAX));
    }
}
