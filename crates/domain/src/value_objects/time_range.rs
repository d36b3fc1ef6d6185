use crate::error::DomainError;
use crate::time::{DAY_MS, EpochMillis, days};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lookback window requested by a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "1d")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "1d",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Quarter => "90d",
            Self::Year => "1y",
            Self::All => "all",
        }
    }

    /// Window length, `None` for an unbounded range.
    #[must_use]
    pub fn duration_ms(&self) -> Option<EpochMillis> {
        match self {
            Self::Day => Some(DAY_MS),
            Self::Week => Some(days(7)),
            Self::Month => Some(days(30)),
            Self::Quarter => Some(days(90)),
            Self::Year => Some(days(365)),
            Self::All => None,
        }
    }

    /// Inclusive lower bound relative to `now`, `None` for an unbounded range.
    #[must_use]
    pub fn start(&self, now: EpochMillis) -> Option<EpochMillis> {
        self.duration_ms().map(|d| now.saturating_sub(d))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" | "24h" => Ok(Self::Day),
            "7d" | "1w" => Ok(Self::Week),
            "30d" | "1m" => Ok(Self::Month),
            "90d" | "3m" => Ok(Self::Quarter),
            "1y" | "365d" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(DomainError::UnknownRange(other.to_string())),
        }
    }
}
