use dex_metrics_domain::EpochMillis;
use dex_metrics_domain::time::now_millis;

/// Source of "now" for every derived figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// A pinned instant.
    Fixed(EpochMillis),
}

impl Clock {
    /// Current instant in epoch milliseconds.
    #[must_use]
    pub fn now(&self) -> EpochMillis {
        match self {
            Self::System => now_millis(),
            Self::Fixed(at) => *at,
        }
    }
}
