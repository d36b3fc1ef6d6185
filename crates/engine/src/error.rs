use dex_metrics_data::DataError;
use dex_metrics_domain::DomainError;
use thiserror::Error;

/// Errors raised while computing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A source read or write failed.
    #[error(transparent)]
    Source(#[from] DataError),
}

impl From<DomainError> for MetricsError {
    fn from(err: DomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl MetricsError {
    /// Whether the error is the caller's fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Rejects blank identifiers before any source is touched.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), MetricsError> {
    if value.trim().is_empty() {
        return Err(MetricsError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}
