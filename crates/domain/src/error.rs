//! Errors raised while building or validating domain values.

/// Validation and parsing errors for domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required field was empty or absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// Unrecognised transaction type.
    #[error("unknown transaction type: {0}")]
    UnknownTransactionType(String),
    /// Unrecognised trade direction.
    #[error("unknown trade direction: {0}")]
    UnknownDirection(String),
    /// Unrecognised time range.
    #[error("unknown time range: {0}")]
    UnknownRange(String),
    /// Unrecognised TVL convention.
    #[error("unknown tvl convention: {0}")]
    UnknownTvlConvention(String),
    /// The amount legs do not match the entry type or direction.
    #[error("invalid amounts: {0}")]
    InvalidAmounts(String),
    /// An amount was negative.
    #[error("negative amount in field {0}")]
    NegativeAmount(&'static str),
    /// `createdAt` predates the chain or lies too far in the future.
    #[error("createdAt {0} is outside the accepted range")]
    TimestampOutOfRange(i64),
}
