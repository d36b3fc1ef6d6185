//! API error type and its HTTP mapping.

use crate::models::ErrorResponse;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dex_metrics_domain::DomainError;
use dex_metrics_engine::MetricsError;
use thiserror::Error;
use tracing::error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing request parameter.
    #[error("{0}")]
    BadRequest(String),

    /// No such route or resource.
    #[error("{0}")]
    NotFound(String),

    /// A source failed; the request produced no result.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MetricsError> for ApiError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::InvalidInput(message) => Self::BadRequest(message),
            MetricsError::Source(source) => {
                error!(error = %source, "Source failure");
                Self::Internal(source.to_string())
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_metrics_data::DataError;

    #[test]
    fn test_metrics_errors_map_to_status() {
        let bad: ApiError = MetricsError::InvalidInput("address must not be empty".into()).into();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let failed: ApiError =
            MetricsError::Source(DataError::Unavailable("transaction log".into())).into();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_error_is_bad_request() {
        let err: ApiError = DomainError::UnknownRange("2w".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
