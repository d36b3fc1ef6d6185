//! Prelude module for convenient imports.

pub use crate::error::ApiError;
pub use crate::models::{
    ErrorResponse, ForceQuery, HealthResponse, HistoryQuery, RangeQuery, RecordTransactionRequest,
    TokensQuery,
};
pub use crate::openapi::ApiDoc;
pub use crate::routes::create_router;
pub use crate::server::{ApiServer, ServerConfig, ServerError};
pub use crate::state::{AppState, Sources};
