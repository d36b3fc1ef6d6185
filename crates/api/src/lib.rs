//! REST API server and endpoints.
//!
//! This crate exposes the DEX metrics engine over HTTP:
//! - Token prices, overview and price history
//! - Platform TVL/volume history and rolling volume stats
//! - Address balance history
//! - Transaction recording with cache invalidation
//! - Server-sent event stream of recorded transactions
//! - OpenAPI documentation

/// Prelude module for convenient imports.
pub mod prelude;

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// OpenAPI documentation.
pub mod openapi;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use server::{ApiServer, ServerConfig, ServerError};
pub use state::{AppState, Sources};
