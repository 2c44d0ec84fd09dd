//! # Actix Middleware Library
//!
//! Request pipeline components for the hotel API
//!
//! ## Modules
//! - `error_normalizer`: turns any failure into a JSON error envelope
//! - `token_revocation`: rejects revoked bearer tokens
//! - `correlation_id`: request correlation IDs
//! - `logging`: request/response logging

pub mod correlation_id;
pub mod error_normalizer;
pub mod logging;
pub mod token_revocation;

pub use correlation_id::{CorrelationId, CorrelationIdMiddleware, CORRELATION_ID_HEADER};
pub use error_normalizer::ErrorNormalizer;
pub use logging::RequestLogging;
pub use token_revocation::{
    extract_bearer_token, RevocationStatus, TokenRevocationMiddleware, REVOKED_TOKEN_MESSAGE,
};
