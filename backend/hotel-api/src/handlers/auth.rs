use actix_middleware::extract_bearer_token;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use error_types::AppError;
use jwt_security::revocation_ttl;

use crate::app::AppState;

/// POST /api/v1/auth/logout
///
/// Revokes the presented bearer token until it would have expired anyway.
/// Unlike the revocation check, a store failure here is not ignored: it is
/// reported as an internal error.
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = extract_bearer_token(req.headers())
        .ok_or_else(|| AppError::unauthorized("Missing or invalid Authorization header"))?;

    let ttl = revocation_ttl(token, Utc::now());
    state
        .token_store
        .revoke(token, ttl)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Failed to revoke token"))?;

    tracing::info!(ttl_secs = ttl.as_secs(), "Bearer token revoked on logout");
    Ok(HttpResponse::NoContent().finish())
}
