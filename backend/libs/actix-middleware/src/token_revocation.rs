//! Bearer token revocation check
//!
//! Rejects requests whose bearer token was revoked (logout, password change)
//! before they reach authentication or any handler. Requests without a
//! bearer token are not touched.
//!
//! Store failures fail open: the request continues as if the token were not
//! revoked, so a Redis outage cannot take the whole API down. The lookup is
//! attempted once, with no retry.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use jwt_security::TokenValidityStore;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, warn};

/// Body message returned for a revoked token.
pub const REVOKED_TOKEN_MESSAGE: &str = "Token đã hết hạn hoặc bị vô hiệu hóa";

const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of the revocation lookup, stored in request extensions when a
/// bearer token was presented and allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    /// The store confirmed the token is not revoked.
    Valid,
    /// The store could not answer; the request was let through anyway.
    Unverified,
}

/// Token after the case-sensitive `"Bearer "` prefix, trimmed.
///
/// `None` for a missing header, a non-UTF-8 value, another scheme or an
/// empty token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that checks bearer token revocation
#[derive(Clone)]
pub struct TokenRevocationMiddleware {
    store: Arc<dyn TokenValidityStore>,
    message: Arc<str>,
}

impl TokenRevocationMiddleware {
    pub fn new(store: Arc<dyn TokenValidityStore>) -> Self {
        Self {
            store,
            message: Arc::from(REVOKED_TOKEN_MESSAGE),
        }
    }

    /// Replace the body message sent for revoked tokens.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Arc::from(message.into());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenRevocationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenRevocationMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenRevocationMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            message: self.message.clone(),
        }))
    }
}

pub struct TokenRevocationMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn TokenValidityStore>,
    message: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for TokenRevocationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let message = self.message.clone();

        Box::pin(async move {
            let Some(token) = extract_bearer_token(req.headers()).map(str::to_owned) else {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            };

            let status = match store.is_revoked(&token).await {
                Ok(true) => {
                    warn!(
                        method = %req.method(),
                        path = %req.path(),
                        "Rejected request with revoked token"
                    );
                    let response = HttpResponse::Unauthorized()
                        .json(serde_json::json!({ "message": &*message }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Ok(false) => RevocationStatus::Valid,
                Err(e) => {
                    // Fail open
                    error!(
                        method = %req.method(),
                        path = %req.path(),
                        error = %e,
                        "Token revocation check failed, allowing request"
                    );
                    RevocationStatus::Unverified
                }
            };

            req.extensions_mut().insert(status);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc123")), Some("abc123"));
    }

    #[test]
    fn test_extract_trims_surrounding_whitespace() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer   abc123  ")), Some("abc123"));
    }

    #[test]
    fn test_extract_requires_exact_scheme() {
        assert_eq!(extract_bearer_token(&headers_with("bearer abc123")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearerabc123")), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
    }

    #[test]
    fn test_extract_rejects_empty_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer    ")), None);
    }

    #[test]
    fn test_extract_missing_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
