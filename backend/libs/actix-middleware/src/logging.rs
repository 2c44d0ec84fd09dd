//! Access log middleware
//!
//! One `tracing` event per finished request. The level follows the
//! outcome: `info` below 400, `warn` for client errors, `error` for server
//! errors. Completed requests also carry the correlation id and the
//! revocation outcome recorded by the inner layers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{Method, StatusCode},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::{Duration, Instant};

use crate::correlation_id::CorrelationId;
use crate::token_revocation::RevocationStatus;

/// Middleware that writes the access log
#[derive(Clone, Copy, Default)]
pub struct RequestLogging;

impl<S, B> Transform<S, ServiceRequest> for RequestLogging
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggingService { service }))
    }
}

pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let entry = AccessLogEntry {
            method: req.method().clone(),
            path: req.path().to_owned(),
            start: Instant::now(),
        };
        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let extensions = res.request().extensions();
                    let correlation_id = extensions
                        .get::<CorrelationId>()
                        .map(|id| id.as_str().to_owned());
                    let revocation = extensions.get::<RevocationStatus>().copied();
                    drop(extensions);

                    entry.finish(res.status(), correlation_id.as_deref(), revocation);
                    Ok(res)
                }
                Err(err) => {
                    // Only the status is read; rendering would consume the
                    // prepared response held by the error.
                    entry.finish(err.as_response_error().status_code(), None, None);
                    Err(err)
                }
            }
        })
    }
}

struct AccessLogEntry {
    method: Method,
    path: String,
    start: Instant,
}

impl AccessLogEntry {
    fn finish(
        &self,
        status: StatusCode,
        correlation_id: Option<&str>,
        revocation: Option<RevocationStatus>,
    ) {
        let duration_ms = duration_ms(self.start.elapsed());
        let correlation_id = correlation_id.unwrap_or_default();
        let revocation = revocation.map(|status| format!("{:?}", status)).unwrap_or_default();
        let (method, path) = (&self.method, &self.path);

        macro_rules! access_log {
            ($level:ident) => {
                tracing::$level!(
                    method = %method,
                    path = %path,
                    status = status.as_u16(),
                    duration_ms,
                    correlation_id,
                    revocation = %revocation,
                    "HTTP request completed"
                )
            };
        }

        if status.is_server_error() {
            access_log!(error);
        } else if status.is_client_error() {
            access_log!(warn);
        } else {
            access_log!(info);
        }
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
