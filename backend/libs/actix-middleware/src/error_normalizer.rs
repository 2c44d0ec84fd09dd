//! Failure normalization
//!
//! Outermost error boundary of the request pipeline. Whatever goes wrong
//! further in, the client receives a JSON [`ErrorResponse`]:
//!
//! - a handler error (`Result<_, AppError>` or any other `ResponseError`)
//! - an `Err` returned by an inner middleware
//! - a panic while the inner pipeline is polled
//!
//! Successful responses, and plain error-status responses built without an
//! error, pass through untouched.
//!
//! Handler errors are answered with a regular response. The other two
//! failures consume the request before the normalizer sees them, so the
//! envelope is returned inside an [`InternalError`] that renders exactly
//! that response, with the correlation header already set. The original
//! error never leaves this layer.
//!
//! ## Example
//! ```rust,ignore
//! use actix_middleware::{ErrorNormalizer, TokenRevocationMiddleware};
//!
//! // `.wrap` order is inside-out: the last call is the outermost layer.
//! let app = App::new()
//!     .wrap(TokenRevocationMiddleware::new(store))
//!     .wrap(ErrorNormalizer);
//! ```

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::{HeaderName, HeaderValue},
    http::Method,
    Error, HttpMessage, HttpResponse,
};
use error_types::{AppError, ErrorKind, ErrorResponse, FieldErrors};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::{ready, Ready};
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use crate::correlation_id::{CorrelationId, CORRELATION_ID_HEADER};

const PANIC_MESSAGE: &str = "request handler panicked";

/// Middleware that turns every failure into a normalized JSON response
#[derive(Clone, Copy, Default)]
pub struct ErrorNormalizer;

impl<S, B> Transform<S, ServiceRequest> for ErrorNormalizer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorNormalizerService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorNormalizerService {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorNormalizerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorNormalizerService<S>
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
        // Routing needs sole ownership of the HttpRequest: keep copies of
        // what the failure path needs, never a clone of the request itself.
        let context = RequestContext::capture(&req);

        Box::pin(async move {
            let outcome = AssertUnwindSafe(async move { service.call(req).await })
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(res)) => {
                    let failure = res.response().error().map(Failure::from_error);
                    let Some(failure) = failure else {
                        return Ok(res.map_into_left_body());
                    };

                    failure.log(&context);
                    let (http_req, _) = res.into_parts();
                    Ok(ServiceResponse::new(http_req, failure.to_response()).map_into_right_body())
                }
                Ok(Err(err)) => Err(context.escalate(Failure::from_error(&err))),
                Err(panic) => Err(context.escalate(Failure::from_panic(&*panic))),
            }
        })
    }
}

/// Request details captured before the inner pipeline takes the request.
#[derive(Debug)]
struct RequestContext {
    method: Method,
    path: String,
    correlation_id: Option<String>,
}

impl RequestContext {
    fn capture(req: &ServiceRequest) -> Self {
        let correlation_id = req
            .extensions()
            .get::<CorrelationId>()
            .map(|id| id.as_str().to_owned());

        Self {
            method: req.method().clone(),
            path: req.path().to_owned(),
            correlation_id,
        }
    }

    /// Envelope for a failure that consumed the request, as an error whose
    /// `error_response` is that envelope.
    fn escalate(&self, failure: Failure) -> Error {
        failure.log(self);

        let mut response = failure.to_response();
        let header = self
            .correlation_id
            .as_deref()
            .and_then(|id| HeaderValue::from_str(id).ok());
        if let Some(value) = header {
            response
                .headers_mut()
                .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
        }

        InternalError::from_response(failure.message, response).into()
    }
}

/// A classified failure, ready to be normalized.
#[derive(Debug)]
struct Failure {
    kind: ErrorKind,
    message: String,
    errors: Option<FieldErrors>,
    /// Debug form including the cause chain, for logs only.
    trace: String,
}

impl Failure {
    fn from_error(err: &Error) -> Self {
        if let Some(app_err) = err.as_error::<AppError>() {
            return Self {
                kind: app_err.kind(),
                message: app_err.to_string(),
                errors: app_err.field_errors().cloned(),
                trace: format!("{:?}", app_err),
            };
        }

        Self {
            kind: ErrorKind::from_status(err.as_response_error().status_code()),
            message: err.to_string(),
            errors: None,
            trace: format!("{:?}", err),
        }
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| PANIC_MESSAGE.to_string());

        Self {
            kind: ErrorKind::Internal,
            trace: format!("{}: {}", PANIC_MESSAGE, message),
            message,
            errors: None,
        }
    }

    fn to_response(&self) -> HttpResponse {
        let body = ErrorResponse::normalize(self.kind, self.message.clone(), self.errors.clone());
        HttpResponse::build(self.kind.status()).json(body)
    }

    fn log(&self, context: &RequestContext) {
        tracing::error!(
            method = %context.method,
            path = %context.path,
            status = self.kind.status().as_u16(),
            kind = ?self.kind,
            correlation_id = context.correlation_id.as_deref().unwrap_or_default(),
            error = %self.trace,
            "Request failed"
        );
    }
}
