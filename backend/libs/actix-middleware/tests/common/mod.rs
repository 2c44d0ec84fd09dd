#![allow(dead_code)]

use actix_middleware::RevocationStatus;
use actix_web::body::{to_bytes, BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::header::AUTHORIZATION, test, HttpMessage, HttpRequest, HttpResponse};
use async_trait::async_trait;
use jwt_security::{StoreError, TokenValidityStore};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;

/// Response as the server would write it: an `Err` from the pipeline is
/// rendered through its `ResponseError`, like the HTTP dispatcher does.
pub async fn respond<S, R, B>(app: &S, req: R) -> HttpResponse<BoxBody>
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    match test::try_call_service(app, req).await {
        Ok(res) => res.map_into_boxed_body().into_parts().1,
        Err(err) => err.error_response(),
    }
}

pub async fn json_body(res: HttpResponse<BoxBody>) -> serde_json::Value {
    let bytes = to_bytes(res.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Store double: fixed revoked set or a fixed failure, counting lookups.
pub struct FakeStore {
    revoked: Vec<String>,
    failure: Option<fn() -> StoreError>,
    lookups: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn revoking(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            revoked: tokens.iter().map(|t| t.to_string()).collect(),
            failure: None,
            lookups: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(failure: fn() -> StoreError) -> Arc<Self> {
        Arc::new(Self {
            revoked: Vec::new(),
            failure: Some(failure),
            lookups: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenValidityStore for FakeStore {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(token.to_string());
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok(self.revoked.iter().any(|t| t == token)),
        }
    }

    async fn revoke(&self, _token: &str, _ttl: Duration) -> Result<(), StoreError> {
        unreachable!("the request pipeline never revokes")
    }
}

pub fn timeout_error() -> StoreError {
    StoreError::Timeout(Duration::from_millis(100))
}

pub fn malformed_error() -> StoreError {
    StoreError::MalformedResponse("EXISTS returned 7 for a single key".to_string())
}

/// Counts handler invocations and echoes what the handler observed.
#[derive(Clone, Default)]
pub struct HandlerSpy {
    hits: Arc<AtomicUsize>,
}

impl HandlerSpy {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Handler body: responds with the Authorization header it saw and the
    /// revocation status recorded by the middleware.
    pub fn record(&self, req: &HttpRequest) -> HttpResponse {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);
        let status = req
            .extensions()
            .get::<RevocationStatus>()
            .map(|s| format!("{:?}", s));

        HttpResponse::Ok().json(serde_json::json!({
            "authorization": authorization,
            "revocation": status,
        }))
    }
}

/// In-memory log sink for asserting on emitted events.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
