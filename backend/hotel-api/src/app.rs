use actix_middleware::{
    CorrelationIdMiddleware, ErrorNormalizer, RequestLogging, TokenRevocationMiddleware,
};
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use jwt_security::TokenValidityStore;
use std::sync::Arc;

use crate::handlers;

/// Shared state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub token_store: Arc<dyn TokenValidityStore>,
    /// Overrides the built-in revoked-token message.
    pub revoked_token_message: Option<String>,
}

impl AppState {
    pub fn new(token_store: Arc<dyn TokenValidityStore>) -> Self {
        Self {
            token_store,
            revoked_token_message: None,
        }
    }

    fn revocation_middleware(&self) -> TokenRevocationMiddleware {
        let middleware = TokenRevocationMiddleware::new(self.token_store.clone());
        match &self.revoked_token_message {
            Some(message) => middleware.with_message(message.clone()),
            None => middleware,
        }
    }
}

/// Build the application with the full request pipeline.
///
/// Request order, outermost first:
/// 1. `RequestLogging`
/// 2. `CorrelationIdMiddleware`
/// 3. `ErrorNormalizer` (must enclose everything that can fail)
/// 4. `TokenRevocationMiddleware`
/// 5. routes
///
/// `.wrap` registers layers inside-out, so the calls below read bottom-up.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let revocation = state.revocation_middleware();

    App::new()
        .app_data(web::Data::new(state))
        .configure(handlers::configure)
        .default_service(web::route().to(handlers::not_found))
        .wrap(revocation)
        .wrap(ErrorNormalizer)
        .wrap(CorrelationIdMiddleware)
        .wrap(RequestLogging)
}
