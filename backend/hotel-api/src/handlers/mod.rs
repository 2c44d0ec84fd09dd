pub mod auth;
pub mod health;

use actix_web::{web, HttpRequest};
use error_types::AppError;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health))
            .route("/auth/logout", web::post().to(auth::logout)),
    );
}

/// Default service: unknown routes get the normalized 404.
pub async fn not_found(req: HttpRequest) -> Result<actix_web::HttpResponse, AppError> {
    Err(AppError::not_found(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
