//! Shared error taxonomy for the hotel API
//!
//! Handlers signal failure with [`AppError`]. Each variant belongs to one
//! [`ErrorKind`], and the kind alone decides the HTTP status and whether the
//! failure message is safe to show as the response title.
//!
//! ## Kinds
//! - `Validation` → 400, carries field errors
//! - `NotFound` → 404
//! - `Unauthorized` → 401
//! - `Forbidden` → 403
//! - `Internal` → 500, generic title

mod response;

pub use response::{ErrorResponse, FieldErrors, GENERIC_ERROR_TITLE};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Title given to validation failures converted from `validator` output.
pub const VALIDATION_FAILED_MESSAGE: &str = "One or more validation errors occurred.";

/// Closed classification of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Forbidden,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify an error that only exposes a status code.
    ///
    /// Checked in order: validation, not-found, unauthorized, forbidden.
    /// Every other status is internal.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ErrorKind::Validation,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
            StatusCode::FORBIDDEN => ErrorKind::Forbidden,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether the failure message may be used as the response title.
    pub fn is_classified(self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    /// Append a message for `field`. No-op on non-validation errors.
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        if let AppError::Validation { errors, .. } = &mut self {
            errors.entry(field.into()).or_default().push(message.into());
        }
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(anyhow::anyhow!(message.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::normalize(self.kind(), self.to_string(), self.field_errors().cloned())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response())
    }
}

// Convert validator errors to AppError
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, failures) in errors.field_errors() {
            let messages = failures
                .iter()
                .map(|failure| match &failure.message {
                    Some(message) => message.to_string(),
                    None => failure.code.to_string(),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        AppError::Validation {
            message: VALIDATION_FAILED_MESSAGE.to_string(),
            errors: fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn test_status_per_kind() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_status_falls_back_to_internal() {
        assert_eq!(ErrorKind::from_status(StatusCode::BAD_REQUEST), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(StatusCode::NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(StatusCode::UNAUTHORIZED), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(StatusCode::FORBIDDEN), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::from_status(StatusCode::CONFLICT), ErrorKind::Internal);
        assert_eq!(ErrorKind::from_status(StatusCode::BAD_GATEWAY), ErrorKind::Internal);
    }

    #[test]
    fn test_validation_envelope_keeps_field_errors() {
        let err = AppError::validation("Booking is invalid")
            .with_field_error("Email", "Email is required")
            .with_field_error("Email", "Email is malformed")
            .with_field_error("CheckIn", "Check-in date is required");

        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Booking is invalid",
                "status": 400,
                "detail": "Booking is invalid",
                "errors": {
                    "CheckIn": ["Check-in date is required"],
                    "Email": ["Email is required", "Email is malformed"]
                }
            })
        );
    }

    #[test]
    fn test_validation_without_fields_serializes_empty_map() {
        let response = ErrorResponse::normalize(ErrorKind::Validation, "Bad input", None);
        assert_eq!(response.errors, Some(FieldErrors::new()));
    }

    #[test]
    fn test_classified_kinds_use_message_as_title_and_null_errors() {
        for (err, status) in [
            (AppError::not_found("Room 101 not found"), 404),
            (AppError::unauthorized("Missing credential"), 401),
            (AppError::forbidden("Staff only"), 403),
        ] {
            let message = err.to_string();
            let body = serde_json::to_value(err.to_response()).unwrap();
            assert_eq!(
                body,
                json!({ "title": message, "status": status, "detail": message, "errors": null })
            );
        }
    }

    #[test]
    fn test_internal_hides_message_from_title_only() {
        let err = AppError::internal("connection reset by peer");
        let response = err.to_response();
        assert_eq!(response.status, 500);
        assert_eq!(response.title, GENERIC_ERROR_TITLE);
        assert_eq!(response.detail, "connection reset by peer");
        assert_eq!(response.errors, None);
    }

    #[test]
    fn test_field_errors_ignored_for_non_validation() {
        let err = AppError::not_found("gone").with_field_error("Id", "unknown");
        assert!(err.field_errors().is_none());

        let mut fields = FieldErrors::new();
        fields.insert("Id".to_string(), vec!["unknown".to_string()]);
        let response = ErrorResponse::normalize(ErrorKind::Forbidden, "nope", Some(fields));
        assert_eq!(response.errors, None);
    }

    #[test]
    fn test_anyhow_conversion_is_internal() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: AppError = anyhow::Error::new(source).context("failed to write invoice").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "failed to write invoice");
    }

    #[derive(Validate)]
    struct GuestForm {
        #[validate(email(message = "Email is invalid"))]
        email: String,
        #[validate(length(min = 1))]
        full_name: String,
    }

    #[test]
    fn test_validator_errors_become_field_map() {
        let form = GuestForm {
            email: "not-an-email".to_string(),
            full_name: String::new(),
        };
        let err: AppError = form.validate().unwrap_err().into();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), VALIDATION_FAILED_MESSAGE);
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["email"], vec!["Email is invalid".to_string()]);
        assert_eq!(fields["full_name"], vec!["length".to_string()]);
    }

    #[actix_web::test]
    async fn test_response_error_renders_envelope() {
        let err = AppError::forbidden("Only managers can void invoices");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.title, "Only managers can void invoices");
        assert_eq!(body.status, 403);
    }
}
