//! Normalized error envelope returned for every failed request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ErrorKind;

/// Field name to the ordered validation messages for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Title used for failures that do not belong to a recognised kind.
pub const GENERIC_ERROR_TITLE: &str = "An unexpected error occurred";

/// Stable JSON shape for failures:
///
/// ```json
/// { "title": "...", "status": 400, "detail": "...", "errors": { "Email": ["..."] } }
/// ```
///
/// `errors` is serialized as `null` for every kind except validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Build the envelope for a failure of `kind`.
    ///
    /// The message becomes the `detail` for every kind. It is reused as the
    /// `title` only for recognised kinds; internal failures get
    /// [`GENERIC_ERROR_TITLE`]. Field errors are kept for validation
    /// failures and dropped otherwise.
    pub fn normalize(kind: ErrorKind, message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        let detail = message.into();
        let title = if kind.is_classified() {
            detail.clone()
        } else {
            GENERIC_ERROR_TITLE.to_string()
        };

        let errors = match kind {
            ErrorKind::Validation => Some(errors.unwrap_or_default()),
            _ => None,
        };

        Self {
            title,
            status: kind.status().as_u16(),
            detail,
            errors,
        }
    }
}
