use axum::Json;
use serde::Serialize;

/// Success half of the `{response, error}` envelope. Errors are rendered by
/// [`crate::errors::Error`].
#[derive(Debug, Serialize)]
pub struct ServiceResponse<T> {
    /// The payload
    pub response: T,
    /// Always `null` on success
    pub error: Option<()>,
}

/// Wraps `response` in the envelope.
pub fn ok<T>(response: T) -> Json<ServiceResponse<T>> {
    Json(ServiceResponse {
        response,
        error: None,
    })
}

/// Handler return type.
pub type ApiResult<T> = crate::errors::Result<Json<ServiceResponse<T>>>;
