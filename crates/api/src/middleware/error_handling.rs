//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies. Each
//! [`ErrorKind`] has exactly one status code, so the same failure always
//! produces the same response status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinic_core::errors::{ClinicError, ErrorKind};
use serde_json::json;

/// Application error returned by every handler.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use clinic_api::middleware::error_handling::AppError;
/// use clinic_core::errors::ClinicError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(ClinicError::NotFound("Doctor Who not found in database".into()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub enum AppError {
    /// Failure reported by the scheduling engine
    Clinic(ClinicError),
    /// The identity token could not be resolved
    Unauthenticated(String),
}

/// Status code for each domain error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::Clinic(err) => {
                if let ClinicError::Database(report) = err {
                    tracing::error!("Storage failure: {:?}", report);
                }
                (
                    status_for(err.kind()),
                    serde_json::to_value(err.kind()).unwrap_or_default(),
                    err.message(),
                )
            }
            AppError::Unauthenticated(message) => (
                StatusCode::UNAUTHORIZED,
                json!("unauthenticated"),
                message.clone(),
            ),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Allows `?` on `ClinicResult` inside handlers.
impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError::Clinic(err)
    }
}

/// Wraps an eyre report as an internal storage failure.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError::Clinic(ClinicError::Database(err))
    }
}

/// Maps a ClinicError to an HTTP response
pub fn map_error(err: ClinicError) -> Response {
    AppError::Clinic(err).into_response()
}
