//! Error responses.
//!
//! Every failure is rendered as `{ "error", "message", "field"? }` with the
//! status code of the underlying error.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, warn};

use almacen_core::order::OrderError;
use almacen_shared::AppError;

/// Error returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A domain failure from the order flows.
    Order(OrderError),
    /// A request-level failure (bad header, bad query).
    App(AppError),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self::Order(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::App(AppError::BadRequest(rejection.body_text()))
    }
}

impl ApiError {
    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Order(e) => e.http_status_code(),
            Self::App(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub(crate) fn body(&self) -> Value {
        match self {
            Self::Order(e @ OrderError::Database(_)) => json!({
                "error": e.error_code(),
                "message": "An error occurred",
            }),
            Self::Order(e @ OrderError::InsufficientStock {
                product_id,
                available,
                requested,
                shortfall,
            }) => json!({
                "error": e.error_code(),
                "message": e.to_string(),
                "field": e.field(),
                "product_id": product_id,
                "available": available,
                "requested": requested,
                "shortfall": shortfall,
            }),
            Self::Order(e) => match e.field() {
                Some(field) => json!({
                    "error": e.error_code(),
                    "message": e.to_string(),
                    "field": field,
                }),
                None => json!({
                    "error": e.error_code(),
                    "message": e.to_string(),
                }),
            },
            Self::App(e @ (AppError::Database(_) | AppError::Internal(_))) => json!({
                "error": e.error_code(),
                "message": "An error occurred",
            }),
            Self::App(e) => json!({
                "error": e.error_code(),
                "message": e.to_string(),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                Self::Order(e) => error!(error = %e, "Request failed"),
                Self::App(e) => error!(error = %e, "Request failed"),
            }
        } else if let Self::Order(e @ OrderError::LockConflict(_)) = &self {
            warn!(error = %e, "Lock conflict");
        }

        (status, Json(self.body())).into_response()
    }
}
