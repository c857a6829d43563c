//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plebiscite_core::{Notice, Outcome};
use serde::Serialize;

/// Standard API response wrapper.
///
/// Errors are rendered by `AppError`; a response built here always succeeded,
/// possibly with warnings.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Notice>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Convert the value of an outcome, keeping its warnings.
    pub fn from_outcome<U>(outcome: Outcome<U>) -> Self
    where
        T: From<U>,
    {
        Self {
            data: T::from(outcome.value),
            warnings: outcome.warnings,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

