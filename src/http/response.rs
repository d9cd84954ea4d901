//! Control API rejections.
//!
//! Rejections are returned as a JSON string with status 400, matching the
//! shape of every other API reply.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::validation::{describe, ValidationError};

/// A request refused before anything was applied.
#[derive(Debug)]
pub struct Rejection(pub String);

impl From<Vec<ValidationError>> for Rejection {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(describe(&errors))
    }
}

impl From<ValidationError> for Rejection {
    fn from(error: ValidationError) -> Self {
        Self(error.to_string())
    }
}

impl From<JsonRejection> for Rejection {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        tracing::warn!(reason = %self.0, "Configuration request rejected");
        (StatusCode::BAD_REQUEST, Json(format!("validation: {}", self.0))).into_response()
    }
}
