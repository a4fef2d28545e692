//! HTTP error mapping.
//!
//! Validation failures are reported as a JSON object mapping field name to a
//! human-readable message, with status `422 Unprocessable Entity`. Errors
//! from the core are mapped to an appropriate status with a JSON body of the
//! form `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;

/// Field name to message, e.g. `{"Password": "Please enter a valid password"}`.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Unified error type for the HTTP layer.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The request failed validation. Never touches the core.
    #[error("Invalid request: {0:?}")]
    Validation(FieldErrors),

    /// The core refused or failed the operation.
    #[error(transparent)]
    Service(#[from] pwhash::Error),
}

impl ApiError {
    pub fn field(field: &'static str, message: &'static str) -> Self {
        Self::Validation(FieldErrors::from([(field, message)]))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response(),
            Self::Service(err) => {
                let status = match err {
                    pwhash::Error::ServiceShutdown => StatusCode::SERVICE_UNAVAILABLE,
                    pwhash::Error::Digest { .. } | pwhash::Error::DrainTimeout { .. } => {
                        tracing::error!("Internal error: {err}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}
