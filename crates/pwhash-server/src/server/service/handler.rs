//! Route table and request handlers.
//!
//! ## Responsibilities
//!
//! - Validate submissions and hand them to [`HashService::submit`].
//! - Serve digests by identifier, `null` while pending or unknown.
//! - Expose the latency snapshot for `POST /hash`.
//! - Acknowledge shutdown requests and trigger the coordinator. The drain
//!   itself runs elsewhere; the handler never waits for it.

use crate::server::{
    error::ApiError,
    service::stats::record_hash_latency,
    validate::{parse_id, validate_password},
};
use axum::{
    Form, Json, Router,
    extract::{Path, State, rejection::FormRejection},
    middleware,
    routing::{get, post},
};
use pwhash::{HashService, Identifier, StatsSnapshot};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Form body of `POST /hash`.
#[derive(Debug, Default, Deserialize)]
pub struct HashForm {
    #[serde(default)]
    pub password: String,
}

/// Builds the application router around `service`.
pub fn router(service: HashService) -> Router {
    let stats = service.stats().clone();

    Router::new()
        .route("/hash", post(submit_hash))
        .route("/hash/{id}", get(get_hash))
        .route("/stats", get(get_stats))
        .route("/shutdown", get(shutdown).post(shutdown))
        .layer(middleware::from_fn_with_state(stats, record_hash_latency))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// `POST /hash`: accepts a secret and returns its identifier.
///
/// A missing or unreadable form is treated like an empty password.
#[tracing::instrument(skip_all)]
async fn submit_hash(
    State(service): State<HashService>,
    form: Result<Form<HashForm>, FormRejection>,
) -> Result<Json<Identifier>, ApiError> {
    let password = form.map(|Form(form)| form.password).unwrap_or_default();
    validate_password(&password)?;

    let id = service.submit(password)?;
    Ok(Json(id))
}

/// `GET /hash/{id}`: returns the digest, or `null` if not (yet) available.
#[tracing::instrument(skip_all, fields(id = %id))]
async fn get_hash(
    State(service): State<HashService>,
    Path(id): Path<String>,
) -> Result<Json<Option<String>>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(service.lookup(id)))
}

async fn get_stats(State(service): State<HashService>) -> Json<StatsSnapshot> {
    Json(service.stats().snapshot())
}

/// `GET|POST /shutdown`: acknowledges immediately and starts the drain.
async fn shutdown(State(service): State<HashService>) -> &'static str {
    if service.coordinator().trigger() {
        tracing::info!(
            "Shutdown requested over HTTP ({} digest(s) in flight)",
            service.outstanding()
        );
    }
    "OK"
}
