use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    address::{address_status, apply_address, validate_address},
    app::{health_check, metrics, readiness},
    calculate::calculate_document_tax,
    documents::{cancel_document, post_document, reset_to_draft},
    reference::{get_reference, list_ps_codes, sync_ps_codes},
    webhook::ceretax_webhook,
};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route(
            "/api/documents/:document_id/calculate",
            post(calculate_document_tax),
        )
        .route("/api/documents/:document_id/post", post(post_document))
        .route("/api/documents/:document_id/cancel", post(cancel_document))
        .route(
            "/api/documents/:document_id/reset-draft",
            post(reset_to_draft),
        )
        .route(
            "/api/partners/:partner_id/validate-address",
            post(validate_address),
        )
        .route("/api/partners/:partner_id/apply-address", post(apply_address))
        .route(
            "/api/partners/:partner_id/address-status",
            get(address_status),
        )
        .route("/api/ps-codes", get(list_ps_codes))
        .route("/api/ps-codes/sync", post(sync_ps_codes))
        .route("/api/reference/:kind", get(get_reference))
        .route("/webhooks/ceretax", post(ceretax_webhook))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
