//! API routes.

use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::routing::{get, patch};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::authz::require_applicant;
use crate::handlers::{
    create_application, create_career, get_career, health, list_applicant_applications, list_careers,
    list_job_applications, ready, root, update_application_status,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let career_routes = Router::new()
        .route("/careers", get(list_careers).post(create_career))
        .route("/careers/:id", get(get_career));

    // route_layer covers only the GET registered before it; submitting stays public
    let application_routes = Router::new()
        .route(
            "/applications",
            get(list_applicant_applications)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_applicant))
                .post(create_application),
        )
        .route("/applications/job/:id", get(list_job_applications))
        .route("/application/:id", patch(update_application_status));

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Router::new()
        .merge(career_routes)
        .merge(application_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
