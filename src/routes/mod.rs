use axum::{
    http::{HeaderValue, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::require_bearer, request_id};
use crate::state::AppState;

pub mod accounts;
pub mod discover;
pub mod membership;
pub mod watch;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/send-otp", post(membership::send_otp))
        .route("/verify-otp", post(membership::verify_otp))
        .route("/subscriptions", get(membership::subscriptions))
        .route("/update-score", post(membership::update_score))
        .route("/watched", post(watch::watched))
        .route("/watch-together", post(watch::watch_together))
        .route("/watch-together-list", get(watch::watch_together_list))
        .route("/movie-description", post(discover::movie_description))
        .route("/quiz", get(discover::quiz))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http().make_span_with(request_id::make_span_with_request_id))
        .layer(axum_middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// CORS policy: a single configured origin, or permissive when none is set.
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    match allowed_origin.and_then(|origin| origin.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// Liveness probe
async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "message": "server is running",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
