mod error;
mod lookup;

use std::sync::Arc;

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use txpeek_core::explorer::Endpoint;
use txpeek_core::session::LookupSession;
use txpeek_core::LookupService;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub service: LookupService,
    pub endpoint: Endpoint,
    pub session: Arc<RwLock<LookupSession>>,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, origin: &str) -> Result<Router, InvalidHeaderValue> {
    // Only reflect the allowed origin when the request's Origin header
    // actually matches. Otherwise, omit the header entirely so browsers
    // get a clean CORS rejection instead of a mismatched origin value.
    let allowed: HeaderValue = origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |request_origin: &HeaderValue, _| *request_origin == allowed,
        ))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let shared = Arc::new(state);

    let router = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/session", get(lookup::get_session))
        .route("/api/v1/lookup", post(lookup::post_lookup))
        .route("/api", any(api_not_found))
        .route("/api/{*path}", any(api_not_found))
        .layer(cors)
        .with_state(shared);
    Ok(router)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn api_not_found() -> error::AppError {
    error::AppError::NotFound("API route not found".to_string())
}
